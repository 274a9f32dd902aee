//! Petboard REST API
//!
//! This crate provides the Axum-based HTTP API for Petboard:
//! registration and login, the animal catalog, animal posts,
//! and operational endpoints.

pub mod error;
pub mod routes;
pub mod state;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
