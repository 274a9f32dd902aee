//! Petboard Authentication and Authorization
//!
//! This crate provides salted password hashing, dual access/refresh
//! JWT issuance, request principal resolution and role-based gating
//! for Petboard routes.

pub mod config;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod resolver;

pub use config::{AuthConfig, HashingConfig};
pub use error::AuthError;
pub use gate::{Access, Rejection, Requirement, RoleGate};
pub use jwt::{Claims, TokenIssuer, TokenKind};
pub use password::PasswordHasher;
pub use resolver::{AuthContextResolver, UserStore};
