//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use petboard_auth::{AuthContextResolver, PasswordHasher, RoleGate, TokenIssuer};
use petboard_db::Database;
use std::sync::Arc;

/// Prometheus render handle
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub hasher: Arc<PasswordHasher>,
    pub tokens: Arc<TokenIssuer>,
    pub gate: RoleGate,
}

impl AppState {
    pub fn new(db: Database, hasher: Arc<PasswordHasher>, tokens: Arc<TokenIssuer>) -> Self {
        let resolver = AuthContextResolver::new(tokens.clone(), Arc::new(db.clone()));

        Self {
            db,
            hasher,
            tokens,
            gate: RoleGate::new(resolver),
        }
    }
}
