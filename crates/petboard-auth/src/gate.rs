//! Role-based route gating

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use petboard_db::User;
use serde_json::json;
use tracing::debug;

use crate::resolver::AuthContextResolver;

/// Capability a route requires from its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, authenticated or not
    Guest,
    /// Any registered user (role `user` or `admin`)
    User,
    /// Administrators only
    Admin,
}

impl Requirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::Guest => "guest",
            Requirement::User => "user",
            Requirement::Admin => "admin",
        }
    }

    /// Whether `principal` satisfies this requirement
    pub fn admits(&self, principal: Option<&User>) -> bool {
        match self {
            Requirement::Guest => true,
            Requirement::User => principal.is_some_and(|u| u.role.is_user()),
            Requirement::Admin => principal.is_some_and(|u| u.role.is_admin()),
        }
    }

    /// Response sent when this requirement is not met; `Guest` never rejects
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Requirement::Guest => None,
            Requirement::User => Some(Rejection::not_a_user()),
            Requirement::Admin => Some(Rejection::not_an_admin()),
        }
    }
}

/// Terminal response for a request that failed the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: &'static str,
}

impl Rejection {
    pub fn not_a_user() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: "You're not a user.",
        }
    }

    pub fn not_an_admin() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: "You're not an admin.",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "err": { "msg": self.message }
        }));

        (self.status, body).into_response()
    }
}

/// Outcome of a gate check
#[derive(Debug)]
pub enum Access {
    /// Proceed; carries the principal when one was resolved
    Admit(Option<User>),
    Reject(Rejection),
}

/// Decides whether a request may reach its route handler
#[derive(Clone)]
pub struct RoleGate {
    resolver: AuthContextResolver,
}

impl RoleGate {
    pub fn new(resolver: AuthContextResolver) -> Self {
        Self { resolver }
    }

    /// Check the request against `requirement`
    pub async fn check_access(&self, headers: &HeaderMap, requirement: Requirement) -> Access {
        let principal = self.resolver.resolve_user(headers).await;

        match requirement.rejection() {
            Some(rejection) if !requirement.admits(principal.as_ref()) => {
                debug!(
                    "Rejected request requiring {} (principal: {:?})",
                    requirement.as_str(),
                    principal.as_ref().map(|u| u.id)
                );
                metrics::counter!(
                    "petboard_gate_rejections_total",
                    "requirement" => requirement.as_str()
                )
                .increment(1);

                Access::Reject(rejection)
            }
            _ => Access::Admit(principal),
        }
    }
}
