//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use petboard_db::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Malformed authorization header")]
    MalformedHeader,

    #[error("Invalid signature or expired token")]
    InvalidSignatureOrExpired,

    #[error("Principal not found")]
    PrincipalNotFound,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("User store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(_) => AuthError::DuplicateEmail,
            other => AuthError::StoreUnavailable(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::MalformedHeader | AuthError::InvalidSignatureOrExpired => {
                (StatusCode::UNAUTHORIZED, "Your Bearer token is invalid")
            }
            AuthError::PrincipalNotFound => {
                (StatusCode::INTERNAL_SERVER_ERROR, "User does not exist")
            }
            AuthError::DuplicateEmail => (StatusCode::INTERNAL_SERVER_ERROR, "Email already exist"),
            AuthError::InvalidPassword => (StatusCode::INTERNAL_SERVER_ERROR, "Bad password"),
            AuthError::Configuration(_)
            | AuthError::StoreUnavailable(_)
            | AuthError::PasswordHash(_)
            | AuthError::Jwt(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        let body = axum::Json(json!({
            "error": { "msg": message }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        assert!(matches!(
            AuthError::from(DbError::Duplicate("a@x.com".to_string())),
            AuthError::DuplicateEmail
        ));
        assert!(matches!(
            AuthError::from(DbError::NotFound("user".to_string())),
            AuthError::StoreUnavailable(_)
        ));
    }

    #[test]
    fn test_flow_errors_are_server_errors() {
        for err in [
            AuthError::DuplicateEmail,
            AuthError::PrincipalNotFound,
            AuthError::InvalidPassword,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
        assert_eq!(
            AuthError::MalformedHeader.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
