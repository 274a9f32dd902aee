//! API error types

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::FieldError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Malformed body: {0}")]
    Body(#[from] JsonRejection),

    #[error("Database error: {0}")]
    Database(#[from] petboard_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] petboard_auth::AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // Registration/login failures keep their own envelope
            ApiError::Auth(e) => return e.into_response(),
            ApiError::Validation(errors) => {
                let body = axum::Json(json!({ "errors": errors }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::Body(rejection) => {
                let errors = vec![FieldError::body(rejection.body_text())];
                let body = axum::Json(json!({ "errors": errors }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Database(petboard_db::DbError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = axum::Json(json!({
            "err": { "msg": message }
        }));

        (status, body).into_response()
    }
}
