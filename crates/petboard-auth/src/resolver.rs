//! Request principal resolution

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use petboard_db::{Database, DbError, User};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::jwt::{TokenIssuer, TokenKind};

/// Lookup of users by the id carried in a token
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DbError>;
}

#[async_trait]
impl UserStore for Database {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        self.get_user_by_id(id).await
    }
}

/// Resolves the authenticated user behind a request, if any
///
/// Every failure collapses to "no principal". The reason is logged and
/// then dropped so callers cannot tell an expired token from a missing one.
#[derive(Clone)]
pub struct AuthContextResolver {
    issuer: Arc<TokenIssuer>,
    store: Arc<dyn UserStore>,
}

impl AuthContextResolver {
    pub fn new(issuer: Arc<TokenIssuer>, store: Arc<dyn UserStore>) -> Self {
        Self { issuer, store }
    }

    /// Resolve the user presenting a valid access token
    pub async fn resolve_user(&self, headers: &HeaderMap) -> Option<User> {
        match self.try_resolve(headers).await {
            Ok(user) => {
                debug!("Authenticated user: {} ({})", user.id, user.role.as_str());
                Some(user)
            }
            Err(AuthError::StoreUnavailable(reason)) => {
                warn!("User lookup failed, treating request as anonymous: {}", reason);
                None
            }
            Err(reason) => {
                debug!("Treating request as anonymous: {}", reason);
                None
            }
        }
    }

    async fn try_resolve(&self, headers: &HeaderMap) -> Result<User, AuthError> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MalformedHeader)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;

        let token = header.get(7..).unwrap_or_default();
        if !header.starts_with("Bearer ") || token.trim().is_empty() {
            return Err(AuthError::MalformedHeader);
        }

        let claims = self.issuer.verify_and_decode(Some(header), TokenKind::Access)?;
        let user_id = claims.user_id().ok_or(AuthError::PrincipalNotFound)?;

        self.store
            .find_user_by_id(user_id)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?
            .ok_or(AuthError::PrincipalNotFound)
    }
}
