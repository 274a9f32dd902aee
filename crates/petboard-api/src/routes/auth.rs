//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    routing::post,
};
use petboard_auth::{Access, AuthError, Rejection, Requirement};
use petboard_db::{NewUser, User, UserRole};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::Validator;

use super::types::{LoginRequest, RegisterRequest, TokenResponse};

// ==================== Auth Extractors ====================

/// Run the role gate for `requirement` against the request headers
async fn admit<S>(
    parts: &Parts,
    state: &S,
    requirement: Requirement,
) -> Result<Option<User>, Rejection>
where
    AppState: FromRef<S>,
{
    let app_state = AppState::from_ref(state);

    match app_state.gate.check_access(&parts.headers, requirement).await {
        Access::Admit(principal) => Ok(principal),
        Access::Reject(rejection) => Err(rejection),
    }
}

/// Extractor for any registered user (required)
pub struct RequireUser(pub User);

impl<S> FromRequestParts<S> for RequireUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        admit(parts, state, Requirement::User)
            .await?
            .map(RequireUser)
            .ok_or_else(Rejection::not_a_user)
    }
}

/// Extractor for admin user (required)
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        admit(parts, state, Requirement::Admin)
            .await?
            .map(RequireAdmin)
            .ok_or_else(Rejection::not_an_admin)
    }
}

/// Extractor for guest-accessible routes; carries the caller when known
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        admit(parts, state, Requirement::Guest).await.map(MaybeUser)
    }
}

// ==================== Input Validation ====================

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 12;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum allowed password length
const MAX_PASSWORD_LENGTH: usize = 50;

fn token_response(state: &AppState, user: &User) -> Result<TokenResponse, ApiError> {
    Ok(TokenResponse {
        access_token: state.tokens.issue_access_token(user)?,
        refresh_token: state.tokens.issue_refresh_token(user)?,
        expires_in: format!("{}s", state.tokens.access_ttl_secs()),
        token_type: "Bearer".to_string(),
    })
}

// ==================== Auth Routes ====================

/// POST /api/v1/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let Json(request) = payload?;

    let mut validator = Validator::new();
    let username = validator.text("username", request.username, 1..=MAX_USERNAME_LENGTH);
    let email = validator.email("email", request.email);
    let password = validator.text(
        "password",
        request.password,
        MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH,
    );
    let (Some(username), Some(email), Some(password)) = (username, email, password) else {
        return Err(validator.into_error());
    };

    debug!("Registration attempt for: {}", email);

    // Checked before hashing so duplicates don't pay the hashing cost
    if state
        .db
        .get_user_by_email(&email)
        .await
        .map_err(AuthError::from)?
        .is_some()
    {
        return Err(AuthError::DuplicateEmail.into());
    }

    let password_hash = state.hasher.hash(&password).await?;

    let user = state
        .db
        .insert_user(NewUser {
            username,
            email,
            password_hash,
            role: UserRole::default(),
        })
        .await
        .map_err(AuthError::from)?;

    let response = token_response(&state, &user)?;

    metrics::counter!("petboard_registrations_total").increment(1);
    info!("Registered user {} ({})", user.id, user.email);

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let Json(request) = payload?;

    let mut validator = Validator::new();
    let email = validator.email("email", request.email);
    let password = validator.text("password", request.password, 1..=MAX_PASSWORD_LENGTH);
    let (Some(email), Some(password)) = (email, password) else {
        return Err(validator.into_error());
    };

    debug!("Login attempt for: {}", email);

    let Some(user) = state.db.get_user_by_email(&email).await.map_err(AuthError::from)? else {
        metrics::counter!("petboard_logins_total", "outcome" => "unknown_user").increment(1);
        return Err(AuthError::PrincipalNotFound.into());
    };

    if !state.hasher.verify(&password, &user.password_hash).await {
        metrics::counter!("petboard_logins_total", "outcome" => "bad_password").increment(1);
        return Err(AuthError::InvalidPassword.into());
    }

    let response = token_response(&state, &user)?;

    metrics::counter!("petboard_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in successfully", user.id);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/register", post(register))
        .route("/api/v1/login", post(login))
}
