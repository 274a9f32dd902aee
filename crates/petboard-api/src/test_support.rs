//! Router harness for handler tests

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use petboard_auth::{AuthConfig, HashingConfig, PasswordHasher, TokenIssuer};
use petboard_db::{Database, NewUser, User, UserRole};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use crate::routes::create_router;
use crate::routes::types::TokenResponse;
use crate::state::AppState;

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::in_memory().await.unwrap();
        let hasher = PasswordHasher::new(&HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let config = AuthConfig::new(
            Some("test-access-secret".to_string()),
            Some("test-refresh-secret".to_string()),
            1800,
            432000,
        )
        .unwrap();

        let state = AppState::new(db, Arc::new(hasher), Arc::new(TokenIssuer::new(&config)));
        let router = create_router(state.clone(), None);
        Self { state, router }
    }

    /// Send a request, optionally with a bearer token, and decode the JSON reply
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let auth = token.map(|t| format!("Bearer {}", t));
        self.send_with_header(method, path, auth.as_deref(), body).await
    }

    /// Send a request with a raw `Authorization` header value
    pub async fn send_with_header(
        &self,
        method: Method,
        path: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    /// Register through the API and return the token envelope
    pub async fn register(&self, username: &str, email: &str, password: &str) -> TokenResponse {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/register",
                None,
                Some(json!({ "username": username, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        serde_json::from_value(body).unwrap()
    }

    /// Insert an admin directly and return an access token for it
    pub async fn admin_token(&self) -> String {
        let admin = self.insert_user("root@x.com", UserRole::Admin).await;
        self.state.tokens.issue_access_token(&admin).unwrap()
    }

    pub async fn insert_user(&self, email: &str, role: UserRole) -> User {
        let password_hash = self.state.hasher.hash("secret1").await.unwrap();
        self.state
            .db
            .insert_user(NewUser {
                username: "someone".to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await
            .unwrap()
    }
}
