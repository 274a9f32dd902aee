//! Animal catalog routes

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use petboard_db::{Animal, NewAnimal};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{MAX_TEXT_LENGTH, Validator};

use super::auth::RequireAdmin;
use super::types::{CreateAnimalRequest, SortingQuery};

/// GET /api/v1/animals
async fn list_animals(
    State(state): State<AppState>,
    Query(query): Query<SortingQuery>,
) -> Result<Json<Vec<Animal>>, ApiError> {
    let sorting = query.sorting()?;
    Ok(Json(state.db.list_animals(sorting).await?))
}

/// POST /api/v1/animals (Admin only)
async fn create_animal(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    payload: Result<Json<CreateAnimalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Animal>), ApiError> {
    let Json(request) = payload?;

    let mut validator = Validator::new();
    let category = validator.text("category", request.category, 1..=MAX_TEXT_LENGTH);
    let breeds = validator.text_list("breeds", request.breeds, 1..=MAX_TEXT_LENGTH);
    let (Some(category), Some(breeds)) = (category, breeds) else {
        return Err(validator.into_error());
    };

    let animal = state.db.insert_animal(NewAnimal { category, breeds }).await?;

    info!("Admin {} created animal {} ({})", admin.id, animal.id, animal.category);

    Ok((StatusCode::CREATED, Json(animal)))
}

/// Create animal routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/animals", get(list_animals).post(create_animal))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use petboard_db::UserRole;
    use serde_json::json;

    use super::*;
    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_admin_creates_animal() {
        let app = TestApp::new().await;
        let token = app.admin_token().await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/animals",
                Some(&token),
                Some(json!({ "category": "dog", "breeds": ["beagle", "pug"] })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["category"], "dog");
        assert_eq!(body["breeds"], json!(["beagle", "pug"]));
    }

    #[tokio::test]
    async fn test_user_token_rejected_from_admin_route() {
        let app = TestApp::new().await;
        let tokens = app.register("alice", "a@x.com", "secret1").await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/animals",
                Some(&tokens.access_token),
                Some(json!({ "category": "dog", "breeds": ["beagle"] })),
            )
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "err": { "msg": "You're not an admin." } }));
        assert!(app.state.db.list_animals(Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_promoted_user_becomes_admin() {
        let app = TestApp::new().await;
        let user = app.insert_user("b@x.com", UserRole::User).await;
        let token = app.state.tokens.issue_access_token(&user).unwrap();
        app.state.db.update_user_role(user.id, UserRole::Admin).await.unwrap();

        // Role is read from the store, not the token
        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/animals",
                Some(&token),
                Some(json!({ "category": "cat", "breeds": ["siamese"] })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_animal_validation() {
        let app = TestApp::new().await;
        let token = app.admin_token().await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/animals",
                Some(&token),
                Some(json!({ "category": "x".repeat(129), "breeds": [""] })),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_animals_is_public() {
        let app = TestApp::new().await;
        let token = app.admin_token().await;
        for category in ["dog", "cat"] {
            app.send(
                Method::POST,
                "/api/v1/animals",
                Some(&token),
                Some(json!({ "category": category, "breeds": ["any"] })),
            )
            .await;
        }

        let (status, body) = app.send(Method::GET, "/api/v1/animals", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["category"], "cat");

        let (_, body) = app
            .send(Method::GET, "/api/v1/animals?sorting=oldest", None, None)
            .await;
        assert_eq!(body[0]["category"], "dog");

        let (status, body) = app
            .send(Method::GET, "/api/v1/animals?sorting=random", None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["msg"], "Invalid sorting");
    }
}
