//! Animal post routes

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post, put},
};
use petboard_db::{Animal, AnimalPost, NewAnimalPost, UpdateAnimalPost};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{MAX_TEXT_LENGTH, Validator};

use super::auth::{MaybeUser, RequireUser};
use super::types::{CreatePostRequest, SortingQuery, UpdatePostRequest};

/// Accept `breed` only when it is one of the animal's breeds
fn breed_of(animal: &Animal, breed: String) -> Result<String, ApiError> {
    if animal.has_breed(&breed) {
        Ok(breed)
    } else {
        Err(ApiError::BadRequest(format!("Invalid breed : {}", breed)))
    }
}

/// POST /api/v1/animal_post
async fn create_post(
    RequireUser(author): RequireUser,
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AnimalPost>), ApiError> {
    let Json(request) = payload?;

    let mut validator = Validator::new();
    let name = validator.text("name", request.name, 1..=MAX_TEXT_LENGTH);
    let breed = validator.text("breed", request.breed, 1..=MAX_TEXT_LENGTH);
    let age = validator.number("age", request.age);
    let image = validator.text("image", request.image, 1..=MAX_TEXT_LENGTH);
    let animal_id = validator.present("animal_id", request.animal_id);
    let (Some(name), Some(breed), Some(age), Some(image), Some(animal_id)) =
        (name, breed, age, image, animal_id)
    else {
        return Err(validator.into_error());
    };

    let Some(animal) = state.db.get_animal_by_id(animal_id).await? else {
        return Err(ApiError::BadRequest(format!("Invalid animalId : {}", animal_id)));
    };
    let breed = breed_of(&animal, breed)?;

    let post = state
        .db
        .insert_post(NewAnimalPost {
            author_id: author.id,
            animal_id,
            name,
            breed,
            age,
            image,
        })
        .await?;

    info!("User {} created post {}", author.id, post.id);

    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/v1/animal_post/{id}
async fn update_post(
    RequireUser(author): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<AnimalPost>, ApiError> {
    let Json(request) = payload?;

    let mut validator = Validator::new();
    let name = validator.optional_text("name", request.name, 1..=MAX_TEXT_LENGTH);
    let breed = validator.optional_text("breed", request.breed, 1..=MAX_TEXT_LENGTH);
    let age = validator.optional_number("age", request.age);
    let image = validator.optional_text("image", request.image, 1..=MAX_TEXT_LENGTH);
    let (Some(name), Some(breed), Some(age), Some(image)) = (name, breed, age, image) else {
        return Err(validator.into_error());
    };

    let Some(existing) = state.db.get_post_for_author(id, author.id).await? else {
        return Err(ApiError::NotFound("Unable to find this post.".to_string()));
    };

    let breed = match breed {
        Some(breed) => {
            let animal = state.db.get_animal_by_id(existing.animal_id).await?.ok_or_else(|| {
                ApiError::BadRequest(format!("Invalid animalId : {}", existing.animal_id))
            })?;
            Some(breed_of(&animal, breed)?)
        }
        None => None,
    };

    let update = UpdateAnimalPost {
        name,
        breed,
        age,
        image,
    };
    if update.is_empty() {
        return Err(ApiError::Internal("No changes have been made.".to_string()));
    }

    if !state.db.update_post(id, author.id, update).await? {
        return Err(ApiError::NotFound("Unable to find this post.".to_string()));
    }

    let post = state
        .db
        .get_post_for_author(id, author.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Unable to find this post.".to_string()))?;

    debug!("User {} updated post {}", author.id, id);

    Ok(Json(post))
}

/// DELETE /api/v1/animal_post/{id}
async fn delete_post(
    RequireUser(author): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_post(id, author.id).await? {
        return Err(ApiError::NotFound("Animal post not found.".to_string()));
    }

    info!("User {} deleted post {}", author.id, id);

    Ok(StatusCode::OK)
}

/// GET /api/v1/animal_post/my_posts
async fn my_posts(
    RequireUser(author): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<SortingQuery>,
) -> Result<Json<Vec<AnimalPost>>, ApiError> {
    let sorting = query.sorting()?;
    Ok(Json(state.db.list_posts_by_author(author.id, sorting).await?))
}

/// GET /api/v1/animal_post/all_posts
async fn all_posts(
    MaybeUser(_): MaybeUser,
    State(state): State<AppState>,
    Query(query): Query<SortingQuery>,
) -> Result<Json<Vec<AnimalPost>>, ApiError> {
    let sorting = query.sorting()?;
    Ok(Json(state.db.list_posts(sorting).await?))
}

/// Create animal post routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/animal_post", post(create_post))
        .route("/api/v1/animal_post/my_posts", get(my_posts))
        .route("/api/v1/animal_post/all_posts", get(all_posts))
        .route("/api/v1/animal_post/{id}", put(update_post).delete(delete_post))
}
