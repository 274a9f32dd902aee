//! Request/Response DTOs
//!
//! Request fields are optional at the serde level so that a missing field
//! is reported by validation alongside every other problem.

use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token envelope returned by registration and login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub token_type: String,
}

// ==================== Animal Types ====================

/// Create animal request
#[derive(Deserialize)]
pub struct CreateAnimalRequest {
    pub category: Option<String>,
    pub breeds: Option<Vec<String>>,
}

// ==================== Post Types ====================

/// Create animal post request
#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<f64>,
    pub image: Option<String>,
    pub animal_id: Option<i64>,
}

/// Partial update of an animal post
#[derive(Deserialize, Default)]
pub struct UpdatePostRequest {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<f64>,
    pub image: Option<String>,
}

/// Listing query parameters
#[derive(Deserialize, Default)]
pub struct SortingQuery {
    #[serde(default)]
    pub sorting: Option<String>,
}

impl SortingQuery {
    /// Resolve the requested ordering; absent means most recent first
    pub fn sorting(&self) -> Result<petboard_db::Sorting, crate::ApiError> {
        match self.sorting.as_deref() {
            None => Ok(petboard_db::Sorting::default()),
            Some(s) => s.parse().map_err(|_| crate::validation::invalid_sorting()),
        }
    }
}
