//! Database models

use crate::utils::{parse_datetime_or_now, parse_optional_datetime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidUserRole(String),
    InvalidSorting(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidUserRole(s) => write!(f, "Invalid user role: {}", s),
            ParseError::InvalidSorting(s) => write!(f, "Invalid sorting: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// User role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    /// Whether this role may use routes reserved for registered users
    pub fn is_user(&self) -> bool {
        matches!(self, UserRole::User | UserRole::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl FromStr for UserRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(ParseError::InvalidUserRole(s.to_string())),
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Animal catalog entry: a category and the breeds it admits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Animal {
    pub id: i64,
    pub category: String,
    pub breeds: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Animal {
    pub fn has_breed(&self, breed: &str) -> bool {
        self.breeds.iter().any(|b| b == breed)
    }
}

/// New animal (for insertion)
#[derive(Debug, Clone)]
pub struct NewAnimal {
    pub category: String,
    pub breeds: Vec<String>,
}

/// A user's listing for an animal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalPost {
    pub id: i64,
    pub author_id: i64,
    pub animal_id: i64,
    pub name: String,
    pub breed: String,
    pub age: f64,
    pub image: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// New animal post (for insertion)
#[derive(Debug, Clone)]
pub struct NewAnimalPost {
    pub author_id: i64,
    pub animal_id: i64,
    pub name: String,
    pub breed: String,
    pub age: f64,
    pub image: String,
}

/// Update animal post (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdateAnimalPost {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<f64>,
    pub image: Option<String>,
}

impl UpdateAnimalPost {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.breed.is_none() && self.age.is_none() && self.image.is_none()
    }
}

/// Ordering of listings by creation date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sorting {
    Oldest,
    #[default]
    MostRecent,
}

impl Sorting {
    pub(crate) fn order_by(&self) -> &'static str {
        match self {
            Sorting::Oldest => "created_at ASC, id ASC",
            Sorting::MostRecent => "created_at DESC, id DESC",
        }
    }
}

impl FromStr for Sorting {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oldest" => Ok(Sorting::Oldest),
            "mostrecent" => Ok(Sorting::MostRecent),
            _ => Err(ParseError::InvalidSorting(s.to_string())),
        }
    }
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let role_str: String = row.try_get("role")?;
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: UserRole::from_str(&role_str).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_optional_datetime(row.try_get("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Animal {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let breeds_json: String = row.try_get("breeds")?;
        Ok(Animal {
            id: row.try_get("id")?,
            category: row.try_get("category")?,
            breeds: serde_json::from_str(&breeds_json)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_optional_datetime(row.try_get("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for AnimalPost {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(AnimalPost {
            id: row.try_get("id")?,
            author_id: row.try_get("author_id")?,
            animal_id: row.try_get("animal_id")?,
            name: row.try_get("name")?,
            breed: row.try_get("breed")?,
            age: row.try_get("age")?,
            image: row.try_get("image")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_optional_datetime(row.try_get("updated_at")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_round_trip() {
        assert_eq!(UserRole::from_str("user").unwrap(), UserRole::User);
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert!(UserRole::from_str("root").is_err());
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_user_role_capabilities() {
        assert!(UserRole::User.is_user());
        assert!(!UserRole::User.is_admin());
        assert!(UserRole::Admin.is_user());
        assert!(UserRole::Admin.is_admin());
    }

    #[test]
    fn test_sorting_parse() {
        assert_eq!(Sorting::from_str("oldest").unwrap(), Sorting::Oldest);
        assert_eq!(Sorting::from_str("mostrecent").unwrap(), Sorting::MostRecent);
        assert_eq!(
            Sorting::from_str("newest"),
            Err(ParseError::InvalidSorting("newest".to_string()))
        );
        assert_eq!(Sorting::default(), Sorting::MostRecent);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("updated_at").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_empty_post_update() {
        assert!(UpdateAnimalPost::default().is_empty());
        let update = UpdateAnimalPost {
            age: Some(2.0),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
