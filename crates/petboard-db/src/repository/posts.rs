//! Animal post operations

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::error::DbError;
use crate::models::{AnimalPost, NewAnimalPost, Sorting, UpdateAnimalPost};
use crate::repository::Database;
use crate::utils::format_timestamp;

const POST_COLUMNS: &str =
    "id, author_id, animal_id, name, breed, age, image, created_at, updated_at";

impl Database {
    // ==================== Animal Post Operations ====================

    /// Insert a new animal post
    pub async fn insert_post(&self, post: NewAnimalPost) -> Result<AnimalPost, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO animal_posts (author_id, animal_id, name, breed, age, image, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(post.author_id)
        .bind(post.animal_id)
        .bind(&post.name)
        .bind(&post.breed)
        .bind(post.age)
        .bind(&post.image)
        .bind(format_timestamp(&now))
        .fetch_one(&self.pool)
        .await?;

        Ok(AnimalPost {
            id: result.get("id"),
            author_id: post.author_id,
            animal_id: post.animal_id,
            name: post.name,
            breed: post.breed,
            age: post.age,
            image: post.image,
            created_at: now,
            updated_at: None,
        })
    }

    /// Get a post by ID, restricted to its author
    pub async fn get_post_for_author(
        &self,
        id: i64,
        author_id: i64,
    ) -> Result<Option<AnimalPost>, DbError> {
        let sql = format!(
            "SELECT {} FROM animal_posts WHERE id = ? AND author_id = ?",
            POST_COLUMNS
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| AnimalPost::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Apply a partial update to a post owned by `author_id`
    ///
    /// Returns `false` when no post with that id belongs to the author.
    pub async fn update_post(
        &self,
        id: i64,
        author_id: i64,
        update: UpdateAnimalPost,
    ) -> Result<bool, DbError> {
        let now = Utc::now();

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE animal_posts SET updated_at = ");
        builder.push_bind(format_timestamp(&now));
        if let Some(name) = update.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(breed) = update.breed {
            builder.push(", breed = ").push_bind(breed);
        }
        if let Some(age) = update.age {
            builder.push(", age = ").push_bind(age);
        }
        if let Some(image) = update.image {
            builder.push(", image = ").push_bind(image);
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND author_id = ")
            .push_bind(author_id);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a post owned by `author_id`
    pub async fn delete_post(&self, id: i64, author_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM animal_posts WHERE id = ? AND author_id = ?")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List every post
    pub async fn list_posts(&self, sorting: Sorting) -> Result<Vec<AnimalPost>, DbError> {
        let sql = format!(
            "SELECT {} FROM animal_posts ORDER BY {}",
            POST_COLUMNS,
            sorting.order_by()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| AnimalPost::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List the posts written by one author
    pub async fn list_posts_by_author(
        &self,
        author_id: i64,
        sorting: Sorting,
    ) -> Result<Vec<AnimalPost>, DbError> {
        let sql = format!(
            "SELECT {} FROM animal_posts WHERE author_id = ? ORDER BY {}",
            POST_COLUMNS,
            sorting.order_by()
        );
        let rows = sqlx::query(&sql).bind(author_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| AnimalPost::try_from(row).map_err(DbError::from))
            .collect()
    }
}
