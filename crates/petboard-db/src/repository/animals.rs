//! Animal catalog operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Animal, NewAnimal, Sorting};
use crate::repository::Database;
use crate::utils::format_timestamp;

impl Database {
    // ==================== Animal Operations ====================

    /// Insert a new animal
    pub async fn insert_animal(&self, animal: NewAnimal) -> Result<Animal, DbError> {
        let now = Utc::now();
        let breeds = serde_json::to_string(&animal.breeds)?;

        let result = sqlx::query(
            r#"
            INSERT INTO animals (category, breeds, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&animal.category)
        .bind(&breeds)
        .bind(format_timestamp(&now))
        .fetch_one(&self.pool)
        .await?;

        Ok(Animal {
            id: result.get("id"),
            category: animal.category,
            breeds: animal.breeds,
            created_at: now,
            updated_at: None,
        })
    }

    /// Get an animal by ID
    pub async fn get_animal_by_id(&self, id: i64) -> Result<Option<Animal>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, category, breeds, created_at, updated_at
            FROM animals
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Animal::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all animals
    pub async fn list_animals(&self, sorting: Sorting) -> Result<Vec<Animal>, DbError> {
        let sql = format!(
            "SELECT id, category, breeds, created_at, updated_at FROM animals ORDER BY {}",
            sorting.order_by()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Animal::try_from(row).map_err(DbError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_animal(category: &str, breeds: &[&str]) -> NewAnimal {
        NewAnimal {
            category: category.to_string(),
            breeds: breeds.iter().map(|b| b.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_animal() {
        let db = Database::in_memory().await.unwrap();

        let dog = db.insert_animal(new_animal("dog", &["beagle", "pug"])).await.unwrap();
        let fetched = db.get_animal_by_id(dog.id).await.unwrap().unwrap();

        assert_eq!(fetched.category, "dog");
        assert_eq!(fetched.breeds, vec!["beagle", "pug"]);
        assert!(fetched.has_breed("pug"));
        assert!(!fetched.has_breed("siamese"));
        assert!(db.get_animal_by_id(dog.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_animals_sorting() {
        let db = Database::in_memory().await.unwrap();

        db.insert_animal(new_animal("dog", &["beagle"])).await.unwrap();
        db.insert_animal(new_animal("cat", &["siamese"])).await.unwrap();

        let recent: Vec<_> = db
            .list_animals(Sorting::MostRecent)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.category)
            .collect();
        assert_eq!(recent, vec!["cat", "dog"]);

        let oldest: Vec<_> = db
            .list_animals(Sorting::Oldest)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.category)
            .collect();
        assert_eq!(oldest, vec!["dog", "cat"]);
    }
}
