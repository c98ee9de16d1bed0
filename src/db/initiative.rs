//! Initiative repository: the shared turn-order roster.
//!
//! Names are globally unique; insertion relies on the UNIQUE constraint
//! so two concurrent adds of the same name race safely - the loser gets
//! [`DbError::Duplicate`].

use super::DbError;
use sqlx::SqlitePool;

/// One entity in the initiative order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiativeEntry {
    pub name: String,
    pub initiative: i64,
}

/// Repository for initiative operations.
pub struct InitiativeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InitiativeRepository<'a> {
    /// Create a new initiative repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add an entity. Duplicate names are reported as [`DbError::Duplicate`].
    pub async fn add(&self, name: &str, initiative: i64) -> Result<(), DbError> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query("INSERT INTO initiative (name, initiative, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(initiative)
            .bind(now)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::from_insert(e, name))?;
        Ok(())
    }

    /// Fetch one entity by name.
    pub async fn get(&self, name: &str) -> Result<Option<InitiativeEntry>, DbError> {
        let row = sqlx::query_as::<_, (String, i64)>(
            "SELECT name, initiative FROM initiative WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(name, initiative)| InitiativeEntry { name, initiative }))
    }

    /// The whole roster, initiative descending.
    pub async fn list(&self) -> Result<Vec<InitiativeEntry>, DbError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT name, initiative FROM initiative ORDER BY initiative DESC, id ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, initiative)| InitiativeEntry { name, initiative })
            .collect())
    }

    /// Remove one entity by name. Removing an absent name is not an error.
    pub async fn remove(&self, name: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM initiative WHERE name = ?")
            .bind(name)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop the whole roster.
    pub async fn clear(&self) -> Result<(), DbError> {
        sqlx::query("DELETE FROM initiative").execute(self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, DbError};

    #[tokio::test]
    async fn add_list_sorted_descending() {
        let db = Database::new(":memory:").await.unwrap();
        db.initiative().add("Boo", 7).await.unwrap();
        db.initiative().add("Beholder", 16).await.unwrap();
        db.initiative().add("Minsk", 12).await.unwrap();

        let roster = db.initiative().list().await.unwrap();
        let names: Vec<_> = roster.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Beholder", "Minsk", "Boo"]);
    }

    #[tokio::test]
    async fn duplicate_name_is_reported() {
        let db = Database::new(":memory:").await.unwrap();
        db.initiative().add("Flameskull", 11).await.unwrap();
        let err = db.initiative().add("Flameskull", 4).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let db = Database::new(":memory:").await.unwrap();
        db.initiative().add("Boo", 7).await.unwrap();

        assert!(db.initiative().remove("Boo").await.unwrap());
        assert!(!db.initiative().remove("Boo").await.unwrap());

        db.initiative().add("Minsk", 3).await.unwrap();
        db.initiative().clear().await.unwrap();
        assert!(db.initiative().list().await.unwrap().is_empty());
    }
}
