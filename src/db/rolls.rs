//! Saved-roll repository: named dice expressions per user.

use super::DbError;
use sqlx::SqlitePool;

/// One saved roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRoll {
    pub name: String,
    pub expr: String,
}

/// Repository for saved-roll operations.
pub struct RollRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RollRepository<'a> {
    /// Create a new saved-roll repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Save a roll under a name for `owner`. Duplicate names are
    /// reported as [`DbError::Duplicate`].
    pub async fn save(&self, owner: &str, name: &str, expr: &str) -> Result<SavedRoll, DbError> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query("INSERT INTO saved_rolls (owner, name, expr, created_at) VALUES (?, ?, ?, ?)")
            .bind(owner)
            .bind(name)
            .bind(expr)
            .bind(now)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::from_insert(e, name))?;

        Ok(SavedRoll { name: name.to_string(), expr: expr.to_string() })
    }

    /// Fetch one saved roll by name.
    pub async fn get(&self, owner: &str, name: &str) -> Result<Option<SavedRoll>, DbError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT name, expr FROM saved_rolls WHERE owner = ? AND name = ?",
        )
        .bind(owner)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(name, expr)| SavedRoll { name, expr }))
    }

    /// List the owner's saved rolls, most recent first.
    pub async fn list(&self, owner: &str, limit: i64) -> Result<Vec<SavedRoll>, DbError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT name, expr FROM saved_rolls WHERE owner = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(name, expr)| SavedRoll { name, expr }).collect())
    }

    /// Delete one saved roll by name. Missing names are [`DbError::NotFound`].
    pub async fn delete(&self, owner: &str, name: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM saved_rolls WHERE owner = ? AND name = ?")
            .bind(owner)
            .bind(name)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(name.to_string()));
        }
        Ok(())
    }
}
