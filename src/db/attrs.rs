//! Attribute repository: per-user key/value pairs.

use super::DbError;
use sqlx::SqlitePool;

/// One stored attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub val: String,
}

/// Repository for attribute operations.
pub struct AttrRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AttrRepository<'a> {
    /// Create a new attribute repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new key/value pair for `owner`. Duplicate keys are
    /// reported as [`DbError::Duplicate`].
    pub async fn set(&self, owner: &str, key: &str, val: &str) -> Result<Attribute, DbError> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query("INSERT INTO attributes (owner, key, val, created_at) VALUES (?, ?, ?, ?)")
            .bind(owner)
            .bind(key)
            .bind(val)
            .bind(now)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::from_insert(e, key))?;

        Ok(Attribute { key: key.to_string(), val: val.to_string() })
    }

    /// Fetch one attribute by key.
    pub async fn get(&self, owner: &str, key: &str) -> Result<Option<Attribute>, DbError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT key, val FROM attributes WHERE owner = ? AND key = ?",
        )
        .bind(owner)
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(key, val)| Attribute { key, val }))
    }

    /// List the owner's attributes, most recent first.
    pub async fn list(&self, owner: &str, limit: i64) -> Result<Vec<Attribute>, DbError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT key, val FROM attributes WHERE owner = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(key, val)| Attribute { key, val }).collect())
    }

    /// Delete one attribute by key. Missing keys are [`DbError::NotFound`].
    pub async fn delete(&self, owner: &str, key: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM attributes WHERE owner = ? AND key = ?")
            .bind(owner)
            .bind(key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(key.to_string()));
        }
        Ok(())
    }
}
