//! Karma repository.
//!
//! One row per subject. `karma` is maintained as `upvotes - downvotes`
//! on every write so the leaderboard queries can order on it directly.

use super::DbError;
use sqlx::SqlitePool;

/// A karma tally for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KarmaEntry {
    pub subject: String,
    pub upvotes: i64,
    pub downvotes: i64,
    pub karma: i64,
}

/// Repository for karma operations.
pub struct KarmaRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> KarmaRepository<'a> {
    /// Create a new karma repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the entry for a subject, if any.
    pub async fn get(&self, subject: &str) -> Result<Option<KarmaEntry>, DbError> {
        let row = sqlx::query_as::<_, (String, i64, i64, i64)>(
            "SELECT subject, upvotes, downvotes, karma FROM karma WHERE subject = ?",
        )
        .bind(subject)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(entry_from_row))
    }

    /// Create a fresh entry with the given initial votes.
    pub async fn create(&self, subject: &str, upvotes: i64, downvotes: i64) -> Result<KarmaEntry, DbError> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO karma (subject, upvotes, downvotes, karma, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(subject)
        .bind(upvotes)
        .bind(downvotes)
        .bind(upvotes - downvotes)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, subject))?;

        Ok(KarmaEntry {
            subject: subject.to_string(),
            upvotes,
            downvotes,
            karma: upvotes - downvotes,
        })
    }

    /// Add votes to an existing entry and return the updated tally.
    pub async fn adjust(&self, subject: &str, upvotes: i64, downvotes: i64) -> Result<KarmaEntry, DbError> {
        let row = sqlx::query_as::<_, (String, i64, i64, i64)>(
            r#"
            UPDATE karma
            SET upvotes = upvotes + ?,
                downvotes = downvotes + ?,
                karma = (upvotes + ?) - (downvotes + ?)
            WHERE subject = ?
            RETURNING subject, upvotes, downvotes, karma
            "#,
        )
        .bind(upvotes)
        .bind(downvotes)
        .bind(upvotes)
        .bind(downvotes)
        .bind(subject)
        .fetch_optional(self.pool)
        .await?;

        row.map(entry_from_row)
            .ok_or_else(|| DbError::NotFound(subject.to_string()))
    }

    /// The `limit` most recently created entries.
    pub async fn list_newest(&self, limit: i64) -> Result<Vec<KarmaEntry>, DbError> {
        self.list("created_at DESC", limit).await
    }

    /// The `limit` highest-karma entries.
    pub async fn list_highest(&self, limit: i64) -> Result<Vec<KarmaEntry>, DbError> {
        self.list("karma DESC", limit).await
    }

    /// The `limit` lowest-karma entries.
    pub async fn list_lowest(&self, limit: i64) -> Result<Vec<KarmaEntry>, DbError> {
        self.list("karma ASC", limit).await
    }

    async fn list(&self, order: &str, limit: i64) -> Result<Vec<KarmaEntry>, DbError> {
        // `order` is one of three fixed literals above, never user input.
        let sql = format!(
            "SELECT subject, upvotes, downvotes, karma FROM karma ORDER BY {order} LIMIT ?"
        );
        let rows = sqlx::query_as::<_, (String, i64, i64, i64)>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(entry_from_row).collect())
    }
}

fn entry_from_row((subject, upvotes, downvotes, karma): (String, i64, i64, i64)) -> KarmaEntry {
    KarmaEntry { subject, upvotes, downvotes, karma }
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, DbError};

    #[tokio::test]
    async fn create_get_adjust() {
        let db = Database::new(":memory:").await.unwrap();

        let entry = db.karma().create("tavernd", 1, 0).await.unwrap();
        assert_eq!(entry.karma, 1);

        let entry = db.karma().adjust("tavernd", 0, 3).await.unwrap();
        assert_eq!(entry.upvotes, 1);
        assert_eq!(entry.downvotes, 3);
        assert_eq!(entry.karma, -2);

        let fetched = db.karma().get("tavernd").await.unwrap().unwrap();
        assert_eq!(fetched, entry);
    }

    #[tokio::test]
    async fn duplicate_subject_is_reported() {
        let db = Database::new(":memory:").await.unwrap();
        db.karma().create("x", 1, 0).await.unwrap();
        let err = db.karma().create("x", 1, 0).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn adjust_missing_subject_is_not_found() {
        let db = Database::new(":memory:").await.unwrap();
        let err = db.karma().adjust("ghost", 1, 0).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn leaderboards_order_and_limit() {
        let db = Database::new(":memory:").await.unwrap();
        db.karma().create("low", 0, 5).await.unwrap();
        db.karma().create("mid", 3, 1).await.unwrap();
        db.karma().create("high", 9, 0).await.unwrap();

        let top = db.karma().list_highest(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].subject, "high");
        assert_eq!(top[1].subject, "mid");

        let bottom = db.karma().list_lowest(1).await.unwrap();
        assert_eq!(bottom[0].subject, "low");
    }
}
