//! # Document Repository
//!
//! JSON documents addressed by `(collection, id)`.
//!
//! ## Write Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert(id, doc)   fails with UniqueViolation if the id exists          │
//! │  put(id, doc)      upsert; keeps the original created_at                │
//! │  merge(id, patch)  JSON merge patch; NotFound if the id is missing      │
//! │  delete(id)        true if a row was removed                            │
//! │                                                                         │
//! │  Every successful write publishes a DocumentChange.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `list()` returns documents in insertion order, which is the catalog
//! order the views rely on.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::{ChangeKind, DocumentChange};

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: String,
}

/// Repository for one document collection.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
    collection: String,
    changes: broadcast::Sender<DocumentChange>,
}

impl DocumentRepository {
    pub fn new(
        pool: SqlitePool,
        collection: impl Into<String>,
        changes: broadcast::Sender<DocumentChange>,
    ) -> Self {
        DocumentRepository {
            pool,
            collection: collection.into(),
            changes,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Reads one document.
    ///
    /// ## Returns
    /// * `Ok(Some(T))` - Document found and decoded
    /// * `Ok(None)` - No document with this id
    /// * `Err(DbError::Serialization)` - Stored JSON doesn't fit `T`
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> DbResult<Option<T>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, data FROM documents WHERE collection = ?1 AND id = ?2",
        )
        .bind(&self.collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.data)?)),
            None => Ok(None),
        }
    }

    /// Lists every document in the collection, oldest first.
    pub async fn list<T: DeserializeOwned>(&self) -> DbResult<Vec<T>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data FROM documents
            WHERE collection = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        debug!(collection = %self.collection, count = rows.len(), "Listed documents");

        rows.into_iter()
            .map(|row| {
                serde_json::from_str(&row.data).map_err(|e| {
                    DbError::Serialization(format!("{}/{}: {}", self.collection, row.id, e))
                })
            })
            .collect()
    }

    /// Creates a document. Fails if the id is already taken.
    pub async fn insert<T: Serialize>(&self, id: &str, doc: &T) -> DbResult<()> {
        let data = serde_json::to_string(doc)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(&self.collection)
        .bind(id)
        .bind(&data)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("id", id),
            other => other,
        })?;

        debug!(collection = %self.collection, id = %id, "Inserted document");
        self.publish(id, ChangeKind::Written);
        Ok(())
    }

    /// Creates or replaces a document.
    pub async fn put<T: Serialize>(&self, id: &str, doc: &T) -> DbResult<()> {
        let data = serde_json::to_string(doc)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.collection)
        .bind(id)
        .bind(&data)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(collection = %self.collection, id = %id, "Stored document");
        self.publish(id, ChangeKind::Written);
        Ok(())
    }

    /// Applies a JSON merge patch (RFC 7396) to an existing document and
    /// returns the merged result.
    ///
    /// Object keys in `patch` overwrite; `null` removes the key. The
    /// update is a single statement so concurrent merges can't lose keys.
    pub async fn merge(&self, id: &str, patch: &Value) -> DbResult<Value> {
        let patch = serde_json::to_string(patch)?;
        let now = Utc::now();

        let merged: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE documents
            SET data = json_patch(data, ?3), updated_at = ?4
            WHERE collection = ?1 AND id = ?2
            RETURNING data
            "#,
        )
        .bind(&self.collection)
        .bind(id)
        .bind(&patch)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        let merged = merged.ok_or_else(|| DbError::not_found(self.collection.clone(), id))?;

        debug!(collection = %self.collection, id = %id, "Merged document");
        self.publish(id, ChangeKind::Written);
        Ok(serde_json::from_str(&merged)?)
    }

    /// Deletes a document. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(&self.collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            debug!(collection = %self.collection, id = %id, "Deleted document");
            self.publish(id, ChangeKind::Deleted);
        }
        Ok(removed)
    }

    /// Deletes every document in the collection. Returns the number removed.
    pub async fn clear(&self) -> DbResult<u64> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM documents WHERE collection = ?1")
                .bind(&self.collection)
                .fetch_all(&self.pool)
                .await?;

        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1")
            .bind(&self.collection)
            .execute(&self.pool)
            .await?;

        for id in &ids {
            self.publish(id, ChangeKind::Deleted);
        }
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?1")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    fn publish(&self, id: &str, kind: ChangeKind) {
        // Err only means nobody is subscribed
        let _ = self.changes.send(DocumentChange {
            collection: self.collection.clone(),
            id: id.to_string(),
            kind,
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
