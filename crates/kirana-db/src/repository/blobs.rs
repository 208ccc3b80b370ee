//! # Blob Store
//!
//! Stores generated binary payloads (invoice PDFs) and hands back the
//! durable public URL a customer can retrieve them from. The URL is the
//! configured base joined with the blob path, so moving hosting only means
//! changing [`crate::DbConfig::blob_base_url`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// A stored blob: where it lives and the public URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Storage path, e.g. `invoices/Invoice_2026-08-28T10-15-00.pdf`.
    pub path: String,
    /// Public retrieval URL derived from the configured base.
    pub url: String,
}

/// Content-addressed-by-path blob storage.
#[derive(Debug, Clone)]
pub struct BlobStore {
    pool: SqlitePool,
    base_url: String,
}

impl BlobStore {
    /// Creates a new BlobStore serving blobs under `base_url`.
    pub fn new(pool: SqlitePool, base_url: String) -> Self {
        BlobStore { pool, base_url }
    }

    /// Stores a blob, replacing any previous content at the same path.
    pub async fn put(
        &self,
        path: &str,
        content_type: &str,
        data: &[u8],
    ) -> DbResult<StoredBlob> {
        debug!(path, bytes = data.len(), "Storing blob");

        sqlx::query(
            r#"
            INSERT INTO blobs (path, content_type, data, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (path) DO UPDATE
            SET content_type = excluded.content_type,
                data = excluded.data,
                created_at = excluded.created_at
            "#,
        )
        .bind(path)
        .bind(content_type)
        .bind(data)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(StoredBlob {
            path: path.to_string(),
            url: self.url_for(path),
        })
    }

    /// Retrieves a blob's bytes by path.
    pub async fn get(&self, path: &str) -> DbResult<Vec<u8>> {
        let data: Option<Vec<u8>> = sqlx::query_scalar("SELECT data FROM blobs WHERE path = ?")
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;

        data.ok_or_else(|| DbError::not_found("Blob", path))
    }

    /// Public URL for a blob path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
