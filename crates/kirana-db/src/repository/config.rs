//! # Configuration Repository
//!
//! Key-value configuration storage. The only key the sale workflow reads is
//! the messaging gateway session token, kept under the fixed key
//! [`kirana_core::TOKEN_CONFIG_KEY`]; the generic get/set surface covers
//! the rest.

use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::DbResult;
use crate::watch::ChangeEvent;
use kirana_core::TOKEN_CONFIG_KEY;

/// Repository for key-value configuration.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
    events: broadcast::Sender<ChangeEvent>,
}

impl ConfigRepository {
    /// Creates a new ConfigRepository.
    pub fn new(pool: SqlitePool, events: broadcast::Sender<ChangeEvent>) -> Self {
        ConfigRepository { pool, events }
    }

    /// Gets a configuration value by key.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM config WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Sets a configuration value, inserting or replacing.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key, "Setting config value");

        sqlx::query(
            r#"
            INSERT INTO config (key, value) VALUES (?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        let _ = self.events.send(ChangeEvent::Config {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Reads the messaging gateway session token.
    ///
    /// `None` means no session has been paired yet; the sale workflow then
    /// records its notification step as skipped instead of failing.
    pub async fn token(&self) -> DbResult<Option<String>> {
        self.get(TOKEN_CONFIG_KEY).await
    }

    /// Stores the messaging gateway session token.
    pub async fn set_token(&self, token: &str) -> DbResult<()> {
        self.set(TOKEN_CONFIG_KEY, token).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let db = test_db().await;
        assert_eq!(db.config().get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_and_overwrite() {
        let db = test_db().await;
        let repo = db.config();

        repo.set("shop_name", "Kirana Corner").await.unwrap();
        assert_eq!(
            repo.get("shop_name").await.unwrap().as_deref(),
            Some("Kirana Corner")
        );

        repo.set("shop_name", "Kirana Corner 2").await.unwrap();
        assert_eq!(
            repo.get("shop_name").await.unwrap().as_deref(),
            Some("Kirana Corner 2")
        );
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let db = test_db().await;
        let repo = db.config();

        assert_eq!(repo.token().await.unwrap(), None);
        repo.set_token("session-abc").await.unwrap();
        assert_eq!(repo.token().await.unwrap().as_deref(), Some("session-abc"));
    }

    #[tokio::test]
    async fn test_set_publishes_config_event() {
        let db = test_db().await;
        let mut sub = db.subscribe();

        db.config().set_token("session-abc").await.unwrap();

        assert_eq!(
            sub.next().await,
            Some(ChangeEvent::Config {
                key: TOKEN_CONFIG_KEY.to_string()
            })
        );
    }
}
