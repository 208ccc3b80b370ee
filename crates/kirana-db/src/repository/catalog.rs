//! # Catalog Repository
//!
//! Database operations for catalog items.
//!
//! ## Key Operations
//! - Case-insensitive lookup and prefix suggestions
//! - Single-statement stock decrement keyed by item name
//! - Restock (quantity replacement) for the purchase workflow
//!
//! ## Stock Adjustment
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │        Why adjust_stock_by_name Is One UPDATE              │
//! │                                                            │
//! │  read-then-write:   SELECT qty ──► compute ──► UPDATE      │
//! │                        └── two sales racing here both      │
//! │                            read 10, both write 7           │
//! │                                                            │
//! │  single statement:  UPDATE catalog                         │
//! │                     SET quantity = quantity + delta        │
//! │                     WHERE name = ? COLLATE NOCASE          │
//! │                        └── 10 ──► 7 ──► 4, never lost      │
//! └────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::watch::ChangeEvent;
use kirana_core::{CatalogItem, Money};

/// Generates a new catalog item ID (UUID v4).
pub fn generate_catalog_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw catalog row as stored. Converted to [`CatalogItem`] on read.
#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: String,
    name: String,
    price_paise: i64,
    quantity: i64,
    average_quantity: i64,
    created_at: String,
}

impl CatalogRow {
    fn into_item(self) -> DbResult<CatalogItem> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| DbError::Malformed(format!("catalog {} created_at: {}", self.id, e)))?
            .with_timezone(&Utc);

        Ok(CatalogItem {
            id: self.id,
            name: self.name,
            price: Money::from_paise(self.price_paise),
            quantity: self.quantity,
            average_quantity: self.average_quantity,
            created_at,
        })
    }
}

// =============================================================================
// Stock Adjustment Outcome
// =============================================================================

/// Outcome of a stock adjustment keyed by item name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockAdjustment {
    /// Exactly the matched item had its quantity changed.
    Applied,
    /// No catalog item matched the name; nothing was written.
    NoMatch,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
///
/// // Autocomplete while the clerk types
/// let hits = repo.suggest("so", 10).await?;
///
/// // Decrement stock after a sale line
/// let outcome = repo.adjust_stock_by_name("Soap", -2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
    events: broadcast::Sender<ChangeEvent>,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool, events: broadcast::Sender<ChangeEvent>) -> Self {
        CatalogRepository { pool, events }
    }

    /// Inserts a new catalog item.
    pub async fn insert(&self, item: &CatalogItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting catalog item");

        sqlx::query(
            r#"
            INSERT INTO catalog (id, name, price_paise, quantity, average_quantity, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price.paise())
        .bind(item.quantity)
        .bind(item.average_quantity)
        .bind(item.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.publish(&item.id);
        Ok(())
    }

    /// Lists all catalog items ordered by name.
    pub async fn list(&self) -> DbResult<Vec<CatalogItem>> {
        let rows = sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT id, name, price_paise, quantity, average_quantity, created_at
            FROM catalog
            ORDER BY name COLLATE NOCASE ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CatalogRow::into_item).collect()
    }

    /// Gets a catalog item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<CatalogItem> {
        let row = sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT id, name, price_paise, quantity, average_quantity, created_at
            FROM catalog
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| DbError::not_found("Catalog item", id))?
            .into_item()
    }

    /// Gets a catalog item by exact name, case-insensitively.
    ///
    /// "soap", "SOAP" and "Soap" all resolve to the same item.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<CatalogItem>> {
        let row = sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT id, name, price_paise, quantity, average_quantity, created_at
            FROM catalog
            WHERE name = ? COLLATE NOCASE
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CatalogRow::into_item).transpose()
    }

    /// Suggests catalog items whose name starts with the given prefix,
    /// case-insensitively. Used for entry-form autocomplete.
    ///
    /// ## Arguments
    /// * `prefix` - What the clerk has typed so far (can be empty)
    /// * `limit` - Maximum suggestions to return
    pub async fn suggest(&self, prefix: &str, limit: u32) -> DbResult<Vec<CatalogItem>> {
        // LIKE wildcards in user input must match literally.
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("{escaped}%");

        let rows = sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT id, name, price_paise, quantity, average_quantity, created_at
            FROM catalog
            WHERE name LIKE ? ESCAPE '\'
            ORDER BY name COLLATE NOCASE ASC
            LIMIT ?
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CatalogRow::into_item).collect()
    }

    /// Adjusts the stock of the item with the given name by `delta`
    /// (negative for a sale decrement) in a single UPDATE statement.
    ///
    /// The read-modify-write is done by the database engine, so two sales
    /// hitting the same item concurrently both land. The quantity may go
    /// negative; an oversold count is visible on the purchase list rather
    /// than silently clamped.
    ///
    /// Returns [`StockAdjustment::NoMatch`] when no item carries that name
    /// (for example after a catalog rename); the caller decides whether
    /// that's a warning or an error.
    pub async fn adjust_stock_by_name(
        &self,
        name: &str,
        delta: i64,
    ) -> DbResult<StockAdjustment> {
        debug!(name, delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE catalog
            SET quantity = quantity + ?
            WHERE name = ? COLLATE NOCASE
            "#,
        )
        .bind(delta)
        .bind(name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(name, "No catalog item matched; stock unchanged");
            return Ok(StockAdjustment::NoMatch);
        }

        self.publish(name);
        Ok(StockAdjustment::Applied)
    }

    /// Replaces the quantity of an item, used when a purchase arrives.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<()> {
        debug!(id, quantity, "Restocking item");

        let result = sqlx::query("UPDATE catalog SET quantity = ? WHERE id = ?")
            .bind(quantity)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Catalog item", id));
        }

        self.publish(id);
        Ok(())
    }

    /// Counts catalog items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    fn publish(&self, key: &str) {
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self.events.send(ChangeEvent::Catalog {
            key: key.to_string(),
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
