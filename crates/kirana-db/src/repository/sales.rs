//! # Sales Repository
//!
//! Append-only sales log. A sale's line items are persisted as one JSON
//! document in the row: the sale is the unit of record, not the line, and
//! the stored shape is exactly what readers get back.
//!
//! Readers are tolerant of damage. A row whose timestamp, line-item JSON or
//! payment method no longer parses is logged and skipped rather than
//! failing the whole listing; one corrupt record must not take down the
//! reports screen.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::watch::ChangeEvent;
use kirana_core::{Money, PaymentMethod, SaleLine, SaleRecord};

/// Generates a new sale record ID (UUID v4).
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw sales row as stored. Converted to [`SaleRecord`] on read; conversion
/// failures are reported per row so listings can skip damaged records.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    customer_name: String,
    customer_phone: String,
    products: String,
    discount_paise: i64,
    total_paise: i64,
    payment_method: String,
    recorded_at: String,
}

impl SaleRow {
    fn into_record(self) -> Result<SaleRecord, String> {
        let timestamp = DateTime::parse_from_rfc3339(&self.recorded_at)
            .map_err(|e| format!("recorded_at: {e}"))?
            .with_timezone(&Utc);

        let products: Vec<SaleLine> =
            serde_json::from_str(&self.products).map_err(|e| format!("products: {e}"))?;

        let payment_method = PaymentMethod::parse(&self.payment_method)
            .ok_or_else(|| format!("payment_method: '{}'", self.payment_method))?;

        Ok(SaleRecord {
            id: self.id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            products,
            discount: Money::from_paise(self.discount_paise),
            total: Money::from_paise(self.total_paise),
            payment_method,
            timestamp,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the append-only sales log.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.sales();
/// repo.append(&record).await?;
/// let recent = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: SqlitePool,
    events: broadcast::Sender<ChangeEvent>,
}

impl SalesRepository {
    /// Creates a new SalesRepository.
    pub fn new(pool: SqlitePool, events: broadcast::Sender<ChangeEvent>) -> Self {
        SalesRepository { pool, events }
    }

    /// Appends a sale record to the log.
    ///
    /// The record's `id` is the generated key; callers obtain one from
    /// [`generate_sale_id`]. Existing records are never updated.
    pub async fn append(&self, record: &SaleRecord) -> DbResult<()> {
        debug!(id = %record.id, total = %record.total, "Appending sale record");

        let products = serde_json::to_string(&record.products)
            .map_err(|e| crate::error::DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, customer_name, customer_phone, products,
                discount_paise, total_paise, payment_method, recorded_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.customer_name)
        .bind(&record.customer_phone)
        .bind(products)
        .bind(record.discount.paise())
        .bind(record.total.paise())
        .bind(record.payment_method.as_str())
        .bind(record.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let _ = self.events.send(ChangeEvent::SaleAppended {
            id: record.id.clone(),
        });
        Ok(())
    }

    /// Lists all sales, newest first. Damaged rows are skipped with a
    /// warning.
    pub async fn list(&self) -> DbResult<Vec<SaleRecord>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, customer_name, customer_phone, products,
                   discount_paise, total_paise, payment_method, recorded_at
            FROM sales
            ORDER BY recorded_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Self::decode_rows(rows))
    }

    /// Lists sales for one customer phone number, newest first.
    pub async fn list_by_phone(&self, phone: &str) -> DbResult<Vec<SaleRecord>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, customer_name, customer_phone, products,
                   discount_paise, total_paise, payment_method, recorded_at
            FROM sales
            WHERE customer_phone = ?
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        Ok(Self::decode_rows(rows))
    }

    /// Returns the customer name from the most recent sale on this phone
    /// number, for prefilling the entry form.
    pub async fn last_customer_name(&self, phone: &str) -> DbResult<Option<String>> {
        let name: Option<String> = sqlx::query_scalar(
            r#"
            SELECT customer_name
            FROM sales
            WHERE customer_phone = ?
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name)
    }

    /// Lists sales recorded in `[start, end)`, oldest first.
    ///
    /// Timestamps are stored as RFC 3339 text in UTC, so lexicographic
    /// range comparison is chronological.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SaleRecord>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, customer_name, customer_phone, products,
                   discount_paise, total_paise, payment_method, recorded_at
            FROM sales
            WHERE recorded_at >= ? AND recorded_at < ?
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        Ok(Self::decode_rows(rows))
    }

    /// Counts sale records, damaged rows included.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    fn decode_rows(rows: Vec<SaleRow>) -> Vec<SaleRecord> {
        rows.into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match row.into_record() {
                    Ok(record) => Some(record),
                    Err(reason) => {
                        warn!(id, reason, "Skipping damaged sale record");
                        None
                    }
                }
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn record(phone: &str, name: &str, at: DateTime<Utc>) -> SaleRecord {
        SaleRecord {
            id: generate_sale_id(),
            customer_name: name.to_string(),
            customer_phone: phone.to_string(),
            products: vec![SaleLine {
                name: "Soap".to_string(),
                price: Money::from_paise(5000),
                quantity: 2,
                line_total: Money::from_paise(10000),
            }],
            discount: Money::zero(),
            total: Money::from_paise(10000),
            payment_method: PaymentMethod::Cash,
            timestamp: at,
        }
    }

    #[tokio::test]
    async fn test_append_and_list_round_trip() {
        let db = test_db().await;
        let repo = db.sales();

        let rec = record("9876543210", "Asha", Utc::now());
        repo.append(&rec).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, rec.id);
        assert_eq!(all[0].products[0].line_total, Money::from_paise(10000));
        assert_eq!(all[0].payment_method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = test_db().await;
        let repo = db.sales();

        let older = Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2026, 8, 2, 9, 0, 0).unwrap();

        let first = record("9876543210", "Asha", older);
        let second = record("9876543210", "Asha", newer);
        repo.append(&first).await.unwrap();
        repo.append(&second).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[tokio::test]
    async fn test_last_customer_name_prefill() {
        let db = test_db().await;
        let repo = db.sales();

        let older = Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2026, 8, 2, 9, 0, 0).unwrap();
        repo.append(&record("9876543210", "Asha", older))
            .await
            .unwrap();
        repo.append(&record("9876543210", "Asha Devi", newer))
            .await
            .unwrap();

        let name = repo.last_customer_name("9876543210").await.unwrap();
        assert_eq!(name.as_deref(), Some("Asha Devi"));

        let missing = repo.last_customer_name("0000000000").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_list_between_half_open_range() {
        let db = test_db().await;
        let repo = db.sales();

        let inside = Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap();
        let at_end = Utc.with_ymd_and_hms(2026, 8, 11, 0, 0, 0).unwrap();
        repo.append(&record("9876543210", "Asha", inside))
            .await
            .unwrap();
        repo.append(&record("9876543210", "Asha", at_end))
            .await
            .unwrap();

        let start = Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap();
        let found = repo.list_between(start, at_end).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].timestamp, inside);
    }

    #[tokio::test]
    async fn test_damaged_row_is_skipped_not_fatal() {
        let db = test_db().await;
        let repo = db.sales();

        repo.append(&record("9876543210", "Asha", Utc::now()))
            .await
            .unwrap();

        // Corrupt a row behind the repository's back.
        sqlx::query(
            r#"
            INSERT INTO sales (id, customer_name, customer_phone, products,
                               discount_paise, total_paise, payment_method, recorded_at)
            VALUES ('bad', 'X', '1111111111', 'not-json', 0, 0, 'cash', 'not-a-time')
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_append_publishes_event() {
        let db = test_db().await;
        let repo = db.sales();
        let mut sub = db.subscribe();

        let rec = record("9876543210", "Asha", Utc::now());
        repo.append(&rec).await.unwrap();

        assert_eq!(
            sub.next().await,
            Some(ChangeEvent::SaleAppended { id: rec.id })
        );
    }
}
