//! # Report Math
//!
//! Pure aggregation over sale records and catalog items: revenue summaries
//! split by payment method, chart buckets per period, most-sold product
//! ranking, and the purchase list of under-stocked items.
//!
//! Everything here takes slices of already-loaded records. The storage layer
//! has already discarded records with unparseable timestamps, so these
//! functions never see invalid dates.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CatalogItem, PaymentMethod, SaleRecord};

// =============================================================================
// Periods
// =============================================================================

/// Reporting window, anchored at "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    /// This week, starting Monday.
    Week,
    /// This calendar month.
    Month,
    /// This calendar year.
    Year,
}

/// Midnight UTC of the day containing `now`. The "today" summary window:
/// `summarize_between(records, day_start(now), now + 1s)` style ranges.
pub fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

/// Start of the given period containing `now` (midnight UTC).
pub fn period_start(period: ReportPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let start_date = match period {
        ReportPeriod::Week => {
            let back = today.weekday().num_days_from_monday() as i64;
            today - Duration::days(back)
        }
        ReportPeriod::Month => today.with_day(1).unwrap_or(today),
        ReportPeriod::Year => today.with_day(1).and_then(|d| d.with_month(1)).unwrap_or(today),
    };
    Utc.from_utc_datetime(&start_date.and_time(NaiveTime::MIN))
}

// =============================================================================
// Revenue Summaries
// =============================================================================

/// Revenue totals, split by payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total: Money,
    pub online: Money,
    pub cash: Money,
    pub sale_count: usize,
}

/// Sums all records into a [`RevenueSummary`].
pub fn summarize(records: &[SaleRecord]) -> RevenueSummary {
    let mut summary = RevenueSummary::default();
    for record in records {
        summary.total += record.total;
        match record.payment_method {
            PaymentMethod::Online => summary.online += record.total,
            PaymentMethod::Cash => summary.cash += record.total,
        }
        summary.sale_count += 1;
    }
    summary
}

/// Sums records whose timestamp falls in `[start, end)`.
pub fn summarize_between(
    records: &[SaleRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> RevenueSummary {
    let in_range: Vec<SaleRecord> = records
        .iter()
        .filter(|r| r.timestamp >= start && r.timestamp < end)
        .cloned()
        .collect();
    summarize(&in_range)
}

// =============================================================================
// Chart Buckets
// =============================================================================

/// Revenue per chart bucket for the period containing `now`.
///
/// Bucket labels, in chronological order and zero-filled:
/// - Week  → weekday names `Mon`..`Sun`
/// - Month → day of month `1`..last day
/// - Year  → month names `Jan`..`Dec`
pub fn revenue_buckets(
    records: &[SaleRecord],
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> Vec<(String, Money)> {
    let start = period_start(period, now);
    let labels = bucket_labels(period, now);

    let mut buckets: Vec<(String, Money)> =
        labels.into_iter().map(|l| (l, Money::zero())).collect();

    for record in records {
        if record.timestamp < start || record.timestamp > now {
            continue;
        }
        let label = match period {
            ReportPeriod::Week => record.timestamp.format("%a").to_string(),
            ReportPeriod::Month => record.timestamp.day().to_string(),
            ReportPeriod::Year => record.timestamp.format("%b").to_string(),
        };
        if let Some(bucket) = buckets.iter_mut().find(|(l, _)| *l == label) {
            bucket.1 += record.total;
        }
    }

    buckets
}

fn bucket_labels(period: ReportPeriod, now: DateTime<Utc>) -> Vec<String> {
    match period {
        ReportPeriod::Week => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        ReportPeriod::Month => {
            let days = days_in_month(now.year(), now.month());
            (1..=days).map(|d| d.to_string()).collect()
        }
        ReportPeriod::Year => [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next =
        NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap_or_else(|| Utc::now().date_naive());
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first_of_next);
    (first_of_next - first).num_days() as u32
}

// =============================================================================
// Most-Sold Products
// =============================================================================

/// Aggregated sales of one product name across records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub name: String,
    /// Units sold.
    pub count: i64,
    /// Revenue from those units (sum of line totals).
    pub revenue: Money,
}

/// Ranks products by units sold, descending. Ties break alphabetically so
/// the ranking is stable. Grouping is by the exact recorded name.
pub fn top_products(records: &[SaleRecord], limit: usize) -> Vec<ProductSales> {
    let mut by_name: HashMap<String, (i64, Money)> = HashMap::new();

    for record in records {
        for line in &record.products {
            let entry = by_name
                .entry(line.name.clone())
                .or_insert((0, Money::zero()));
            entry.0 += line.quantity;
            entry.1 += line.line_total;
        }
    }

    let mut ranked: Vec<ProductSales> = by_name
        .into_iter()
        .map(|(name, (count, revenue))| ProductSales { name, count, revenue })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// Purchase List
// =============================================================================

/// One under-stocked catalog item and how many units to buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSuggestion {
    pub name: String,
    pub quantity: i64,
    pub average_quantity: i64,
    /// Units needed to reach the target stocking level.
    pub deficit: i64,
}

/// Items below their target stocking level, largest deficit first.
pub fn purchase_list(items: &[CatalogItem]) -> Vec<PurchaseSuggestion> {
    let mut suggestions: Vec<PurchaseSuggestion> = items
        .iter()
        .filter(|item| item.needs_restock())
        .map(|item| PurchaseSuggestion {
            name: item.name.clone(),
            quantity: item.quantity,
            average_quantity: item.average_quantity,
            deficit: item.restock_deficit(),
        })
        .collect();

    suggestions.sort_by(|a, b| b.deficit.cmp(&a.deficit).then_with(|| a.name.cmp(&b.name)));
    suggestions
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleLine;

    fn record(total_rupees: i64, method: PaymentMethod, ts: &str) -> SaleRecord {
        SaleRecord {
            id: "sale".to_string(),
            customer_name: "Asha".to_string(),
            customer_phone: "9876543210".to_string(),
            products: vec![SaleLine {
                name: "Soap".to_string(),
                price: Money::from_rupees(total_rupees),
                quantity: 1,
                line_total: Money::from_rupees(total_rupees),
            }],
            discount: Money::zero(),
            total: Money::from_rupees(total_rupees),
            payment_method: method,
            timestamp: ts.parse().unwrap(),
        }
    }

    #[test]
    fn test_summarize_splits_by_method() {
        let records = vec![
            record(100, PaymentMethod::Cash, "2026-08-24T10:00:00Z"),
            record(60, PaymentMethod::Online, "2026-08-24T11:00:00Z"),
            record(40, PaymentMethod::Cash, "2026-08-24T12:00:00Z"),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.total, Money::from_rupees(200));
        assert_eq!(summary.cash, Money::from_rupees(140));
        assert_eq!(summary.online, Money::from_rupees(60));
        assert_eq!(summary.sale_count, 3);
    }

    #[test]
    fn test_summarize_between_is_half_open() {
        let records = vec![
            record(100, PaymentMethod::Cash, "2026-08-01T00:00:00Z"),
            record(60, PaymentMethod::Cash, "2026-08-15T00:00:00Z"),
            record(40, PaymentMethod::Cash, "2026-09-01T00:00:00Z"),
        ];

        let start: DateTime<Utc> = "2026-08-01T00:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2026-09-01T00:00:00Z".parse().unwrap();
        let summary = summarize_between(&records, start, end);
        assert_eq!(summary.total, Money::from_rupees(160));
        assert_eq!(summary.sale_count, 2);
    }

    #[test]
    fn test_period_start_week_is_monday() {
        // 2026-08-28 is a Friday.
        let now: DateTime<Utc> = "2026-08-28T15:30:00Z".parse().unwrap();
        let start = period_start(ReportPeriod::Week, now);
        assert_eq!(start.to_rfc3339(), "2026-08-24T00:00:00+00:00");
    }

    #[test]
    fn test_day_start() {
        let now: DateTime<Utc> = "2026-08-28T15:30:00Z".parse().unwrap();
        assert_eq!(day_start(now).to_rfc3339(), "2026-08-28T00:00:00+00:00");
    }

    #[test]
    fn test_period_start_month_and_year() {
        let now: DateTime<Utc> = "2026-08-28T15:30:00Z".parse().unwrap();
        assert_eq!(
            period_start(ReportPeriod::Month, now).to_rfc3339(),
            "2026-08-01T00:00:00+00:00"
        );
        assert_eq!(
            period_start(ReportPeriod::Year, now).to_rfc3339(),
            "2026-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_week_buckets() {
        let now: DateTime<Utc> = "2026-08-28T23:00:00Z".parse().unwrap();
        let records = vec![
            record(100, PaymentMethod::Cash, "2026-08-24T10:00:00Z"), // Monday
            record(60, PaymentMethod::Cash, "2026-08-24T18:00:00Z"),  // Monday
            record(40, PaymentMethod::Cash, "2026-08-28T09:00:00Z"),  // Friday
            record(999, PaymentMethod::Cash, "2026-08-20T09:00:00Z"), // previous week
        ];

        let buckets = revenue_buckets(&records, ReportPeriod::Week, now);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0], ("Mon".to_string(), Money::from_rupees(160)));
        assert_eq!(buckets[4], ("Fri".to_string(), Money::from_rupees(40)));
        assert_eq!(buckets[6].1, Money::zero());
    }

    #[test]
    fn test_month_bucket_count_matches_calendar() {
        let feb: DateTime<Utc> = "2026-02-10T00:00:00Z".parse().unwrap();
        assert_eq!(revenue_buckets(&[], ReportPeriod::Month, feb).len(), 28);

        let aug: DateTime<Utc> = "2026-08-10T00:00:00Z".parse().unwrap();
        assert_eq!(revenue_buckets(&[], ReportPeriod::Month, aug).len(), 31);
    }

    #[test]
    fn test_top_products() {
        let mut multi = record(100, PaymentMethod::Cash, "2026-08-24T10:00:00Z");
        multi.products = vec![
            SaleLine {
                name: "Soap".to_string(),
                price: Money::from_rupees(50),
                quantity: 3,
                line_total: Money::from_rupees(150),
            },
            SaleLine {
                name: "Rice".to_string(),
                price: Money::from_rupees(60),
                quantity: 5,
                line_total: Money::from_rupees(300),
            },
        ];
        let single = record(50, PaymentMethod::Cash, "2026-08-25T10:00:00Z");

        let ranked = top_products(&[multi, single], 10);
        assert_eq!(ranked[0].name, "Rice");
        assert_eq!(ranked[0].count, 5);
        assert_eq!(ranked[0].revenue, Money::from_rupees(300));
        // "Soap" appears in both records: 3 + 1 units.
        assert_eq!(ranked[1].name, "Soap");
        assert_eq!(ranked[1].count, 4);
    }

    #[test]
    fn test_top_products_limit() {
        let record = record(100, PaymentMethod::Cash, "2026-08-24T10:00:00Z");
        assert_eq!(top_products(&[record], 0).len(), 0);
    }

    #[test]
    fn test_purchase_list_orders_by_deficit() {
        let items = vec![
            CatalogItem {
                id: "1".to_string(),
                name: "Soap".to_string(),
                price: Money::from_rupees(50),
                quantity: 8,
                average_quantity: 10,
                created_at: Utc::now(),
            },
            CatalogItem {
                id: "2".to_string(),
                name: "Rice".to_string(),
                price: Money::from_rupees(60),
                quantity: 1,
                average_quantity: 20,
                created_at: Utc::now(),
            },
            CatalogItem {
                id: "3".to_string(),
                name: "Salt".to_string(),
                price: Money::from_rupees(20),
                quantity: 30,
                average_quantity: 10,
                created_at: Utc::now(),
            },
        ];

        let list = purchase_list(&items);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Rice");
        assert_eq!(list[0].deficit, 19);
        assert_eq!(list[1].name, "Soap");
        assert_eq!(list[1].deficit, 2);
    }
}
