//! # Domain Types
//!
//! Core domain types used throughout Kirana POS.
//!
//! ## Type Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  CatalogItem                    SaleRecord                          │
//! │  ───────────                    ──────────                          │
//! │  id (UUID)                      id (UUID)                           │
//! │  name ◄······ case-insensitive  customer_name / customer_phone      │
//! │  price        soft reference    products: Vec<SaleLine>             │
//! │  quantity           ·····►        └─ name, price, qty, line_total   │
//! │  average_quantity               discount / total / payment_method   │
//! │  created_at                     timestamp                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A sale line references a catalog item **by name**, matched
//! case-insensitively, not by id. This is deliberate: a sale may name a
//! product that no longer exists in the catalog, and stock adjustment then
//! silently no-ops with a warning. Renaming a catalog item breaks stock
//! adjustment for sales recorded under the old name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Catalog Item
// =============================================================================

/// A stocked product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique identifier (UUID v4), generated at insert time.
    pub id: String,

    /// Display name. Sale lines match against this, case-insensitively.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// On-hand count. Decremented by sales, raised by restocks.
    ///
    /// `quantity >= 0` is the intended contract, but the sale pipeline does
    /// not enforce a floor: concurrent or over-counted sales can drive it
    /// negative, and the purchase list is where that surfaces.
    pub quantity: i64,

    /// Target stocking level, set at creation and compared against
    /// `quantity` to flag restocking needs.
    pub average_quantity: i64,

    /// When the item was added to the catalog.
    pub created_at: DateTime<Utc>,
}

impl CatalogItem {
    /// How many units short of the target stocking level this item is.
    /// Zero when at or above target.
    pub fn restock_deficit(&self) -> i64 {
        (self.average_quantity - self.quantity).max(0)
    }

    /// Whether the item is below its target stocking level.
    pub fn needs_restock(&self) -> bool {
        self.quantity < self.average_quantity
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
///
/// Serialized as `"Online"` / `"Cash"`, the exact strings the sale documents
/// and report filters use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Online,
    Cash,
}

impl PaymentMethod {
    /// Stable string form used in storage and on invoices.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "Online",
            PaymentMethod::Cash => "Cash",
        }
    }

    /// Parses the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Online" => Some(PaymentMethod::Online),
            "Cash" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// One product entry within a sale.
///
/// Uses the snapshot pattern: name and price are frozen at sale time, so the
/// record stays accurate even if the catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    /// Product name at time of sale (soft reference into the catalog).
    pub name: String,

    /// Unit price at time of sale.
    pub price: Money,

    /// Quantity sold.
    pub quantity: i64,

    /// `price * quantity`, precomputed at composition time.
    pub line_total: Money,
}

// =============================================================================
// Sale Record
// =============================================================================

/// A recorded sale. Created once by the Sale Composer, appended to the sales
/// log, and never mutated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    /// Unique identifier (UUID v4), generated at append time.
    pub id: String,

    pub customer_name: String,

    /// 10-digit phone number, without country calling code.
    pub customer_phone: String,

    pub products: Vec<SaleLine>,

    /// Flat discount subtracted from the subtotal. Never exceeds it.
    pub discount: Money,

    /// `subtotal - discount`.
    pub total: Money,

    pub payment_method: PaymentMethod,

    /// When the sale was recorded. Persisted as RFC 3339 text; readers
    /// discard stored records whose timestamp does not parse.
    pub timestamp: DateTime<Utc>,
}

impl SaleRecord {
    /// Sum of all line totals, before discount.
    pub fn subtotal(&self) -> Money {
        self.products.iter().map(|line| line.line_total).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, average: i64) -> CatalogItem {
        CatalogItem {
            id: "item-1".to_string(),
            name: "Soap".to_string(),
            price: Money::from_rupees(50),
            quantity,
            average_quantity: average,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_restock_deficit() {
        assert_eq!(item(3, 10).restock_deficit(), 7);
        assert_eq!(item(10, 10).restock_deficit(), 0);
        assert_eq!(item(15, 10).restock_deficit(), 0);
        // Negative stock counts fully against the target.
        assert_eq!(item(-2, 10).restock_deficit(), 12);
    }

    #[test]
    fn test_payment_method_round_trip() {
        assert_eq!(PaymentMethod::parse("Online"), Some(PaymentMethod::Online));
        assert_eq!(PaymentMethod::parse("Cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("card"), None);
        assert_eq!(PaymentMethod::Online.as_str(), "Online");
    }

    #[test]
    fn test_sale_line_document_shape() {
        let line = SaleLine {
            name: "Soap".to_string(),
            price: Money::from_rupees(50),
            quantity: 2,
            line_total: Money::from_rupees(100),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["name"], "Soap");
        assert_eq!(json["price"], 5000);
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["lineTotal"], 10_000);
    }

    #[test]
    fn test_subtotal() {
        let record = SaleRecord {
            id: "sale-1".to_string(),
            customer_name: "Asha".to_string(),
            customer_phone: "9876543210".to_string(),
            products: vec![
                SaleLine {
                    name: "Soap".to_string(),
                    price: Money::from_rupees(50),
                    quantity: 2,
                    line_total: Money::from_rupees(100),
                },
                SaleLine {
                    name: "Rice".to_string(),
                    price: Money::from_rupees(60),
                    quantity: 1,
                    line_total: Money::from_rupees(60),
                },
            ],
            discount: Money::from_rupees(10),
            total: Money::from_rupees(150),
            payment_method: PaymentMethod::Cash,
            timestamp: Utc::now(),
        };
        assert_eq!(record.subtotal(), Money::from_rupees(160));
    }
}
