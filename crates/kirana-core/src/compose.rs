//! # Sale Composition
//!
//! The Sale Composer: turns a validated draft into an immutable
//! [`SaleRecord`].
//!
//! ## Contract
//! `SaleDraft::compose` is a pure function. Given the same draft, id and
//! timestamp it always produces the same record; the caller injects both the
//! generated id and the clock reading so the composer itself stays
//! deterministic and I/O free.
//!
//! ```text
//! SaleDraft ──validate──► per-line totals ──► subtotal ──► total
//!                                                 │
//!                              SaleRecord { products, discount, total, … }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationResult;
use crate::money::Money;
use crate::types::{PaymentMethod, SaleLine, SaleRecord};
use crate::validation;

// =============================================================================
// Draft Types
// =============================================================================

/// One product row as entered on the sale form, before composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineInput {
    pub name: String,
    pub price: Money,
    pub quantity: i64,
}

/// Everything the sale form collects, prior to validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub lines: Vec<LineInput>,
    pub discount: Money,
    pub payment_method: PaymentMethod,
}

impl SaleDraft {
    /// Sum of `price * quantity` over all lines.
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .map(|line| line.price.multiply_quantity(line.quantity))
            .sum()
    }

    /// Runs every form-level rule, in the order the form surfaces them:
    /// customer fields first, then each line, then the discount.
    ///
    /// Succeeding here guarantees composition cannot fail and that no I/O
    /// has been performed yet.
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_customer_name(&self.customer_name)?;
        validation::validate_phone(&self.customer_phone)?;

        if self.lines.is_empty() {
            return Err(crate::ValidationError::NoLineItems);
        }

        for (index, line) in self.lines.iter().enumerate() {
            validation::validate_line(index, &line.name, line.price, line.quantity)?;
        }

        validation::validate_discount(self.discount, self.subtotal())?;

        Ok(())
    }

    /// Validates the draft and composes the immutable [`SaleRecord`].
    ///
    /// Line totals are computed per line, `total = subtotal - discount`.
    /// Names are trimmed; prices and quantities are frozen as entered.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use kirana_core::{LineInput, Money, PaymentMethod, SaleDraft};
    ///
    /// let draft = SaleDraft {
    ///     customer_name: "Asha".to_string(),
    ///     customer_phone: "9876543210".to_string(),
    ///     lines: vec![LineInput {
    ///         name: "Soap".to_string(),
    ///         price: Money::from_rupees(50),
    ///         quantity: 2,
    ///     }],
    ///     discount: Money::zero(),
    ///     payment_method: PaymentMethod::Cash,
    /// };
    ///
    /// let record = draft.compose("sale-1".to_string(), Utc::now()).unwrap();
    /// assert_eq!(record.total, Money::from_rupees(100));
    /// ```
    pub fn compose(&self, id: String, timestamp: DateTime<Utc>) -> ValidationResult<SaleRecord> {
        self.validate()?;

        let products: Vec<SaleLine> = self
            .lines
            .iter()
            .map(|line| SaleLine {
                name: line.name.trim().to_string(),
                price: line.price,
                quantity: line.quantity,
                line_total: line.price.multiply_quantity(line.quantity),
            })
            .collect();

        let subtotal: Money = products.iter().map(|p| p.line_total).sum();

        Ok(SaleRecord {
            id,
            customer_name: self.customer_name.trim().to_string(),
            customer_phone: self.customer_phone.trim().to_string(),
            products,
            discount: self.discount,
            total: subtotal - self.discount,
            payment_method: self.payment_method,
            timestamp,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> SaleDraft {
        SaleDraft {
            customer_name: "Asha".to_string(),
            customer_phone: "9876543210".to_string(),
            lines: vec![
                LineInput {
                    name: "Soap".to_string(),
                    price: Money::from_rupees(50),
                    quantity: 2,
                },
                LineInput {
                    name: "Rice".to_string(),
                    price: Money::from_rupees(60),
                    quantity: 1,
                },
            ],
            discount: Money::from_rupees(10),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_compose_totals() {
        let record = draft().compose("sale-1".to_string(), Utc::now()).unwrap();

        assert_eq!(record.products[0].line_total, Money::from_rupees(100));
        assert_eq!(record.products[1].line_total, Money::from_rupees(60));
        assert_eq!(record.subtotal(), Money::from_rupees(160));
        assert_eq!(record.total, Money::from_rupees(150));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let now = Utc::now();
        let a = draft().compose("sale-1".to_string(), now).unwrap();
        let b = draft().compose("sale-1".to_string(), now).unwrap();

        assert_eq!(a.products, b.products);
        assert_eq!(a.total, b.total);
        assert_eq!(a.timestamp, b.timestamp);
    }

    #[test]
    fn test_compose_trims_names() {
        let mut d = draft();
        d.customer_name = "  Asha  ".to_string();
        d.lines[0].name = " Soap ".to_string();

        let record = d.compose("sale-1".to_string(), Utc::now()).unwrap();
        assert_eq!(record.customer_name, "Asha");
        assert_eq!(record.products[0].name, "Soap");
    }

    #[test]
    fn test_discount_equal_to_subtotal_gives_zero_total() {
        let mut d = draft();
        d.discount = Money::from_rupees(160);

        let record = d.compose("sale-1".to_string(), Utc::now()).unwrap();
        assert_eq!(record.total, Money::zero());
    }

    #[test]
    fn test_discount_above_subtotal_rejected() {
        let mut d = draft();
        d.discount = Money::from_paise(16_001);
        assert!(d.compose("sale-1".to_string(), Utc::now()).is_err());
    }

    #[test]
    fn test_short_phone_rejected() {
        let mut d = draft();
        d.customer_phone = "98765".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_empty_lines_rejected() {
        let mut d = draft();
        d.lines.clear();
        assert!(matches!(
            d.validate(),
            Err(crate::ValidationError::NoLineItems)
        ));
    }
}
