//! # Validation Module
//!
//! Field-level business rule validation.
//!
//! These checks run before any I/O: a submission that fails here is rejected
//! with a user-facing message and no state anywhere has changed. The sale
//! pipeline in kirana-billing calls them through [`crate::SaleDraft`];
//! catalog entry calls [`validate_catalog_entry`] directly.

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::PHONE_DIGITS;

// =============================================================================
// Customer Fields
// =============================================================================

/// Validates a customer name: must be non-empty after trimming.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }
    Ok(())
}

/// Validates a customer phone number: exactly ten ASCII digits.
///
/// ## Example
/// ```rust
/// use kirana_core::validation::validate_phone;
///
/// assert!(validate_phone("9876543210").is_ok());
/// assert!(validate_phone("12345").is_err());
/// assert!(validate_phone("98765432 1").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhone {
            expected: PHONE_DIGITS,
        });
    }
    Ok(())
}

// =============================================================================
// Line Item Fields
// =============================================================================

/// Validates one sale line. `index` is zero-based; messages show it
/// one-based the way the form labels rows.
pub fn validate_line(index: usize, name: &str, price: Money, quantity: i64) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: format!("product {} name", index + 1),
        });
    }

    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: format!("product {} price", index + 1),
        });
    }

    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: format!("product {} quantity", index + 1),
        });
    }

    Ok(())
}

/// Validates the discount against the computed subtotal.
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed the subtotal (`discount == subtotal` is allowed and
///   yields a zero total)
pub fn validate_discount(discount: Money, subtotal: Money) -> ValidationResult<()> {
    if discount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "discount".to_string(),
        });
    }

    if discount > subtotal {
        return Err(ValidationError::DiscountExceedsSubtotal { discount, subtotal });
    }

    Ok(())
}

// =============================================================================
// Catalog Entry
// =============================================================================

/// Validates a new catalog entry.
///
/// ## Rules
/// - Name must be non-empty
/// - Price must be positive
/// - On-hand quantity and target (average) quantity must be non-negative
///   (zero is fine: an item can be entered before stock arrives)
pub fn validate_catalog_entry(
    name: &str,
    price: Money,
    quantity: i64,
    average_quantity: i64,
) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product name".to_string(),
        });
    }

    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }

    if average_quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "average quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Asha").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("   ").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("987654321").is_err()); // 9 digits
        assert!(validate_phone("98765432100").is_err()); // 11 digits
        assert!(validate_phone("98765abcde").is_err());
        assert!(validate_phone("9876 43210").is_err());
    }

    #[test]
    fn test_validate_line() {
        assert!(validate_line(0, "Soap", Money::from_rupees(50), 2).is_ok());

        assert!(validate_line(0, "", Money::from_rupees(50), 2).is_err());
        assert!(validate_line(0, "Soap", Money::zero(), 2).is_err());
        assert!(validate_line(0, "Soap", Money::from_paise(-100), 2).is_err());
        assert!(validate_line(0, "Soap", Money::from_rupees(50), 0).is_err());
        assert!(validate_line(0, "Soap", Money::from_rupees(50), -1).is_err());
    }

    #[test]
    fn test_line_errors_name_the_row() {
        let err = validate_line(2, "", Money::from_rupees(50), 1).unwrap_err();
        assert_eq!(err.to_string(), "product 3 name is required");
    }

    #[test]
    fn test_validate_discount() {
        let subtotal = Money::from_rupees(100);

        assert!(validate_discount(Money::zero(), subtotal).is_ok());
        assert!(validate_discount(Money::from_rupees(50), subtotal).is_ok());
        // Discount equal to subtotal is allowed (total becomes zero).
        assert!(validate_discount(subtotal, subtotal).is_ok());

        assert!(validate_discount(Money::from_paise(-1), subtotal).is_err());
        assert!(validate_discount(Money::from_paise(10_001), subtotal).is_err());
    }

    #[test]
    fn test_validate_catalog_entry() {
        assert!(validate_catalog_entry("Soap", Money::from_rupees(50), 20, 25).is_ok());
        assert!(validate_catalog_entry("Soap", Money::from_rupees(50), 0, 0).is_ok());

        assert!(validate_catalog_entry("", Money::from_rupees(50), 20, 25).is_err());
        assert!(validate_catalog_entry("Soap", Money::zero(), 20, 25).is_err());
        assert!(validate_catalog_entry("Soap", Money::from_rupees(50), -1, 25).is_err());
        assert!(validate_catalog_entry("Soap", Money::from_rupees(50), 20, -1).is_err());
    }
}
