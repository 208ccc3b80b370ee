//! # Error Types
//!
//! Domain error types for kirana-core.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, offending values)
//! 3. Errors are enum variants, never bare strings
//! 4. Each variant maps to a user-facing message a cashier can act on

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any I/O happens: a submission that fails validation has
/// changed no state anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Phone number is not exactly ten digits.
    #[error("phone number must be exactly {expected} digits")]
    InvalidPhone { expected: usize },

    /// Value must be greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} cannot be negative")]
    MustBeNonNegative { field: String },

    /// The sale has no line items.
    #[error("at least one product is required")]
    NoLineItems,

    /// Discount is larger than the sum of line totals.
    #[error("discount {discount} cannot exceed the subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: Money, subtotal: Money },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "customer name".to_string(),
        };
        assert_eq!(err.to_string(), "customer name is required");

        let err = ValidationError::InvalidPhone { expected: 10 };
        assert_eq!(err.to_string(), "phone number must be exactly 10 digits");

        let err = ValidationError::DiscountExceedsSubtotal {
            discount: Money::from_rupees(200),
            subtotal: Money::from_rupees(100),
        };
        assert_eq!(
            err.to_string(),
            "discount ₹200.00 cannot exceed the subtotal ₹100.00"
        );
    }
}
