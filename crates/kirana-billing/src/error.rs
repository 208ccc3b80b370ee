//! # Billing Error Types
//!
//! Errors for the sale pipeline. Validation and storage errors pass
//! through transparently so callers can show the same field messages the
//! pure layer produces; gateway and rendering failures get their own
//! variants because the pipeline treats them as soft (best-effort steps
//! record a failed outcome instead of aborting the sale).

use thiserror::Error;

use kirana_core::ValidationError;
use kirana_db::DbError;

/// Sale pipeline errors.
#[derive(Debug, Error)]
pub enum BillingError {
    /// A form field failed validation; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A storage operation failed.
    #[error(transparent)]
    Db(#[from] DbError),

    /// The messaging gateway answered with an error response.
    #[error("Gateway rejected the request: {message}")]
    Gateway { message: String },

    /// The messaging gateway could not be reached at all.
    #[error("Gateway unreachable: {0}")]
    GatewayUnreachable(String),

    /// Invoice PDF rendering failed.
    #[error("Invoice rendering failed: {0}")]
    Pdf(String),
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        BillingError::GatewayUnreachable(err.to_string())
    }
}

/// Result type for billing operations.
pub type BillingResult<T> = Result<T, BillingError>;
