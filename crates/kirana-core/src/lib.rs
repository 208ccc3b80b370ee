//! # kirana-core: Pure Business Logic for Kirana POS
//!
//! This crate is the **heart** of Kirana POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Kirana POS Architecture                        │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │              kirana-billing (Sale Pipeline)                 │   │
//! │  │   validate ─► compose ─► adjust stock ─► persist ─► notify  │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │              ★ kirana-core (THIS CRATE) ★                   │   │
//! │  │                                                             │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────┐ │   │
//! │  │  │  types  │ │  money  │ │ compose │ │validation│ │report│ │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └──────────┘ └──────┘ │   │
//! │  │                                                             │   │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │                  kirana-db (Storage Layer)                  │   │
//! │  │          SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CatalogItem, SaleRecord, PaymentMethod)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`compose`] - Sale draft validation and composition
//! - [`validation`] - Field-level business rule validation
//! - [`reports`] - Sales summaries, top products, purchase list
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod compose;
pub mod error;
pub mod money;
pub mod reports;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use compose::{LineInput, SaleDraft};
pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Exact number of digits a customer phone number must have.
///
/// Phone numbers are stored without the country calling code; the messaging
/// gateway client prepends the code at send time.
pub const PHONE_DIGITS: usize = 10;

/// Fixed config key holding the messaging gateway bearer token.
pub const TOKEN_CONFIG_KEY: &str = "token/token";
