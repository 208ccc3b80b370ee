//! # kirana-billing: Sale Pipeline for Kirana POS
//!
//! Everything between "the clerk hit submit" and "the customer has their
//! invoice on WhatsApp".
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                ★ kirana-billing (THIS CRATE) ★                      │
//! │                                                                     │
//! │  ┌──────────┐   ┌─────────┐   ┌──────────┐                          │
//! │  │ checkout │──►│ invoice │──►│ whatsapp │                          │
//! │  │ pipeline │   │ PDF+blob│   │ gateway  │                          │
//! │  └────┬─────┘   └────┬────┘   └──────────┘                          │
//! │       │              │                                              │
//! │       ▼              ▼                                              │
//! │  kirana-core     kirana-db                                          │
//! │  (compose,       (repositories,                                     │
//! │   validation)     blob store)                                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`checkout`] - The submission pipeline and its per-step report
//! - [`invoice`] - Invoice PDF rendering and blob upload
//! - [`whatsapp`] - Messaging gateway client
//! - [`config`] - Pipeline configuration
//! - [`error`] - Billing error types

pub mod checkout;
pub mod config;
pub mod error;
pub mod invoice;
pub mod whatsapp;

pub use checkout::{Checkout, Messenger, StepOutcome, StockWarning, SubmissionReport};
pub use config::BillingConfig;
pub use error::{BillingError, BillingResult};
pub use invoice::{invoice_filename, receipt_text, InvoiceService, StoredInvoice};
pub use whatsapp::{SessionStatus, WhatsAppClient};
