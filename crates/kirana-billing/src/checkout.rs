//! # Checkout Pipeline
//!
//! Orchestrates everything that happens when the clerk records a sale.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Sale Submission                              │
//! │                                                                     │
//! │  draft ──► validate + compose          (abort on error, no writes)  │
//! │              │                                                      │
//! │              ▼                                                      │
//! │         decrement stock per line       (best effort, warnings)      │
//! │              │                                                      │
//! │              ▼                                                      │
//! │         append sale record             (abort on error)             │
//! │              │                                                      │
//! │              ▼                                                      │
//! │         invoice PDF + upload           (best effort)                │
//! │              │                                                      │
//! │              ▼                                                      │
//! │         WhatsApp notification          (best effort; skipped        │
//! │              │                          without a session token)    │
//! │              ▼                                                      │
//! │         SubmissionReport                                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sale record is the one hard step: once it is written the submission
//! succeeds, and everything downstream lands on the report as a per-step
//! outcome rather than an error. A stock line that matches no catalog item
//! produces a warning and the sale still goes through; there is no rollback
//! of decrements that already applied.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::BillingConfig;
use crate::error::BillingResult;
use crate::invoice::{InvoiceService, StoredInvoice};
use crate::whatsapp::WhatsAppClient;
use kirana_core::{SaleDraft, SaleRecord};
use kirana_db::{generate_sale_id, Database, StockAdjustment};

// =============================================================================
// Messenger Seam
// =============================================================================

/// Delivery seam for the notification step.
///
/// [`WhatsAppClient`] is the production implementation; tests substitute a
/// recording double so the pipeline runs without a network.
#[allow(async_fn_in_trait)]
pub trait Messenger {
    /// Delivers an invoice link to a customer phone number.
    async fn send_invoice_link(
        &self,
        token: &str,
        phone: &str,
        image_url: &str,
        caption: &str,
    ) -> BillingResult<()>;
}

impl Messenger for WhatsAppClient {
    async fn send_invoice_link(
        &self,
        token: &str,
        phone: &str,
        image_url: &str,
        caption: &str,
    ) -> BillingResult<()> {
        WhatsAppClient::send_invoice_link(self, token, phone, image_url, caption).await
    }
}

// =============================================================================
// Submission Report
// =============================================================================

/// Outcome of one best-effort pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran to completion. `detail` names the artifact (invoice
    /// URL, recipient number).
    Completed { detail: String },
    /// The step did not apply (no session token paired, no invoice to
    /// send).
    Skipped { reason: String },
    /// The step was attempted and failed; the sale stands regardless.
    Failed { reason: String },
}

impl StepOutcome {
    /// Whether the step completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed { .. })
    }
}

/// A sale line whose stock decrement did not apply cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockWarning {
    /// One-based line number on the form.
    pub line: usize,
    /// Item name as entered.
    pub name: String,
    /// What went wrong.
    pub reason: String,
}

/// Everything the caller needs to show after a submission: the persisted
/// sale plus the fate of each best-effort step.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    /// The sale as persisted.
    pub sale: SaleRecord,
    /// Lines whose stock decrement found no catalog item or failed.
    pub stock_warnings: Vec<StockWarning>,
    /// Invoice generation and upload.
    pub invoice: StepOutcome,
    /// WhatsApp notification.
    pub notification: StepOutcome,
}

impl SubmissionReport {
    /// Whether every step completed with no stock warnings.
    pub fn is_clean(&self) -> bool {
        self.stock_warnings.is_empty()
            && self.invoice.is_completed()
            && self.notification.is_completed()
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// The sale submission pipeline.
///
/// ## Usage
/// ```rust,ignore
/// let checkout = Checkout::new(db, BillingConfig::default());
/// let report = checkout.submit(&draft).await?;
/// for w in &report.stock_warnings {
///     println!("line {}: {}", w.line, w.reason);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Checkout<M> {
    db: Database,
    invoices: InvoiceService,
    messenger: M,
}

impl Checkout<WhatsAppClient> {
    /// Creates a pipeline backed by the real WhatsApp gateway.
    pub fn new(db: Database, config: BillingConfig) -> Self {
        let messenger = WhatsAppClient::new(&config.gateway_base_url, &config.country_code);
        Checkout::with_messenger(db, config, messenger)
    }
}

impl<M: Messenger> Checkout<M> {
    /// Creates a pipeline with a custom messenger (tests use this to avoid
    /// the network).
    pub fn with_messenger(db: Database, config: BillingConfig, messenger: M) -> Self {
        let invoices = InvoiceService::new(db.blobs(), config.letterhead_url.clone());
        Checkout {
            db,
            invoices,
            messenger,
        }
    }

    /// Submits a sale draft.
    ///
    /// Returns `Err` only when nothing durable happened (validation) or the
    /// sale record itself could not be written. Every other problem lands on
    /// the [`SubmissionReport`].
    pub async fn submit(&self, draft: &SaleDraft) -> BillingResult<SubmissionReport> {
        // Hard step 1: validation and composition. No writes yet.
        let sale = draft.compose(generate_sale_id(), Utc::now())?;
        info!(id = %sale.id, total = %sale.total, "Submitting sale");

        // Best effort: decrement stock, one line at a time. Decrements that
        // already applied stay applied even when a later line has no match.
        let stock_warnings = self.adjust_stock(&sale).await;

        // Hard step 2: the sale record itself.
        self.db.sales().append(&sale).await?;

        // Best effort: invoice, then notification riding on its URL.
        let invoice = self.generate_invoice(&sale).await;
        let notification = self.notify(&sale, &invoice).await;

        let invoice = match invoice {
            Ok(stored) => StepOutcome::Completed { detail: stored.url },
            Err(reason) => StepOutcome::Failed { reason },
        };

        Ok(SubmissionReport {
            sale,
            stock_warnings,
            invoice,
            notification,
        })
    }

    async fn adjust_stock(&self, sale: &SaleRecord) -> Vec<StockWarning> {
        let catalog = self.db.catalog();
        let mut warnings = Vec::new();

        for (index, line) in sale.products.iter().enumerate() {
            let outcome = catalog
                .adjust_stock_by_name(&line.name, -line.quantity)
                .await;

            let reason = match outcome {
                Ok(StockAdjustment::Applied) => continue,
                Ok(StockAdjustment::NoMatch) => {
                    format!("no catalog item named '{}'", line.name)
                }
                Err(e) => format!("stock update failed: {e}"),
            };

            warn!(line = index + 1, name = %line.name, %reason, "Stock decrement warning");
            warnings.push(StockWarning {
                line: index + 1,
                name: line.name.clone(),
                reason,
            });
        }

        warnings
    }

    async fn generate_invoice(&self, sale: &SaleRecord) -> Result<StoredInvoice, String> {
        match self.invoices.generate_and_store(sale).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                warn!(id = %sale.id, error = %e, "Invoice generation failed");
                Err(e.to_string())
            }
        }
    }

    async fn notify(
        &self,
        sale: &SaleRecord,
        invoice: &Result<StoredInvoice, String>,
    ) -> StepOutcome {
        let stored = match invoice {
            Ok(stored) => stored,
            Err(_) => {
                return StepOutcome::Skipped {
                    reason: "no invoice to send".to_string(),
                }
            }
        };

        let token = match self.db.config().token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                return StepOutcome::Skipped {
                    reason: "no messaging session paired".to_string(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not read session token");
                return StepOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let caption = format!("Hello, here is your invoice: {}", stored.filename);
        match self
            .messenger
            .send_invoice_link(&token, &sale.customer_phone, &stored.url, &caption)
            .await
        {
            Ok(()) => StepOutcome::Completed {
                detail: stored.url.clone(),
            },
            Err(e) => {
                warn!(id = %sale.id, error = %e, "Notification failed");
                StepOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_outcome_is_completed() {
        assert!(StepOutcome::Completed {
            detail: "url".to_string()
        }
        .is_completed());
        assert!(!StepOutcome::Skipped {
            reason: "no token".to_string()
        }
        .is_completed());
        assert!(!StepOutcome::Failed {
            reason: "boom".to_string()
        }
        .is_completed());
    }
}
