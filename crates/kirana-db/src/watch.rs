//! # Change Subscriptions
//!
//! Screens that mirror live data get it through an explicit subscription
//! interface rather than lifecycle-managed listeners: callers subscribe,
//! receive [`ChangeEvent`]s pushed after committed writes, and own the
//! teardown by calling [`Subscription::unsubscribe`] (or dropping the
//! handle).
//!
//! ```text
//! repository write ──commit──► broadcast ──► Subscription::next()
//!                                       └──► Subscription::next()   (N subscribers)
//! ```
//!
//! Events carry which collection changed and the affected key, not payloads;
//! a consumer re-queries the repository it cares about. Slow consumers that
//! fall behind the channel capacity miss intermediate events and resume at
//! the current edge, which is the same contract a realtime listener gives.

use tokio::sync::broadcast;
use tracing::debug;

/// How many events the channel buffers per subscriber before a slow
/// consumer starts missing intermediate ones.
pub(crate) const EVENT_BUFFER: usize = 64;

// =============================================================================
// Events
// =============================================================================

/// A committed change in one of the stored collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A catalog item was inserted or its fields (stock included) changed.
    /// The key is the item id for id-keyed writes, or the item name for
    /// name-keyed stock adjustments; consumers re-query the catalog either
    /// way.
    Catalog { key: String },
    /// A sale record was appended to the sales log.
    SaleAppended { id: String },
    /// A configuration value changed.
    Config { key: String },
}

// =============================================================================
// Subscription
// =============================================================================

/// A live subscription to store changes.
///
/// Obtained from [`crate::Database::subscribe`]. The consumer owns the
/// lifecycle: subscribe when a view mounts, call [`unsubscribe`] (or drop)
/// when it tears down.
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<ChangeEvent>) -> Self {
        Subscription { rx }
    }

    /// Waits for the next change event.
    ///
    /// Returns `None` once the database (and with it the sender) has been
    /// dropped. A lagged subscriber skips the events it missed and keeps
    /// receiving from the current edge.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "Subscription lagged; resuming at current edge");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Ends the subscription. Dropping the handle is equivalent; this method
    /// exists so teardown reads as an explicit step at the call site.
    pub fn unsubscribe(self) {}
}

// =============================================================================
// Unit Tests
// =============================================================================
