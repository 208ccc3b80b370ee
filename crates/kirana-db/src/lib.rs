//! # kirana-db: Storage Layer for Kirana POS
//!
//! SQLite-backed persistence for the catalog, the append-only sales log,
//! key-value configuration and the blob store, plus change subscriptions.
//!
//! ## Store Contract
//! The rest of the system treats storage as a document store with a small
//! contract, which this crate provides locally:
//!
//! - **append with generated key** — [`repository::SalesRepository::append`]
//! - **atomic field update** — [`repository::CatalogRepository::adjust_stock_by_name`]
//!   (one UPDATE statement, never read-then-write)
//! - **prefix / range queries** — catalog name suggestions, sales by phone
//!   and by timestamp range
//! - **change subscription** — [`Database::subscribe`] returning a
//!   [`watch::Subscription`] with an explicit unsubscribe handle
//! - **blob storage** — [`repository::BlobStore`] mapping stored payloads to
//!   durable public URLs
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::in_memory()).await?;
//! let items = db.catalog().suggest("so", 10).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod watch;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::catalog::{generate_catalog_id, CatalogRepository, StockAdjustment};
pub use repository::config::ConfigRepository;
pub use repository::sales::{generate_sale_id, SalesRepository};
pub use repository::blobs::{BlobStore, StoredBlob};
pub use watch::{ChangeEvent, Subscription};
