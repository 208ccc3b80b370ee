//! # Repository Layer
//!
//! Data access repositories, one per stored collection. Repositories are
//! cheap to construct from [`crate::Database`] accessors and publish a
//! [`crate::watch::ChangeEvent`] after every committed write.

pub mod blobs;
pub mod catalog;
pub mod config;
pub mod sales;

pub use blobs::{BlobStore, StoredBlob};
pub use catalog::{CatalogRepository, StockAdjustment};
pub use config::ConfigRepository;
pub use sales::SalesRepository;
