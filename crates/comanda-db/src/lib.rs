//! # comanda-db: Database Layer for Comanda
//!
//! This crate provides database access for the Comanda ordering system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Comanda Data Flow                                │
//! │                                                                         │
//! │  Service call (place_order, finalize_order, ...)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     comanda-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │ (catalog.rs)  │    │  (embedded)  │    │    │
//! │  │   │               │    │               │    │              │    │    │
//! │  │   │ SqlitePool    │    │ CatalogRepo   │    │ 001_init.sql │    │    │
//! │  │   │ Connection    │◄───│ OrderRepo     │    │ ...          │    │    │
//! │  │   │ Management    │    │ ConfigRepo    │    │              │    │    │
//! │  │   └───────────────┘    │ PaidFlagRepo  │    └──────────────┘    │    │
//! │  │                        └───────────────┘                        │    │
//! │  │   ┌───────────────┐                                             │    │
//! │  │   │  LocalCache   │  last-known-good settings (JSON file)       │    │
//! │  │   └───────────────┘                                             │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL) + per-tenant settings cache files                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, order, config, paid)
//! - [`local_cache`] - File-backed fallback for storefront settings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use comanda_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/comanda.db")).await?;
//! let products = db.catalog().list_products("tenant-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod local_cache;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use local_cache::{CachedSettings, LocalCache};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::config::ConfigRepository;
pub use repository::order::OrderRepository;
pub use repository::paid::PaidFlagRepository;
