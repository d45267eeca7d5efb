//! # comanda-core: Pure Business Logic for Comanda
//!
//! This crate is the **heart** of the Comanda storefront engine. It contains
//! the product-configuration and order-composition logic as pure functions
//! and in-memory structures with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Comanda Architecture                          │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront / Dashboard UI                   │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                      comanda-service                        │   │
//! │  │    checkout, order transitions, bulk operations, settings   │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │               ★ comanda-core (THIS CRATE) ★                 │   │
//! │  │                                                             │   │
//! │  │  ┌─────────┐ ┌──────────┐ ┌───────┐ ┌──────┐ ┌───────────┐│   │
//! │  │  │ catalog │ │selection │ │pricing│ │stock │ │ lifecycle ││   │
//! │  │  │ extras  │ │ min/max  │ │ line  │ │limits│ │ statuses  ││   │
//! │  │  └─────────┘ └──────────┘ └───────┘ └──────┘ └───────────┘│   │
//! │  │                        ┌──────┐                            │   │
//! │  │                        │ cart │                            │   │
//! │  │                        └──────┘                            │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                comanda-db (SQLite stores)                   │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Order, enums, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`catalog`] - ExtrasCatalog: extras and the groups that own them
//! - [`selection`] - Group-level selection-count validation
//! - [`pricing`] - Line pricing and extras snapshots
//! - [`stock`] - Product + category stock ceilings
//! - [`cart`] - Ordered cart line items with validated mutation
//! - [`lifecycle`] - Order status state machine
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod selection;
pub mod stock;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, ProductContext};
pub use catalog::ExtrasCatalog;
pub use error::{CoreError, CoreResult};
pub use lifecycle::{plan_finalize, plan_transition, FinalizeOutcome, PaymentConfirmation};
pub use money::Money;
pub use pricing::{price_line, PricedLine};
pub use selection::{ExtraChoice, Selections};
pub use stock::StockLimit;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines allowed in a single cart.
///
/// Prevents runaway carts and keeps order payloads reasonable.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum length of a free-text line comment.
pub const MAX_COMMENT_LEN: usize = 500;
