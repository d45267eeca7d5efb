//! # comanda-service: Orchestration Layer for Comanda
//!
//! The surface UI callers use. Decisions live in `comanda-core` as pure
//! functions; durable effects live in `comanda-db`; this crate sequences
//! the two and owns the concerns that belong to neither: checkout
//! preconditions, best-effort notification, bulk fan-out, optimistic
//! settings.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Storefront / Dashboard UI                           │
//! └───────────────────────────────┬─────────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼─────────────────────────────────────┐
//! │                 comanda-service (THIS CRATE)                        │
//! │                                                                     │
//! │  ┌──────────┐ ┌──────────┐ ┌────────┐ ┌──────────┐ ┌────────────┐   │
//! │  │ checkout │ │  orders  │ │  bulk  │ │ settings │ │   notify   │   │
//! │  │ place    │ │ take     │ │ runner │ │ delivery │ │ order-ready│   │
//! │  │ order    │ │ finalize │ │ report │ │ pause    │ │ transport  │   │
//! │  └──────────┘ └──────────┘ └────────┘ └──────────┘ └────────────┘   │
//! └──────────┬──────────────────────────────────────────┬───────────────┘
//!            │ decisions                                │ effects
//! ┌──────────▼───────────┐                  ┌───────────▼──────────────┐
//! │     comanda-core     │                  │        comanda-db        │
//! └──────────────────────┘                  └──────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`checkout`] - Cart → persisted order
//! - [`orders`] - Lifecycle operations on persisted orders
//! - [`bulk`] - One operation across many orders, per-order verdicts
//! - [`settings`] - Delivery toggles + pause, optimistic with local mirror
//! - [`optimistic`] - Rollback-on-failure setting holder
//! - [`notify`] - Customer notification transport trait
//! - [`error`] - Service error surface

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bulk;
pub mod checkout;
pub mod error;
pub mod notify;
pub mod optimistic;
pub mod orders;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use bulk::{run_bulk, BulkOperation, BulkOutcome, BulkReport, BulkTarget};
pub use checkout::{CheckoutRequest, CheckoutService};
pub use error::{ServiceError, ServiceResult};
pub use notify::{LogNotifier, NotificationChannel, NotifyError};
pub use optimistic::OptimisticSetting;
pub use orders::{DeleteConfirmation, OrderService, OrderView};
pub use settings::SettingsService;
