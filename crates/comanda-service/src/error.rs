//! # Service Error Types
//!
//! The error surface UI callers see. Wraps domain errors from
//! `comanda-core` and storage errors from `comanda-db`, plus the handful
//! of conditions only the orchestration layer can detect.

use thiserror::Error;

use comanda_core::{CoreError, DeliveryType};
use comanda_db::DbError;

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation (selection rules, lifecycle, cart limits, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure (including stock conflicts at commit time).
    #[error(transparent)]
    Db(#[from] DbError),

    /// The storefront is paused and not accepting orders.
    #[error("Storefront is paused")]
    StorePaused,

    /// The requested delivery type is disabled for this tenant.
    #[error("Delivery type {0:?} is disabled")]
    DeliveryTypeDisabled(DeliveryType),

    /// Home-delivery orders need a street address.
    #[error("Delivery orders require an address")]
    MissingDeliveryAddress,

    /// The order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

impl ServiceError {
    /// Whether retrying the same call can succeed without operator input.
    ///
    /// Stock conflicts and pool pressure are transient; rule violations
    /// are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::Db(DbError::StockConflict { .. })
                | ServiceError::Db(DbError::PoolExhausted)
        )
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
