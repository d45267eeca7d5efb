//! # Error Types
//!
//! Domain-specific error types for comanda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  comanda-core errors (this file)                                   │
//! │  └── CoreError        - Validation rejections + fatal misuse       │
//! │                                                                     │
//! │  comanda-db errors (separate crate)                                │
//! │  └── DbError          - Database operation failures                │
//! │                                                                     │
//! │  comanda-service errors (separate crate)                           │
//! │  └── ServiceError     - Orchestration failures (wraps both)        │
//! │                                                                     │
//! │  Flow: CoreError → ServiceError → caller renders inline            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation rejections (`GroupRequirementUnmet`, `SelectionLimitReached`,
//! `InsufficientStock`, ...) are always recoverable locally: the caller
//! disables the action and shows the unmet condition. Fatal misuse
//! (`EmptyCart`, `TerminalOrder`, ...) is a precondition violation the
//! engine rejects outright with no partial effect.

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A required extras group has fewer qualifying selections than its
    /// minimum.
    ///
    /// ## When This Occurs
    /// - Adding a line to the cart with a required group unmet
    /// - Editing a line down to an invalid selection set
    #[error("Group '{group}' requires at least {min} selection(s), {selected} chosen")]
    GroupRequirementUnmet {
        group: String,
        min: i64,
        selected: i64,
    },

    /// A group already has its maximum number of selections.
    ///
    /// Replacing the chosen option of an options-bearing extra does NOT
    /// trigger this error; swapping is not adding.
    #[error("Group '{group}' allows at most {max} selection(s)")]
    SelectionLimitReached { group: String, max: i64 },

    /// Requested quantity exceeds the effective purchasable limit.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// effective limit: min(product stock, category stock) - held in cart = 3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Lomito", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 left"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Product is inactive (soft-removed) and cannot be ordered.
    #[error("Product '{0}' is not available")]
    InactiveProduct(String),

    /// Cart line not found.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Quantity is outside the allowed range.
    #[error("Quantity {requested} must be between 1 and {max}")]
    InvalidQuantity { requested: i64, max: i64 },

    /// Comment exceeds the allowed length.
    #[error("Comment must be at most {max} characters")]
    CommentTooLong { max: usize },

    /// Checkout attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Order is in a terminal state; no further transition is permitted.
    #[error("Order is {0:?}; no further status transition is permitted")]
    TerminalOrder(OrderStatus),

    /// Requested status transition is not allowed by the state machine.
    #[error("Cannot transition order from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Finalize of a manually-paid order requires operator confirmation.
    #[error("Payment confirmation required before completing this order")]
    PaymentConfirmationRequired,

    /// Operator answered "no" to the payment-confirmation prompt.
    #[error("Payment was not confirmed; order left unchanged")]
    PaymentDeclined,

    /// Deletion requires an explicit confirmation gate.
    #[error("Deletion requires explicit confirmation")]
    DeletionNotConfirmed,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
