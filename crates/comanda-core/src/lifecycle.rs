//! # Order Lifecycle
//!
//! The state machine a persisted order moves through, as pure planning
//! functions. Durable effects (status writes, paid-flag writes, customer
//! notification) are carried out by the service layer from the plans
//! produced here.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │   pending ──("take order")──► in_progress ──("finalize")──► completed
//! │      │                            │                                 │
//! │      └──────────("cancel")────────┴──────────► cancelled            │
//! │                                                                     │
//! │   completed / cancelled are TERMINAL: no transition leaves them.    │
//! │   Deletion is an intent with a confirmation gate, not a transition. │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Finalize Gating
//! Manual-payment methods (efectivo, transferencia) cannot be verified
//! automatically: finalize requires the operator's yes/no answer to
//! "did the customer pay?" unless the order was already marked paid.
//! Card/QR orders finalize without confirmation.

use crate::error::{CoreError, CoreResult};
use crate::types::{DeliveryType, Order, OrderStatus};

// =============================================================================
// Transitions
// =============================================================================

/// Whether the state machine permits `from → to`.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    match (from, to) {
        (Pending, InProgress) => true,
        (InProgress, Completed) => true,
        (Pending, Cancelled) | (InProgress, Cancelled) => true,
        _ => false,
    }
}

/// Validates a plain status transition (take order, cancel).
///
/// Finalization goes through [`plan_finalize`] instead, which also gates on
/// payment confirmation.
pub fn plan_transition(order: &Order, to: OrderStatus) -> CoreResult<()> {
    if order.status.is_terminal() {
        return Err(CoreError::TerminalOrder(order.status));
    }
    if !can_transition(order.status, to) {
        return Err(CoreError::InvalidTransition {
            from: order.status,
            to,
        });
    }
    Ok(())
}

// =============================================================================
// Finalize
// =============================================================================

/// The operator's answer to the payment-confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentConfirmation {
    /// No prompt was shown (or answered) yet.
    NotAsked,
    /// Operator confirmed the customer paid.
    Confirmed,
    /// Operator answered that the customer did not pay.
    Declined,
}

/// Side effects the service layer must carry out after a finalize plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// Set the paid flag (manual method finalized without a prior flag).
    pub mark_paid: bool,
    /// Fire the best-effort customer notification (delivery orders).
    /// Its failure must not block the status transition.
    pub notify_customer: bool,
}

/// Plans `in_progress → completed`.
///
/// ## Arguments
/// * `already_paid` - the paid flag read from the paid-flag store
/// * `confirmation` - the operator's prompt answer, if one was collected
///
/// ## Errors
/// * [`CoreError::TerminalOrder`] / [`CoreError::InvalidTransition`] -
///   precondition violations, no partial effect
/// * [`CoreError::PaymentConfirmationRequired`] - manual method, not paid,
///   and no prompt answer yet: the caller must ask "did the customer pay?"
/// * [`CoreError::PaymentDeclined`] - operator answered no
pub fn plan_finalize(
    order: &Order,
    already_paid: bool,
    confirmation: PaymentConfirmation,
) -> CoreResult<FinalizeOutcome> {
    plan_transition(order, OrderStatus::Completed)?;

    let needs_confirmation = order.payment_method.is_manual() && !already_paid;
    if needs_confirmation {
        match confirmation {
            PaymentConfirmation::NotAsked => return Err(CoreError::PaymentConfirmationRequired),
            PaymentConfirmation::Declined => return Err(CoreError::PaymentDeclined),
            PaymentConfirmation::Confirmed => {}
        }
    }

    Ok(FinalizeOutcome {
        mark_paid: needs_confirmation,
        notify_customer: order.delivery_type == DeliveryType::Domicilio,
    })
}

// =============================================================================
// Display Helpers
// =============================================================================

/// Whether the order should display as paid.
///
/// Terminal orders are paid-or-moot regardless of the stored flag.
pub fn display_paid(order: &Order, paid_flag: bool) -> bool {
    order.status.is_terminal() || paid_flag
}

// =============================================================================
// Unit Tests
// =============================================================================
