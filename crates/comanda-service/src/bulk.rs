//! # Bulk Operations
//!
//! Applies one operation across many selected orders, collecting a per-order
//! verdict instead of failing the batch on the first rejection.
//!
//! ## Semantics
//! - Every order is attempted; one rejection never skips the rest.
//! - Each entry goes through the same guarded single-order operation, so a
//!   bulk "complete" cannot do anything a one-at-a-time complete couldn't.
//! - Exactly one completion event fires per batch, carrying the tallies.
//!   Callers refresh their views off that single event, not per entry.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::info;

use crate::error::ServiceResult;
use crate::orders::{DeleteConfirmation, OrderService};
use comanda_core::OrderStatus;

// =============================================================================
// Types
// =============================================================================

/// The operation applied to every selected order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    /// Route each order through its guarded status transition.
    SetStatus(OrderStatus),
    /// Flag each order as paid.
    MarkPaid,
    /// Delete each order. The batch-level confirmation happened already;
    /// entries don't re-prompt.
    Delete,
}

/// Verdict for one order in a batch.
#[derive(Debug)]
pub struct BulkOutcome {
    pub order_id: String,
    pub result: ServiceResult<()>,
}

/// What a finished batch looked like.
#[derive(Debug)]
pub struct BulkReport {
    pub operation: BulkOperation,
    pub outcomes: Vec<BulkOutcome>,
}

impl BulkReport {
    /// Number of orders the operation succeeded on.
    pub fn fulfilled(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of orders the operation was rejected on.
    pub fn rejected(&self) -> usize {
        self.outcomes.len() - self.fulfilled()
    }

    /// Rejected entries with their errors, for surfacing in the UI.
    pub fn rejections(&self) -> impl Iterator<Item = (&str, &crate::error::ServiceError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.order_id.as_str(), e)))
    }
}

// =============================================================================
// Target
// =============================================================================

/// Something a bulk operation can be applied to, order by order.
///
/// [`OrderService`] is the production target; tests substitute a mock to
/// exercise the runner without a database.
#[async_trait]
pub trait BulkTarget: Send + Sync {
    async fn apply(&self, order_id: &str, operation: BulkOperation) -> ServiceResult<()>;
}

#[async_trait]
impl BulkTarget for OrderService {
    async fn apply(&self, order_id: &str, operation: BulkOperation) -> ServiceResult<()> {
        match operation {
            BulkOperation::SetStatus(to) => self.set_status(order_id, to).await,
            BulkOperation::MarkPaid => self.mark_paid(order_id).await,
            BulkOperation::Delete => {
                self.delete_order(order_id, DeleteConfirmation::Confirmed)
                    .await
            }
        }
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Applies `operation` to every order in `order_ids` concurrently and
/// returns the batch report.
///
/// The summary line at the end is the batch's single completion event.
pub async fn run_bulk<T: BulkTarget>(
    target: &T,
    operation: BulkOperation,
    order_ids: &[String],
) -> BulkReport {
    let attempts = order_ids.iter().map(|id| async {
        BulkOutcome {
            order_id: id.clone(),
            result: target.apply(id, operation).await,
        }
    });

    let outcomes = join_all(attempts).await;
    let report = BulkReport {
        operation,
        outcomes,
    };

    info!(
        ?operation,
        total = report.outcomes.len(),
        fulfilled = report.fulfilled(),
        rejected = report.rejected(),
        "Bulk operation finished"
    );

    report
}

// =============================================================================
// Unit Tests
// =============================================================================
