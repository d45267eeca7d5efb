//! # Customer Notification
//!
//! Best-effort "your order is ready" notification, fired when a home-delivery
//! order is finalized.
//!
//! The transport is behind a trait so the service layer stays testable and
//! transport-agnostic (WhatsApp bridge, SMS gateway, ...). Failures are
//! logged and swallowed by the caller: a dead notification channel must never
//! block an order from completing.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use comanda_core::Order;

/// A notification send failure. Carries the transport's own message.
#[derive(Debug, Error)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound customer-notification transport.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Tells the customer their order is finalized and on its way.
    async fn order_ready(&self, order: &Order) -> Result<(), NotifyError>;
}

/// Default channel: logs the would-be notification.
///
/// Deployments without a configured transport still get an audit line.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl NotificationChannel for LogNotifier {
    async fn order_ready(&self, order: &Order) -> Result<(), NotifyError> {
        info!(
            order_id = %order.id,
            customer = %order.customer.name,
            phone = order.customer.phone.as_deref().unwrap_or("-"),
            "Order ready notification"
        );
        Ok(())
    }
}
