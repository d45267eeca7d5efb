//! # Order Operations
//!
//! Transitions on persisted orders: take, finalize, cancel, mark paid,
//! delete. Decisions come from `comanda_core::lifecycle`; this module turns
//! an approved plan into durable effects, in order:
//!
//! 1. Status write (guarded against terminal rows in SQL)
//! 2. Paid-flag write, when the plan says so
//! 3. Customer notification, best-effort (failure logged, never propagated)

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::notify::{LogNotifier, NotificationChannel};
use comanda_core::{
    lifecycle, plan_finalize, plan_transition, CoreError, Order, OrderStatus, PaymentConfirmation,
};
use comanda_db::Database;

// =============================================================================
// Types
// =============================================================================

/// Deletion is destructive and irreversible, so it takes an explicit
/// confirmation token instead of a bare bool at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    NotConfirmed,
    Confirmed,
}

/// An order decorated with its display paid flag, for list views.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub paid: bool,
}

// =============================================================================
// Service
// =============================================================================

/// Service for operating on persisted orders.
#[derive(Clone)]
pub struct OrderService {
    db: Database,
    notifier: Arc<dyn NotificationChannel>,
}

impl OrderService {
    /// Creates an OrderService with a custom notification channel.
    pub fn new(db: Database, notifier: Arc<dyn NotificationChannel>) -> Self {
        OrderService { db, notifier }
    }

    /// Creates an OrderService that logs notifications instead of sending.
    pub fn with_log_notifier(db: Database) -> Self {
        OrderService::new(db, Arc::new(LogNotifier))
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Fetches an order or fails with [`ServiceError::OrderNotFound`].
    pub async fn get_order(&self, id: &str) -> ServiceResult<Order> {
        self.db
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::OrderNotFound(id.to_string()))
    }

    /// Lists a tenant's orders newest-first, each with its paid display flag.
    pub async fn list_orders(&self, tenant_id: &str) -> ServiceResult<Vec<OrderView>> {
        let orders = self.db.orders().list_by_tenant(tenant_id).await?;
        let paid = self.db.paid_flags().paid_set(tenant_id).await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let paid = lifecycle::display_paid(&order, paid.contains(&order.id));
                OrderView { order, paid }
            })
            .collect())
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// `pending → in_progress`: an operator starts preparing the order.
    #[instrument(skip(self))]
    pub async fn take_order(&self, id: &str) -> ServiceResult<()> {
        let order = self.get_order(id).await?;
        plan_transition(&order, OrderStatus::InProgress)?;
        self.db
            .orders()
            .update_status(id, OrderStatus::InProgress)
            .await?;

        info!(order_id = %id, "Order taken");
        Ok(())
    }

    /// `pending|in_progress → cancelled`.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: &str) -> ServiceResult<()> {
        let order = self.get_order(id).await?;
        plan_transition(&order, OrderStatus::Cancelled)?;
        self.db
            .orders()
            .update_status(id, OrderStatus::Cancelled)
            .await?;

        info!(order_id = %id, "Order cancelled");
        Ok(())
    }

    /// `in_progress → completed`, gated on payment confirmation for manual
    /// methods.
    ///
    /// The first call on an unpaid cash/transfer order returns
    /// [`CoreError::PaymentConfirmationRequired`]; the UI asks the operator
    /// and calls again with their answer.
    #[instrument(skip(self))]
    pub async fn finalize_order(
        &self,
        id: &str,
        confirmation: PaymentConfirmation,
    ) -> ServiceResult<()> {
        let order = self.get_order(id).await?;
        let already_paid = self
            .db
            .paid_flags()
            .is_paid(&order.tenant_id, &order.id)
            .await?;

        let outcome = plan_finalize(&order, already_paid, confirmation)?;

        self.db
            .orders()
            .update_status(id, OrderStatus::Completed)
            .await?;

        if outcome.mark_paid {
            self.db
                .paid_flags()
                .mark_paid(&order.tenant_id, &order.id)
                .await?;
        }

        if outcome.notify_customer {
            // Best-effort: the order is already completed at this point.
            if let Err(e) = self.notifier.order_ready(&order).await {
                warn!(order_id = %id, error = %e, "Customer notification failed");
            }
        }

        info!(order_id = %id, marked_paid = outcome.mark_paid, "Order finalized");
        Ok(())
    }

    /// Marks an order paid without changing its status.
    ///
    /// Cash orders often get paid at handover, well before finalize.
    pub async fn mark_paid(&self, id: &str) -> ServiceResult<()> {
        let order = self.get_order(id).await?;
        self.db
            .paid_flags()
            .mark_paid(&order.tenant_id, &order.id)
            .await?;

        info!(order_id = %id, "Order marked paid");
        Ok(())
    }

    /// Deletes an order outright, confirmation-gated. Works on any status.
    #[instrument(skip(self))]
    pub async fn delete_order(
        &self,
        id: &str,
        confirmation: DeleteConfirmation,
    ) -> ServiceResult<()> {
        if confirmation != DeleteConfirmation::Confirmed {
            return Err(CoreError::DeletionNotConfirmed.into());
        }

        let order = self.get_order(id).await?;
        self.db.orders().delete(id).await?;
        self.db
            .paid_flags()
            .clear(&order.tenant_id, &order.id)
            .await?;

        info!(order_id = %id, "Order deleted");
        Ok(())
    }

    /// Routes a target status through the matching guarded operation.
    ///
    /// Used by bulk operations; finalizing this way never prompts, so an
    /// unpaid manual-payment order fails its entry instead of silently
    /// completing unpaid.
    pub async fn set_status(&self, id: &str, to: OrderStatus) -> ServiceResult<()> {
        match to {
            OrderStatus::InProgress => self.take_order(id).await,
            OrderStatus::Cancelled => self.cancel_order(id).await,
            OrderStatus::Completed => {
                self.finalize_order(id, PaymentConfirmation::NotAsked).await
            }
            OrderStatus::Pending => {
                let order = self.get_order(id).await?;
                plan_transition(&order, OrderStatus::Pending)?;
                Ok(()) // unreachable: no transition targets pending
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use crate::notify::NotifyError;
    use comanda_core::{CustomerInfo, DeliveryType, OrderItem, PaymentMethod, Product};
    use comanda_db::repository::order::{generate_order_id, generate_order_item_id};
    use comanda_db::DbConfig;

    struct CountingNotifier {
        sent: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl NotificationChannel for CountingNotifier {
        async fn order_ready(&self, _order: &Order) -> Result<(), NotifyError> {
            self.sent.fetch_add(1, AtomicOrdering::SeqCst);
            if self.fail {
                Err(NotifyError("gateway down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.catalog()
            .insert_product(&Product {
                id: "p1".to_string(),
                tenant_id: "t1".to_string(),
                name: "Lomito".to_string(),
                description: None,
                price_cents: 2500,
                stock: None,
                category_id: None,
                extra_group_ids: vec![],
                sort_order: 0,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        db
    }

    async fn seed_order(
        db: &Database,
        payment: PaymentMethod,
        delivery: DeliveryType,
    ) -> String {
        let now = Utc::now();
        let id = generate_order_id();
        let item = OrderItem {
            id: generate_order_item_id(),
            order_id: id.clone(),
            product_id: "p1".to_string(),
            name_snapshot: "Lomito".to_string(),
            unit_price_cents: 2500,
            quantity: 1,
            line_total_cents: 2500,
            extras: vec![],
            comment: None,
            created_at: now,
        };
        db.orders()
            .create_order(&Order {
                id: id.clone(),
                tenant_id: "t1".to_string(),
                status: OrderStatus::Pending,
                delivery_type: delivery,
                payment_method: payment,
                total_cents: 2500,
                customer: CustomerInfo {
                    name: "Ana".to_string(),
                    phone: Some("123".to_string()),
                    address: None,
                },
                items: vec![item],
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn test_take_then_finalize_card_order() {
        let db = test_db().await;
        let service = OrderService::with_log_notifier(db.clone());
        let id = seed_order(&db, PaymentMethod::Tarjeta, DeliveryType::Mesa).await;

        service.take_order(&id).await.unwrap();
        service
            .finalize_order(&id, PaymentConfirmation::NotAsked)
            .await
            .unwrap();

        let order = service.get_order(&id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        // Card orders never touch the paid-flag store
        assert!(!db.paid_flags().is_paid("t1", &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_finalize_cash_prompts_then_confirms() {
        let db = test_db().await;
        let service = OrderService::with_log_notifier(db.clone());
        let id = seed_order(&db, PaymentMethod::Efectivo, DeliveryType::Mostrador).await;

        service.take_order(&id).await.unwrap();

        let err = service
            .finalize_order(&id, PaymentConfirmation::NotAsked)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::PaymentConfirmationRequired)
        ));

        // Still in progress after the rejected attempt
        let order = service.get_order(&id).await.unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);

        service
            .finalize_order(&id, PaymentConfirmation::Confirmed)
            .await
            .unwrap();
        assert!(db.paid_flags().is_paid("t1", &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_finalize_prepaid_cash_skips_prompt() {
        let db = test_db().await;
        let service = OrderService::with_log_notifier(db.clone());
        let id = seed_order(&db, PaymentMethod::Efectivo, DeliveryType::Mostrador).await;

        service.take_order(&id).await.unwrap();
        service.mark_paid(&id).await.unwrap();
        service
            .finalize_order(&id, PaymentConfirmation::NotAsked)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_notification_failure_never_blocks_finalize() {
        let db = test_db().await;
        let notifier = Arc::new(CountingNotifier {
            sent: AtomicUsize::new(0),
            fail: true,
        });
        let service = OrderService::new(db.clone(), notifier.clone());
        let id = seed_order(&db, PaymentMethod::Qr, DeliveryType::Domicilio).await;

        service.take_order(&id).await.unwrap();
        service
            .finalize_order(&id, PaymentConfirmation::NotAsked)
            .await
            .unwrap();

        assert_eq!(notifier.sent.load(AtomicOrdering::SeqCst), 1);
        let order = service.get_order(&id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_counter_order_does_not_notify() {
        let db = test_db().await;
        let notifier = Arc::new(CountingNotifier {
            sent: AtomicUsize::new(0),
            fail: false,
        });
        let service = OrderService::new(db.clone(), notifier.clone());
        let id = seed_order(&db, PaymentMethod::Qr, DeliveryType::Mostrador).await;

        service.take_order(&id).await.unwrap();
        service
            .finalize_order(&id, PaymentConfirmation::NotAsked)
            .await
            .unwrap();

        assert_eq!(notifier.sent.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_completed_order_rejected() {
        let db = test_db().await;
        let service = OrderService::with_log_notifier(db.clone());
        let id = seed_order(&db, PaymentMethod::Qr, DeliveryType::Mesa).await;

        service.take_order(&id).await.unwrap();
        service
            .finalize_order(&id, PaymentConfirmation::NotAsked)
            .await
            .unwrap();

        let err = service.cancel_order(&id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::TerminalOrder(OrderStatus::Completed))
        ));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let db = test_db().await;
        let service = OrderService::with_log_notifier(db.clone());
        let id = seed_order(&db, PaymentMethod::Qr, DeliveryType::Mesa).await;

        let err = service
            .delete_order(&id, DeleteConfirmation::NotConfirmed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::DeletionNotConfirmed)
        ));
        assert!(service.get_order(&id).await.is_ok());

        service
            .delete_order(&id, DeleteConfirmation::Confirmed)
            .await
            .unwrap();
        assert!(matches!(
            service.get_order(&id).await.unwrap_err(),
            ServiceError::OrderNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_orders_decorates_paid_flag() {
        let db = test_db().await;
        let service = OrderService::with_log_notifier(db.clone());

        let unpaid = seed_order(&db, PaymentMethod::Efectivo, DeliveryType::Mesa).await;
        let paid = seed_order(&db, PaymentMethod::Efectivo, DeliveryType::Mesa).await;
        service.mark_paid(&paid).await.unwrap();

        let views = service.list_orders("t1").await.unwrap();
        assert_eq!(views.len(), 2);

        let by_id = |id: &str| views.iter().find(|v| v.order.id == id).unwrap();
        assert!(!by_id(&unpaid).paid);
        assert!(by_id(&paid).paid);
    }

    #[tokio::test]
    async fn test_set_status_never_completes_unpaid_cash() {
        let db = test_db().await;
        let service = OrderService::with_log_notifier(db.clone());
        let id = seed_order(&db, PaymentMethod::Transferencia, DeliveryType::Mesa).await;

        service.set_status(&id, OrderStatus::InProgress).await.unwrap();

        let err = service
            .set_status(&id, OrderStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::PaymentConfirmationRequired)
        ));
    }
}
