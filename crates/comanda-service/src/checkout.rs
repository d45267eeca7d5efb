//! # Checkout
//!
//! Turns a composed cart into a persisted order.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        place_order()                                    │
//! │                                                                         │
//! │  1. Cart non-empty?                    ← EmptyCart                      │
//! │  2. Storefront paused?                 ← StorePaused                    │
//! │  3. Delivery type enabled?             ← DeliveryTypeDisabled           │
//! │  4. Domicilio has an address?          ← MissingDeliveryAddress         │
//! │  5. Freeze cart lines into item snapshots                               │
//! │  6. create_order() transaction         ← StockConflict on a race        │
//! │                                                                         │
//! │  Cart-time stock checks were advisory; step 6 is the arbiter.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::{ServiceError, ServiceResult};
use comanda_core::{Cart, CoreError, CustomerInfo, DeliveryType, Order, OrderItem, OrderStatus, PaymentMethod};
use comanda_db::repository::order::{generate_order_id, generate_order_item_id};
use comanda_db::Database;

/// Everything checkout needs beyond the cart itself.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub tenant_id: String,
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub customer: CustomerInfo,
}

/// Service that converts carts into persisted orders.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
}

impl CheckoutService {
    /// Creates a new CheckoutService.
    pub fn new(db: Database) -> Self {
        CheckoutService { db }
    }

    /// Places an order from the cart. The cart is left untouched; clearing
    /// it on success is the caller's call.
    #[instrument(skip(self, cart, request), fields(tenant_id = %request.tenant_id))]
    pub async fn place_order(&self, cart: &Cart, request: CheckoutRequest) -> ServiceResult<Order> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let pause = self.db.config().get_pause_status(&request.tenant_id).await?;
        if pause.is_paused {
            return Err(ServiceError::StorePaused);
        }

        let delivery = self
            .db
            .config()
            .get_delivery_config(&request.tenant_id)
            .await?;
        if !delivery.is_enabled(request.delivery_type) {
            return Err(ServiceError::DeliveryTypeDisabled(request.delivery_type));
        }

        if request.delivery_type == DeliveryType::Domicilio
            && request
                .customer
                .address
                .as_deref()
                .map_or(true, |a| a.trim().is_empty())
        {
            return Err(ServiceError::MissingDeliveryAddress);
        }

        let now = Utc::now();
        let order_id = generate_order_id();

        let items: Vec<OrderItem> = cart
            .lines()
            .iter()
            .map(|line| OrderItem {
                id: generate_order_item_id(),
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot: line.name.clone(),
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                line_total_cents: line.line_total_cents(),
                extras: line.extras.clone(),
                comment: line.comment.clone(),
                created_at: now,
            })
            .collect();

        let order = Order {
            id: order_id,
            tenant_id: request.tenant_id,
            status: OrderStatus::Pending,
            delivery_type: request.delivery_type,
            payment_method: request.payment_method,
            total_cents: cart.total_cents(),
            customer: request.customer,
            items,
            created_at: now,
            updated_at: now,
        };

        self.db.orders().create_order(&order).await?;

        info!(
            order_id = %order.id,
            total_cents = order.total_cents,
            items = order.items.len(),
            "Order placed"
        );

        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
