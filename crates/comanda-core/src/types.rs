//! # Domain Types
//!
//! Core domain types used throughout Comanda.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │    Product      │   │   ExtraGroup    │   │      Extra      │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (UUID)      │   │  min/max        │   │  flat price OR  │   │
//! │  │  price_cents    │   │  is_required    │   │  option list    │   │
//! │  │  stock ceiling  │   │  sort_order     │   │  sort_order     │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘   │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │    Category     │   │     Order       │   │   OrderItem     │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  shared stock   │   │  status         │   │  price snapshot │   │
//! │  │  pool           │   │  delivery/pay   │   │  extras frozen  │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Order items and cart lines freeze product name and extras prices at
//! composition time. Prices must not silently change after selection, so
//! persisted entries carry copies, never live catalog references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available on a tenant's storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Display name shown on storefront and order tickets.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Base unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Stock ceiling for this product. `None` = unlimited.
    pub stock: Option<i64>,

    /// Category this product belongs to, if any. Products in the same
    /// category share the category's stock pool.
    pub category_id: Option<String>,

    /// Extras groups selectable on this product, in display order.
    pub extra_group_ids: Vec<String>,

    /// Whether product is active (soft delete; orders may still reference
    /// an inactive product).
    pub is_active: bool,

    /// Display order on the storefront.
    pub sort_order: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as a Money type.
    ///
    /// Negative stored prices are coerced to zero; pricing never fails on
    /// bad numeric input.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents.max(0))
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category with a shared, category-wide stock pool.
///
/// `current_stock` is decremented when any product of the category is sold.
/// `None` on both fields means the category does not constrain stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Configured pool size. `None` = no category ceiling.
    pub max_stock: Option<i64>,
    /// Remaining units in the shared pool. `None` = no category ceiling.
    pub current_stock: Option<i64>,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Extras
// =============================================================================

/// A group of extras with selection-count rules.
///
/// ## Invariant
/// `0 ≤ min_selections ≤ max_selections`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraGroup {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Minimum qualifying selections for the group to be valid.
    pub min_selections: i64,
    /// Maximum qualifying selections the group accepts.
    pub max_selections: i64,
    /// Required groups block cart mutations when unmet; non-required groups
    /// with unmet minimums are tolerated.
    pub is_required: bool,
    pub sort_order: i64,
    pub is_active: bool,
}

/// One selectable option of an options-bearing extra.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraOption {
    pub id: String,
    pub label: String,
    /// Price in cents, ≥ 0.
    pub price_cents: i64,
}

/// An add-on selectable on a product.
///
/// Either a flat boolean toggle with a single price, or an options-bearing
/// extra contributing at most one chosen option. Either way it counts as at
/// most one qualifying selection for group-count purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extra {
    pub id: String,
    /// Group that owns this extra.
    pub group_id: String,
    pub name: String,
    /// Price of a flat toggle in cents; ignored when `has_options`.
    pub price_cents: i64,
    /// When true, `options` carries the ordered choice list.
    pub has_options: bool,
    /// Ordered list of options; empty for flat extras.
    pub options: Vec<ExtraOption>,
    pub sort_order: i64,
    pub is_active: bool,
}

impl Extra {
    /// Finds an option by id.
    pub fn option(&self, option_id: &str) -> Option<&ExtraOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a persisted order.
///
/// `Completed` and `Cancelled` are terminal: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received, not yet taken by an operator.
    Pending,
    /// Taken by an operator, being prepared.
    InProgress,
    /// Finalized. Terminal.
    Completed,
    /// Cancelled. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further transitions.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Delivery Type
// =============================================================================

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    /// Pickup at the counter.
    Mostrador,
    /// Home delivery.
    Domicilio,
    /// Served at a table.
    Mesa,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash.
    Efectivo,
    /// Card on an external terminal.
    Tarjeta,
    /// QR payment.
    Qr,
    /// Bank transfer.
    Transferencia,
}

impl PaymentMethod {
    /// Manual-payment methods cannot be verified automatically; finalizing
    /// an order paid this way requires operator confirmation.
    #[inline]
    pub const fn is_manual(&self) -> bool {
        matches!(self, PaymentMethod::Efectivo | PaymentMethod::Transferencia)
    }
}

// =============================================================================
// Order
// =============================================================================

/// Customer contact fields captured at checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: Option<String>,
    /// Street address; expected for `Domicilio` orders.
    pub address: Option<String>,
}

/// A frozen extras entry carried by a line item.
///
/// Options are rendered as `"<extraName>: <optionLabel>"` so the entry stays
/// human-readable once detached from the live catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraChoiceSnapshot {
    pub extra_id: String,
    pub name: String,
    pub price_cents: i64,
}

/// A line item of a persisted order. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at composition time (frozen).
    pub name_snapshot: String,
    /// Base price + extras total at composition time (frozen), in cents.
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity, in cents.
    pub line_total_cents: i64,
    /// Frozen extras entries, order-stable.
    pub extras: Vec<ExtraChoiceSnapshot>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A persisted customer order.
///
/// ## Invariant
/// `total_cents` reconciles with the sum of item line totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub total_cents: i64,
    pub customer: CustomerInfo,
    /// Ordered line-item snapshots.
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Checks that the stored total matches the sum of item line totals.
    pub fn total_reconciles(&self) -> bool {
        let sum: i64 = self.items.iter().map(|i| i.line_total_cents).sum();
        sum == self.total_cents
    }
}

// =============================================================================
// Tenant Configuration
// =============================================================================

/// Which delivery types a tenant offers at checkout. Defaults to all-enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub mostrador: bool,
    pub domicilio: bool,
    pub mesa: bool,
}

impl DeliveryConfig {
    /// Whether the given delivery type is offered.
    pub const fn is_enabled(&self, delivery: DeliveryType) -> bool {
        match delivery {
            DeliveryType::Mostrador => self.mostrador,
            DeliveryType::Domicilio => self.domicilio,
            DeliveryType::Mesa => self.mesa,
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        DeliveryConfig {
            mostrador: true,
            domicilio: true,
            mesa: true,
        }
    }
}

/// Whether a tenant's storefront is temporarily paused (not taking orders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PauseStatus {
    pub is_paused: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_terminal() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_payment_method_manual() {
        assert!(PaymentMethod::Efectivo.is_manual());
        assert!(PaymentMethod::Transferencia.is_manual());
        assert!(!PaymentMethod::Tarjeta.is_manual());
        assert!(!PaymentMethod::Qr.is_manual());
    }

    #[test]
    fn test_delivery_config_default_all_enabled() {
        let config = DeliveryConfig::default();
        assert!(config.is_enabled(DeliveryType::Mostrador));
        assert!(config.is_enabled(DeliveryType::Domicilio));
        assert!(config.is_enabled(DeliveryType::Mesa));
    }

    #[test]
    fn test_negative_price_coerced_to_zero() {
        let product = Product {
            id: "p1".into(),
            tenant_id: "t1".into(),
            name: "Broken".into(),
            description: None,
            price_cents: -500,
            stock: None,
            category_id: None,
            extra_group_ids: vec![],
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(product.price().cents(), 0);
    }

    #[test]
    fn test_order_total_reconciles() {
        let now = Utc::now();
        let item = OrderItem {
            id: "i1".into(),
            order_id: "o1".into(),
            product_id: "p1".into(),
            name_snapshot: "Lomito".into(),
            unit_price_cents: 3300,
            quantity: 2,
            line_total_cents: 6600,
            extras: vec![],
            comment: None,
            created_at: now,
        };
        let order = Order {
            id: "o1".into(),
            tenant_id: "t1".into(),
            status: OrderStatus::Pending,
            delivery_type: DeliveryType::Mostrador,
            payment_method: PaymentMethod::Efectivo,
            total_cents: 6600,
            customer: CustomerInfo::default(),
            items: vec![item],
            created_at: now,
            updated_at: now,
        };
        assert!(order.total_reconciles());
    }
}
