//! # Order Repository
//!
//! Database operations for orders and their line-item snapshots.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_order() transaction                           │
//! │                                                                         │
//! │  1. INSERT order header                                                 │
//! │  2. INSERT every line item (immutable snapshot)                         │
//! │  3. For each product: conditional decrement                             │
//! │       UPDATE products SET stock = stock - qty                           │
//! │       WHERE id = ? AND stock >= qty                                     │
//! │  4. For each category: conditional decrement of the shared counter      │
//! │                                                                         │
//! │  Any decrement matching zero rows → StockConflict → ROLLBACK.           │
//! │  Concurrent checkouts against the same unit: exactly one commits.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Line items copy the product name, unit price and chosen extras at order
//! time. Later catalog edits never rewrite order history.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use comanda_core::{CustomerInfo, Order, OrderItem, OrderStatus};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    tenant_id: String,
    status: OrderStatus,
    delivery_type: comanda_core::DeliveryType,
    payment_method: comanda_core::PaymentMethod,
    total_cents: i64,
    customer_name: String,
    customer_phone: Option<String>,
    customer_address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            tenant_id: self.tenant_id,
            status: self.status,
            delivery_type: self.delivery_type,
            payment_method: self.payment_method,
            total_cents: self.total_cents,
            customer: CustomerInfo {
                name: self.customer_name,
                phone: self.customer_phone,
                address: self.customer_address,
            },
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    product_id: String,
    name_snapshot: String,
    unit_price_cents: i64,
    quantity: i64,
    line_total_cents: i64,
    extras: String,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = DbError;

    fn try_from(row: OrderItemRow) -> DbResult<Self> {
        Ok(OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            name_snapshot: row.name_snapshot,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity,
            line_total_cents: row.line_total_cents,
            extras: serde_json::from_str(&row.extras)?,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists an order, its items, and the matching stock decrements in
    /// one transaction.
    ///
    /// ## Errors
    /// * [`DbError::StockConflict`] - a product or category ran out between
    ///   the advisory cart check and commit; nothing is persisted
    pub async fn create_order(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total_cents = order.total_cents, "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, tenant_id, status, delivery_type, payment_method,
                total_cents, customer_name, customer_phone, customer_address,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&order.id)
        .bind(&order.tenant_id)
        .bind(order.status)
        .bind(order.delivery_type)
        .bind(order.payment_method)
        .bind(order.total_cents)
        .bind(&order.customer.name)
        .bind(&order.customer.phone)
        .bind(&order.customer.address)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            let extras = serde_json::to_string(&item.extras)?;

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, name_snapshot, unit_price_cents,
                    quantity, line_total_cents, extras, comment, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(extras)
            .bind(&item.comment)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        decrement_stock(&mut tx, &order.items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.get_items(&row.id).await?;
        Ok(Some(row.into_order(items)))
    }

    /// Lists a tenant's orders, newest first, with items.
    pub async fn list_by_tenant(&self, tenant_id: &str) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT * FROM orders
            WHERE tenant_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.get_items(&row.id).await?;
            orders.push(row.into_order(items));
        }

        Ok(orders)
    }

    /// Lists a tenant's orders in a given status, newest first, with items.
    pub async fn list_by_status(
        &self,
        tenant_id: &str,
        status: OrderStatus,
    ) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT * FROM orders
            WHERE tenant_id = ?1 AND status = ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.get_items(&row.id).await?;
            orders.push(row.into_order(items));
        }

        Ok(orders)
    }

    /// Moves an order to a new status.
    ///
    /// The WHERE clause excludes terminal rows, so a stale caller racing a
    /// finalize or cancel loses cleanly with NotFound instead of resurrecting
    /// the order.
    pub async fn update_status(&self, id: &str, to: OrderStatus) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?2, updated_at = ?3
            WHERE id = ?1 AND status IN ('pending', 'in_progress')
            "#,
        )
        .bind(id)
        .bind(to)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (open)", id));
        }

        Ok(())
    }

    /// Deletes an order and its items (cascade).
    ///
    /// Callers are expected to have passed the confirmation gate in the
    /// service layer first.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT * FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }
}

// =============================================================================
// Stock Decrement
// =============================================================================

/// Applies conditional stock decrements for a set of line items.
///
/// Quantities are aggregated per product (and per category via the product's
/// link), so two lines of the same product contend for stock as one unit.
/// Unlimited products and categories are skipped.
async fn decrement_stock(
    tx: &mut Transaction<'_, Sqlite>,
    items: &[OrderItem],
) -> DbResult<()> {
    let mut per_product: BTreeMap<&str, i64> = BTreeMap::new();
    for item in items {
        *per_product.entry(item.product_id.as_str()).or_insert(0) += item.quantity;
    }

    let mut per_category: BTreeMap<String, i64> = BTreeMap::new();

    for (product_id, quantity) in &per_product {
        let row: Option<(Option<i64>, Option<String>)> =
            sqlx::query_as("SELECT stock, category_id FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut **tx)
                .await?;

        let Some((stock, category_id)) = row else {
            return Err(DbError::not_found("Product", *product_id));
        };

        if stock.is_some() {
            let result = sqlx::query(
                r#"
                UPDATE products SET stock = stock - ?2
                WHERE id = ?1 AND stock >= ?2
                "#,
            )
            .bind(product_id)
            .bind(quantity)
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::stock_conflict("Product", *product_id, *quantity));
            }
        }

        if let Some(category_id) = category_id {
            *per_category.entry(category_id).or_insert(0) += quantity;
        }
    }

    for (category_id, quantity) in &per_category {
        let result = sqlx::query(
            r#"
            UPDATE categories SET current_stock = current_stock - ?2
            WHERE id = ?1 AND current_stock >= ?2
            "#,
        )
        .bind(category_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;

        // Unlimited categories (current_stock IS NULL) match zero rows on
        // the decrement, so check which case this is.
        if result.rows_affected() == 0 {
            let current: Option<Option<i64>> =
                sqlx::query_scalar("SELECT current_stock FROM categories WHERE id = ?1")
                    .bind(category_id)
                    .fetch_optional(&mut **tx)
                    .await?;

            match current {
                None => return Err(DbError::not_found("Category", category_id)),
                Some(Some(_)) => {
                    return Err(DbError::stock_conflict("Category", category_id, *quantity))
                }
                Some(None) => {} // unlimited
            }
        }
    }

    Ok(())
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new order item ID.
pub fn generate_order_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use comanda_core::{
        Category, DeliveryType, ExtraChoiceSnapshot, PaymentMethod, Product,
    };

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, id: &str, stock: Option<i64>, category: Option<&str>) {
        let now = Utc::now();
        db.catalog()
            .insert_product(&Product {
                id: id.to_string(),
                tenant_id: "t1".to_string(),
                name: format!("prod-{id}"),
                description: None,
                price_cents: 2500,
                stock,
                category_id: category.map(str::to_string),
                extra_group_ids: vec![],
                sort_order: 0,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    async fn seed_category(db: &Database, id: &str, current: Option<i64>) {
        let now = Utc::now();
        db.catalog()
            .insert_category(&Category {
                id: id.to_string(),
                tenant_id: "t1".to_string(),
                name: format!("cat-{id}"),
                max_stock: current,
                current_stock: current,
                sort_order: 0,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    fn item(order_id: &str, product_id: &str, quantity: i64) -> OrderItem {
        OrderItem {
            id: generate_order_item_id(),
            order_id: order_id.to_string(),
            product_id: product_id.to_string(),
            name_snapshot: format!("prod-{product_id}"),
            unit_price_cents: 2500,
            quantity,
            line_total_cents: 2500 * quantity,
            extras: vec![ExtraChoiceSnapshot {
                extra_id: "e1".to_string(),
                name: "Queso extra".to_string(),
                price_cents: 0,
            }],
            comment: None,
            created_at: Utc::now(),
        }
    }

    fn order(id: &str, items: Vec<OrderItem>) -> Order {
        let now = Utc::now();
        let total_cents = items.iter().map(|i| i.line_total_cents).sum();
        Order {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            status: OrderStatus::Pending,
            delivery_type: DeliveryType::Mostrador,
            payment_method: PaymentMethod::Efectivo,
            total_cents,
            customer: CustomerInfo {
                name: "Ana".to_string(),
                phone: Some("123".to_string()),
                address: None,
            },
            items,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_order_decrements_product_stock() {
        let db = test_db().await;
        seed_product(&db, "p1", Some(10), None).await;

        let id = generate_order_id();
        let o = order(&id, vec![item(&id, "p1", 3)]);
        db.orders().create_order(&o).await.unwrap();

        let p = db.catalog().get_product("p1").await.unwrap().unwrap();
        assert_eq!(p.stock, Some(7));

        let loaded = db.orders().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].extras[0].name, "Queso extra");
        assert!(loaded.total_reconciles());
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = test_db().await;
        seed_product(&db, "p1", Some(10), None).await;
        seed_product(&db, "p2", Some(1), None).await;

        let id = generate_order_id();
        let o = order(&id, vec![item(&id, "p1", 2), item(&id, "p2", 2)]);
        let err = db.orders().create_order(&o).await.unwrap_err();
        assert!(matches!(err, DbError::StockConflict { .. }));

        // Rolled back: p1 untouched, no order persisted
        let p1 = db.catalog().get_product("p1").await.unwrap().unwrap();
        assert_eq!(p1.stock, Some(10));
        assert!(db.orders().get_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_product_lines_aggregate_for_stock() {
        let db = test_db().await;
        seed_product(&db, "p1", Some(3), None).await;

        // Two lines of 2 each need 4 units against 3 available
        let id = generate_order_id();
        let o = order(&id, vec![item(&id, "p1", 2), item(&id, "p1", 2)]);
        let err = db.orders().create_order(&o).await.unwrap_err();
        assert!(matches!(err, DbError::StockConflict { .. }));
    }

    #[tokio::test]
    async fn test_category_counter_shared_across_products() {
        let db = test_db().await;
        seed_category(&db, "c1", Some(5)).await;
        seed_product(&db, "p1", None, Some("c1")).await;
        seed_product(&db, "p2", None, Some("c1")).await;

        let id = generate_order_id();
        let o = order(&id, vec![item(&id, "p1", 2), item(&id, "p2", 2)]);
        db.orders().create_order(&o).await.unwrap();

        let cat = db.catalog().get_category("c1").await.unwrap().unwrap();
        assert_eq!(cat.current_stock, Some(1));

        let id2 = generate_order_id();
        let o2 = order(&id2, vec![item(&id2, "p1", 2)]);
        let err = db.orders().create_order(&o2).await.unwrap_err();
        assert!(matches!(err, DbError::StockConflict { .. }));
    }

    #[tokio::test]
    async fn test_unlimited_product_never_conflicts() {
        let db = test_db().await;
        seed_product(&db, "p1", None, None).await;

        let id = generate_order_id();
        db.orders()
            .create_order(&order(&id, vec![item(&id, "p1", 500)]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_status_guards_terminal_rows() {
        let db = test_db().await;
        seed_product(&db, "p1", None, None).await;

        let id = generate_order_id();
        db.orders()
            .create_order(&order(&id, vec![item(&id, "p1", 1)]))
            .await
            .unwrap();

        db.orders()
            .update_status(&id, OrderStatus::InProgress)
            .await
            .unwrap();
        db.orders()
            .update_status(&id, OrderStatus::Completed)
            .await
            .unwrap();

        let err = db
            .orders()
            .update_status(&id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let db = test_db().await;
        seed_product(&db, "p1", None, None).await;

        let id = generate_order_id();
        db.orders()
            .create_order(&order(&id, vec![item(&id, "p1", 1)]))
            .await
            .unwrap();
        db.orders().delete(&id).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = test_db().await;
        seed_product(&db, "p1", None, None).await;

        for n in 0..3 {
            let id = format!("o{n}");
            let mut o = order(&id, vec![item(&id, "p1", 1)]);
            o.created_at = Utc::now() + chrono::Duration::seconds(n);
            db.orders().create_order(&o).await.unwrap();
        }

        let listed = db.orders().list_by_tenant("t1").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o2", "o1", "o0"]);
    }
}
