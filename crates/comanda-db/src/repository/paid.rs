//! # Paid-Flag Repository
//!
//! Manual-payment confirmation flags, stored independently of order status.
//!
//! Cash and transfer orders can be paid at any point in their lifecycle, so
//! "paid" is not a status transition. A flag row exists once the operator
//! confirms payment; absence means unpaid.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::debug;

use crate::error::DbResult;

/// Repository for manual-payment paid flags.
#[derive(Debug, Clone)]
pub struct PaidFlagRepository {
    pool: SqlitePool,
}

impl PaidFlagRepository {
    /// Creates a new PaidFlagRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaidFlagRepository { pool }
    }

    /// Whether an order has been marked paid.
    pub async fn is_paid(&self, tenant_id: &str, order_id: &str) -> DbResult<bool> {
        let paid: Option<bool> = sqlx::query_scalar(
            "SELECT paid FROM paid_orders WHERE tenant_id = ?1 AND order_id = ?2",
        )
        .bind(tenant_id)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(paid.unwrap_or(false))
    }

    /// Marks an order paid. Idempotent.
    pub async fn mark_paid(&self, tenant_id: &str, order_id: &str) -> DbResult<()> {
        debug!(tenant_id, order_id, "Marking order paid");
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO paid_orders (tenant_id, order_id, paid, updated_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(tenant_id, order_id) DO UPDATE SET
                paid = 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes the flag row for a deleted order. Missing row is fine.
    pub async fn clear(&self, tenant_id: &str, order_id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM paid_orders WHERE tenant_id = ?1 AND order_id = ?2")
            .bind(tenant_id)
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// All paid order IDs for a tenant, for decorating list views in one
    /// query instead of N.
    pub async fn paid_set(&self, tenant_id: &str) -> DbResult<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT order_id FROM paid_orders WHERE tenant_id = ?1 AND paid = 1",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
