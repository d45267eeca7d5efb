//! # Storefront Config Repository
//!
//! Per-tenant storefront settings: delivery-type toggles and the pause flag.
//!
//! Both tables are keyed by tenant and sparse: an absent row means the
//! default (all delivery types enabled, not paused), so reads fall back to
//! `Default` instead of erroring.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use comanda_core::{DeliveryConfig, PauseStatus};

/// Repository for storefront configuration.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
}

impl ConfigRepository {
    /// Creates a new ConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ConfigRepository { pool }
    }

    /// Reads the delivery-type toggles. Absent row = all enabled.
    pub async fn get_delivery_config(&self, tenant_id: &str) -> DbResult<DeliveryConfig> {
        let row: Option<(bool, bool, bool)> = sqlx::query_as(
            "SELECT mostrador, domicilio, mesa FROM delivery_config WHERE tenant_id = ?1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some((mostrador, domicilio, mesa)) => DeliveryConfig {
                mostrador,
                domicilio,
                mesa,
            },
            None => DeliveryConfig::default(),
        })
    }

    /// Upserts the delivery-type toggles.
    pub async fn set_delivery_config(
        &self,
        tenant_id: &str,
        config: &DeliveryConfig,
    ) -> DbResult<()> {
        debug!(tenant_id, ?config, "Writing delivery config");
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO delivery_config (tenant_id, mostrador, domicilio, mesa, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(tenant_id) DO UPDATE SET
                mostrador = excluded.mostrador,
                domicilio = excluded.domicilio,
                mesa = excluded.mesa,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(config.mostrador)
        .bind(config.domicilio)
        .bind(config.mesa)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reads the pause flag. Absent row = not paused.
    pub async fn get_pause_status(&self, tenant_id: &str) -> DbResult<PauseStatus> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT is_paused FROM pause_status WHERE tenant_id = ?1")
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(PauseStatus {
            is_paused: row.map(|(p,)| p).unwrap_or(false),
        })
    }

    /// Upserts the pause flag.
    pub async fn set_pause_status(&self, tenant_id: &str, status: &PauseStatus) -> DbResult<()> {
        debug!(tenant_id, is_paused = status.is_paused, "Writing pause status");
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO pause_status (tenant_id, is_paused, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(tenant_id) DO UPDATE SET
                is_paused = excluded.is_paused,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(status.is_paused)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
