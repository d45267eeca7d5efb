//! # Storefront Settings
//!
//! Per-tenant delivery toggles and the pause flag, with two resilience
//! layers on top of the database:
//!
//! - **Optimistic updates**: toggles flip immediately and roll back if the
//!   write fails, so the dashboard never shows a stuck switch.
//! - **Local cache fallback**: reads that fail against the database fall
//!   back to the last-known-good JSON mirror, then to defaults. Successful
//!   writes refresh the mirror.

use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::optimistic::OptimisticSetting;
use comanda_core::{DeliveryConfig, PauseStatus};
use comanda_db::{Database, LocalCache};

/// Per-tenant settings handle for dashboard callers.
pub struct SettingsService {
    db: Database,
    cache: LocalCache,
    tenant_id: String,
    delivery: OptimisticSetting<DeliveryConfig>,
    pause: OptimisticSetting<PauseStatus>,
}

impl SettingsService {
    /// Loads current settings for a tenant.
    ///
    /// Database first; on failure the local mirror; on a cold start with
    /// neither, defaults (all delivery types on, not paused).
    pub async fn load(db: Database, cache: LocalCache, tenant_id: impl Into<String>) -> Self {
        let tenant_id = tenant_id.into();

        let (delivery, pause) = match (
            db.config().get_delivery_config(&tenant_id).await,
            db.config().get_pause_status(&tenant_id).await,
        ) {
            (Ok(delivery), Ok(pause)) => (delivery, pause),
            (delivery_result, pause_result) => {
                warn!(%tenant_id, "Settings read failed, using local mirror");
                let mirrored = cache.load(&tenant_id).unwrap_or_default();
                (
                    delivery_result.unwrap_or(mirrored.delivery),
                    pause_result.unwrap_or(mirrored.pause),
                )
            }
        };

        SettingsService {
            db,
            cache,
            tenant_id,
            delivery: OptimisticSetting::new(delivery),
            pause: OptimisticSetting::new(pause),
        }
    }

    /// Current delivery-type toggles.
    pub fn delivery_config(&self) -> DeliveryConfig {
        *self.delivery.get()
    }

    /// Current pause flag.
    pub fn is_paused(&self) -> bool {
        self.pause.get().is_paused
    }

    /// Updates the delivery toggles optimistically.
    pub async fn set_delivery_config(&mut self, config: DeliveryConfig) -> ServiceResult<()> {
        let db = self.db.clone();
        let cache = self.cache.clone();
        let tenant_id = self.tenant_id.clone();

        self.delivery
            .update(config, |value| async move {
                db.config().set_delivery_config(&tenant_id, &value).await?;

                // Mirror refresh is best-effort; the database write already
                // succeeded.
                if let Err(e) = cache.store_delivery(&tenant_id, &value) {
                    warn!(%tenant_id, error = %e, "Settings mirror write failed");
                }

                Ok::<(), ServiceError>(())
            })
            .await?;

        info!(tenant_id = %self.tenant_id, ?config, "Delivery config updated");
        Ok(())
    }

    /// Pauses or resumes the storefront optimistically.
    pub async fn set_paused(&mut self, is_paused: bool) -> ServiceResult<()> {
        let db = self.db.clone();
        let cache = self.cache.clone();
        let tenant_id = self.tenant_id.clone();

        self.pause
            .update(PauseStatus { is_paused }, |value| async move {
                db.config().set_pause_status(&tenant_id, &value).await?;

                if let Err(e) = cache.store_pause(&tenant_id, &value) {
                    warn!(%tenant_id, error = %e, "Settings mirror write failed");
                }

                Ok::<(), ServiceError>(())
            })
            .await?;

        info!(tenant_id = %self.tenant_id, is_paused, "Pause status updated");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
