//! # Local Settings Cache
//!
//! Last-known-good storefront settings, mirrored to a small JSON file per
//! tenant.
//!
//! The database is the source of truth; the cache exists so the storefront
//! can keep answering "which delivery types are on?" and "are we paused?"
//! with the last persisted values when the database is briefly unavailable,
//! instead of flipping everything back to defaults.
//!
//! Files live under the platform data directory
//! (e.g. `~/.local/share/comanda/` on Linux) as `settings-<tenant>.json`.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use comanda_core::{DeliveryConfig, PauseStatus};

/// The settings snapshot mirrored per tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSettings {
    pub delivery: DeliveryConfig,
    pub pause: PauseStatus,
}

/// File-backed settings mirror.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Creates a cache under the platform data directory.
    pub fn new() -> DbResult<Self> {
        let dirs = ProjectDirs::from("com", "comanda", "comanda")
            .ok_or_else(|| DbError::Internal("No usable data directory".to_string()))?;
        Ok(Self::with_dir(dirs.data_dir().to_path_buf()))
    }

    /// Creates a cache rooted at an explicit directory (used by tests).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        LocalCache { dir: dir.into() }
    }

    fn path_for(&self, tenant_id: &str) -> PathBuf {
        self.dir.join(format!("settings-{tenant_id}.json"))
    }

    /// Loads the cached snapshot for a tenant, `None` if never written.
    ///
    /// A corrupt file is treated as absent (logged at warn), not fatal:
    /// the cache is a fallback, it must never take the storefront down.
    pub fn load(&self, tenant_id: &str) -> Option<CachedSettings> {
        let path = self.path_for(tenant_id);
        let raw = fs::read_to_string(&path).ok()?;

        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding corrupt settings cache");
                None
            }
        }
    }

    /// Writes the snapshot for a tenant, creating the directory if needed.
    pub fn store(&self, tenant_id: &str, settings: &CachedSettings) -> DbResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| DbError::Internal(format!("Cache dir creation failed: {e}")))?;

        let path = self.path_for(tenant_id);
        let raw = serde_json::to_string_pretty(settings)?;
        fs::write(&path, raw)
            .map_err(|e| DbError::Internal(format!("Cache write failed: {e}")))?;

        debug!(path = %path.display(), "Settings cache updated");
        Ok(())
    }

    /// Convenience for callers that only track one of the two settings.
    pub fn store_delivery(&self, tenant_id: &str, delivery: &DeliveryConfig) -> DbResult<()> {
        let mut settings = self.load(tenant_id).unwrap_or_default();
        settings.delivery = *delivery;
        self.store(tenant_id, &settings)
    }

    /// See [`LocalCache::store_delivery`].
    pub fn store_pause(&self, tenant_id: &str, pause: &PauseStatus) -> DbResult<()> {
        let mut settings = self.load(tenant_id).unwrap_or_default();
        settings.pause = *pause;
        self.store(tenant_id, &settings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_per_tenant() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::with_dir(tmp.path());

        assert!(cache.load("t1").is_none());

        let settings = CachedSettings {
            delivery: DeliveryConfig {
                mostrador: true,
                domicilio: false,
                mesa: true,
            },
            pause: PauseStatus { is_paused: true },
        };
        cache.store("t1", &settings).unwrap();

        assert_eq!(cache.load("t1").unwrap(), settings);
        assert!(cache.load("t2").is_none());
    }

    #[test]
    fn test_partial_stores_merge() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::with_dir(tmp.path());

        cache
            .store_pause("t1", &PauseStatus { is_paused: true })
            .unwrap();
        cache
            .store_delivery(
                "t1",
                &DeliveryConfig {
                    mostrador: false,
                    domicilio: true,
                    mesa: true,
                },
            )
            .unwrap();

        let loaded = cache.load("t1").unwrap();
        assert!(loaded.pause.is_paused);
        assert!(!loaded.delivery.mostrador);
    }

    #[test]
    fn test_corrupt_file_treated_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::with_dir(tmp.path());

        fs::create_dir_all(tmp.path()).unwrap();
        fs::write(tmp.path().join("settings-t1.json"), "{not json").unwrap();

        assert!(cache.load("t1").is_none());
    }
}
