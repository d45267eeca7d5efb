//! # Optimistic Settings
//!
//! A small holder for a setting that flips instantly in the UI and rolls
//! back if persistence fails.
//!
//! ```text
//! value = new            ← caller sees the toggle immediately
//! persist(new).await
//!   Ok  → keep new
//!   Err → value = previous, error propagates
//! ```

use std::future::Future;

/// A setting value with optimistic update + rollback.
#[derive(Debug, Clone)]
pub struct OptimisticSetting<T: Clone> {
    value: T,
}

impl<T: Clone> OptimisticSetting<T> {
    /// Wraps the current persisted value.
    pub fn new(value: T) -> Self {
        OptimisticSetting { value }
    }

    /// The current (possibly optimistic) value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Applies `new_value` immediately, then runs `persist`. On failure the
    /// previous value is restored and the error returned.
    pub async fn update<F, Fut, E>(&mut self, new_value: T, persist: F) -> Result<(), E>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let previous = self.value.clone();
        self.value = new_value.clone();

        match persist(new_value).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.value = previous;
                Err(e)
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

    #[tokio::test]
    async fn test_update_keeps_value_on_success() {
        let mut setting = OptimisticSetting::new(false);

        let result: Result<(), &str> = setting.update(true, |_| async { Ok(()) }).await;
        assert!(result.is_ok());
        assert!(*setting.get());
    }

    #[tokio::test]
    async fn test_update_rolls_back_on_failure() {
        let mut setting = OptimisticSetting::new(42_i64);

        let result = setting
            .update(7, |_| async { Err("db unavailable") })
            .await;
        assert!(result.is_err());
        assert_eq!(*setting.get(), 42);
    }

    #[tokio::test]
    async fn test_persist_sees_the_new_value() {
        let mut setting = OptimisticSetting::new("old".to_string());

        setting
            .update("new".to_string(), |v| async move {
                assert_eq!(v, "new");
                Ok::<(), ()>(())
            })
            .await
            .unwrap();
    }
}
