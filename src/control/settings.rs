//! Runtime-tunable operating thresholds.
//!
//! The only shared mutable state in the service. Reads copy the whole
//! record; updates validate first, then replace the whole record under a
//! single write lock. The lock is never held across I/O.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::types::{KestrelError, Settings, SettingsPatch};

/// Handle to the process-wide settings record. Cheap to clone.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// A consistent snapshot of the current record.
    pub async fn get(&self) -> Settings {
        *self.inner.read().await
    }

    /// Apply a partial update. Fields absent from the patch are left
    /// unchanged. Any present field must be non-negative or the whole
    /// update is rejected with nothing applied.
    pub async fn update(&self, patch: SettingsPatch) -> Result<Settings, KestrelError> {
        if let Some(v) = patch.min_liquidity {
            if v < 0 {
                return Err(KestrelError::Validation(format!(
                    "min_liquidity must be non-negative, got {v}"
                )));
            }
        }
        if let Some(v) = patch.min_profit_per_day {
            if v.is_sign_negative() {
                return Err(KestrelError::Validation(format!(
                    "min_profit_per_day must be non-negative, got {v}"
                )));
            }
        }

        let mut guard = self.inner.write().await;
        let mut next = *guard;
        if let Some(v) = patch.min_liquidity {
            next.min_liquidity = v;
        }
        if let Some(v) = patch.min_profit_per_day {
            next.min_profit_per_day = v;
        }
        *guard = next;
        drop(guard);

        if !patch.is_empty() {
            info!(settings = %next, "Settings updated");
        }
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
