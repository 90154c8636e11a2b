//! Sync outcome reporting.

use serde::{Deserialize, Serialize};

use stockroom_core::{Sku, Storefront};

/// The outcome of one sync attempt for one (product, store) pair.
///
/// Produced fresh on every attempt and returned to whoever invoked the
/// sync; never persisted. Failures are data here, not errors - the engine
/// converts every exception at its boundary into one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    pub sku: Sku,
    pub store: Storefront,
    pub success: bool,
    /// Remote quantity before the adjustment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_quantity: Option<i64>,
    /// Remote quantity after the adjustment (the local on-hand figure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    /// A successful sync that moved the remote quantity from `previous` to
    /// `new`.
    #[must_use]
    pub fn succeeded(sku: Sku, store: Storefront, previous: i64, new: i64) -> Self {
        Self {
            sku,
            store,
            success: true,
            previous_quantity: Some(previous),
            new_quantity: Some(new),
            message: Some(format!("Updated inventory from {previous} to {new}")),
            error: None,
        }
    }

    /// A failed sync carrying the error message.
    #[must_use]
    pub const fn failed(sku: Sku, store: Storefront, error: String) -> Self {
        Self {
            sku,
            store,
            success: false,
            previous_quantity: None,
            new_quantity: None,
            message: None,
            error: Some(error),
        }
    }
}

/// Aggregate report for a batch of sync attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<SyncResult>,
}

impl From<Vec<SyncResult>> for SyncReport {
    fn from(results: Vec<SyncResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;
        Self {
            succeeded,
            failed,
            results,
        }
    }
}

impl SyncReport {
    /// One-line human summary ("Sync completed: 3 succeeded, 1 failed").
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Sync completed: {} succeeded, {} failed",
            self.succeeded, self.failed
        )
    }
}
