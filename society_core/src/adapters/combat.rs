//! Combat tuning derived from registry values.

use serde::{Deserialize, Serialize};
use society_rules::ValueSource;

use super::{resolve, AdapterKey};

/// Vulnerability windows last this many timing windows.
pub const VULNERABILITY_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatTuning {
    /// Seconds a pattern stays open to a verb.
    pub vulnerability_window: f64,
    /// 1.0 = full progress loss on failure.
    pub failure_penalty: f64,
    /// 1.0 = full cost to retry.
    pub retry_cost: f64,
}

impl CombatTuning {
    pub fn derive<S>(source: &S) -> Self
    where
        S: ValueSource + ?Sized,
    {
        Self {
            vulnerability_window: resolve(source, AdapterKey::TimingWindow) * VULNERABILITY_FACTOR,
            failure_penalty: resolve(source, AdapterKey::FailurePenalty),
            retry_cost: resolve(source, AdapterKey::RetryCost),
        }
    }

    /// Progress kept after failing with `progress` accumulated.
    pub fn progress_after_failure(&self, progress: f64) -> f64 {
        (progress * (1.0 - self.failure_penalty)).clamp(0.0, 1.0)
    }

    /// Scale a base retry price.
    pub fn retry_cost_for(&self, base: f64) -> f64 {
        base * self.retry_cost
    }
}
