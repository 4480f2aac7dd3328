// SPDX-License-Identifier: MIT

//! `UsageSnapshot`: the two rate-limit windows reported by the upstream
//! usage API.
//!
//! A window reports `used_percent`, `window_seconds`, and either an
//! absolute `resets_at` or a relative `resets_after_seconds` — upstream has
//! been observed to send either shape, so both are optional and the derived
//! helpers prefer the absolute timestamp (the "actual countdown") when both
//! are present.

use serde::{Deserialize, Serialize};

/// One rate-limit window (the "five-hour" or "weekly" bucket).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageWindow {
    pub used_percent: f64,
    pub window_seconds: u64,
    pub resets_at: Option<u64>,
    pub resets_after_seconds: Option<u64>,
}

impl UsageWindow {
    pub fn remaining_percent(&self) -> f64 {
        (100.0 - self.used_percent).clamp(0.0, 100.0)
    }

    /// Whether this window reads as "100% remaining" — the untrustworthy
    /// boundary where the reset timestamp may float between reads until
    /// real usage has been observed.
    pub fn is_full_limit(&self) -> bool {
        self.used_percent < 1.0
    }

    /// Resolve an absolute reset epoch, preferring `resets_at` (the actual
    /// countdown) over deriving one from `resets_after_seconds`.
    pub fn resets_at_epoch(&self, now_epoch_secs: u64) -> Option<u64> {
        self.resets_at.or_else(|| self.resets_after_seconds.map(|s| now_epoch_secs + s))
    }

    pub fn remaining_minutes(&self, now_epoch_secs: u64) -> Option<u64> {
        self.resets_at_epoch(now_epoch_secs).map(|r| r.saturating_sub(now_epoch_secs) / 60)
    }

    /// Human-readable reset label, e.g. "resets in 3h12m" or "reset unknown".
    pub fn reset_label(&self, now_epoch_secs: u64) -> String {
        match self.remaining_minutes(now_epoch_secs) {
            Some(mins) => format!("resets in {}h{}m", mins / 60, mins % 60),
            None => "reset unknown".to_string(),
        }
    }
}

/// Both windows as read at one point in time. Never persisted beyond
/// warmup state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub five_hour: UsageWindow,
    pub weekly: UsageWindow,
    pub fetched_at: u64,
}

#[cfg(test)]
#[path = "usage_tests.rs"]
mod tests;
