// SPDX-License-Identifier: MIT

//! `WarmupProfileState` / `WarmupMarkers`: the warmup reconciler's
//! per-profile state machine data.

use serde::{Deserialize, Serialize};

/// Per-profile reconcile outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupResult {
    Ready,
    Warmed,
    Failed,
    Paused,
}

/// Persisted state for one profile, upserted per reconcile pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmupProfileState {
    pub profile_id: String,
    pub last_attempt: u64,
    pub last_result: WarmupResult,
    pub last_weekly_used_pct: Option<f64>,
    pub last_weekly_used_ok: bool,
    pub last_weekly_reset: Option<u64>,
    pub last_warmed_reset: Option<u64>,
    pub last_usage_delta: Option<f64>,
    pub next_due: u64,
    pub failure_count: u32,
    pub paused: bool,
}

impl WarmupProfileState {
    pub fn new(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            last_attempt: 0,
            last_result: WarmupResult::Ready,
            last_weekly_used_pct: None,
            last_weekly_used_ok: false,
            last_weekly_reset: None,
            last_warmed_reset: None,
            last_usage_delta: None,
            next_due: 0,
            failure_count: 0,
            paused: false,
        }
    }
}

/// The minimum usage delta that counts as evidence a warm prompt
/// actually moved the weekly window.
pub const MIN_DELTA_PCT: f64 = 0.05;

/// Whether this profile's reconcile pass should run now, rather than
/// being skipped until `next_due`.
pub fn should_select(
    now_epoch_secs: u64,
    next_due: u64,
    force_bootstrap: bool,
    explicitly_targeted: bool,
    last_weekly_used_pct: Option<f64>,
) -> bool {
    if force_bootstrap || explicitly_targeted {
        return true;
    }
    if last_weekly_used_pct.map(|pct| pct < 1.0).unwrap_or(false) {
        return true;
    }
    now_epoch_secs >= next_due
}

/// Versioned on-disk document: `~/.si/warmup/state.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarmupStateDocument {
    pub version: u32,
    pub profiles: Vec<WarmupProfileState>,
}

pub const WARMUP_STATE_VERSION: u32 = 1;

impl WarmupStateDocument {
    pub fn new() -> Self {
        Self { version: WARMUP_STATE_VERSION, profiles: Vec::new() }
    }

    pub fn get(&self, profile_id: &str) -> Option<&WarmupProfileState> {
        self.profiles.iter().find(|p| p.profile_id == profile_id)
    }

    pub fn upsert(&mut self, state: WarmupProfileState) {
        match self.profiles.iter_mut().find(|p| p.profile_id == state.profile_id) {
            Some(slot) => *slot = state,
            None => self.profiles.push(state),
        }
    }

    /// Pruned when a profile is removed from settings.
    pub fn retain_profiles(&mut self, known_ids: &[String]) {
        self.profiles.retain(|p| known_ids.iter().any(|id| id == &p.profile_id));
    }
}

/// File-presence markers that record operator intent for the warmup
/// sidecar. Mutually exclusive; `disabled` wins when both are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupMarkers {
    pub autostart_present: bool,
    pub disabled_present: bool,
}

impl WarmupMarkers {
    /// Whether the sidecar should be running, given marker presence and
    /// whether a "legacy installation" (existing state, no marker) was
    /// detected — treated as if autostart were requested.
    pub fn wants_sidecar(&self, legacy_state_without_marker: bool) -> bool {
        if self.disabled_present {
            return false;
        }
        self.autostart_present || legacy_state_without_marker
    }
}

#[cfg(test)]
#[path = "warmup_state_tests.rs"]
mod tests;
