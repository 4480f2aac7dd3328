// SPDX-License-Identifier: MIT

//! The per-profile warmup state machine: select, measure-before, decide,
//! execute-with-retries, bootstrap-success, record. Built directly on
//! `si_core::warmup_state`'s pure data types and
//! `si_credentials::CredentialManager`'s token/usage façade.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use si_core::{
    should_select, Clock, Error, ErrorKind, Profile, Settings, UsageSnapshot, WarmupProfileState,
    WarmupResult, WarmupStateDocument, MIN_DELTA_PCT,
};
use si_credentials::{CredentialManager, RefreshClient};
use si_runtime::{ContainerRuntime, Deadline};

use crate::jsonl_log::{append_transition, LogLevel};
use crate::prompt::{run_warm_attempt, WarmupLaunchParams};
use crate::sleeper::Sleeper;
use crate::state_store;

/// The one network-touching seam this module needs: token freshness
/// followed by a usage read. A trait (rather than a concrete
/// `CredentialManager<S, C>`) so tests can swap in canned usage
/// snapshots instead of making a real HTTP call — the same problem
/// `si-credentials`'s own test suite sidesteps by never exercising
/// `UsageApiClient::fetch` directly.
#[async_trait]
pub trait UsageMeasurer: Send + Sync {
    async fn measure(&self, profile: &Profile, now_epoch_secs: u64) -> Result<UsageSnapshot, Error>;
}

#[async_trait]
impl<S, C> UsageMeasurer for CredentialManager<S, C>
where
    S: Settings,
    C: RefreshClient,
{
    async fn measure(&self, profile: &Profile, now_epoch_secs: u64) -> Result<UsageSnapshot, Error> {
        self.ensure_fresh(profile, now_epoch_secs).await?;
        self.usage(profile, now_epoch_secs).await
    }
}

const BASE_BACKOFF_SECS: u64 = 15 * 60;
const MAX_BACKOFF_SECS: u64 = 24 * 60 * 60;
const AUTH_FAILURE_RETRY_SECS: u64 = 6 * 60 * 60;
const FULL_LIMIT_RETRY_SECS: u64 = 5 * 60;
const RESET_JITTER_SECS: u64 = 2 * 60;
const DEFAULT_NEXT_DUE_SECS: u64 = 24 * 60 * 60;
const USAGE_POLL_ATTEMPTS: u32 = 4;
const MAX_WARM_ATTEMPTS: u32 = 3;
const EXEC_DEADLINE_SECS: u64 = 120;

/// Per-call flags a caller (`si-cli`'s `warmup reconcile` command) may
/// set; everything defaults to the ordinary background-sweep behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    pub force_bootstrap: bool,
    pub explicitly_targeted: bool,
    pub no_mcp: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub profile_id: String,
    pub result: WarmupResult,
    pub skipped: bool,
}

enum MeasureFailure {
    Auth(Error),
    Other(Error),
}

fn classify_measure_failure(e: Error) -> MeasureFailure {
    if e.kind() == ErrorKind::AuthFailure {
        MeasureFailure::Auth(e)
    } else {
        MeasureFailure::Other(e)
    }
}

async fn measure(measurer: &dyn UsageMeasurer, profile: &Profile, now: u64) -> Result<UsageSnapshot, MeasureFailure> {
    measurer.measure(profile, now).await.map_err(classify_measure_failure)
}

async fn poll_usage(
    measurer: &dyn UsageMeasurer,
    sleeper: &dyn Sleeper,
    profile: &Profile,
    now: u64,
) -> Option<UsageSnapshot> {
    let mut delay = Duration::from_secs(2);
    for _ in 0..USAGE_POLL_ATTEMPTS {
        sleeper.sleep(delay).await;
        if let Ok(snapshot) = measurer.measure(profile, now).await {
            return Some(snapshot);
        }
        delay *= 2;
    }
    None
}

/// Exponential backoff (15m base, doubling, capped at 24h) for ordinary
/// (non-full-limit) failures, keyed on the running failure count.
fn backoff_secs(failure_count: u32) -> u64 {
    let shift = failure_count.saturating_sub(1).min(16);
    BASE_BACKOFF_SECS.saturating_mul(1u64 << shift).min(MAX_BACKOFF_SECS)
}

/// Whether this reconcile pass counts as a successful bootstrap, given
/// where the profile started.
fn bootstrap_success(
    starting_at_full_limit: bool,
    reset_was_unknown_before: bool,
    window_advanced: bool,
    force_bootstrap: bool,
    before: &UsageSnapshot,
    after: &UsageSnapshot,
    any_attempt_succeeded: bool,
) -> bool {
    let reset_known_now = after.weekly.resets_at_epoch(after.fetched_at).is_some();

    if starting_at_full_limit {
        return !after.weekly.is_full_limit() && reset_known_now;
    }
    if reset_was_unknown_before {
        return reset_known_now;
    }
    if window_advanced {
        return any_attempt_succeeded;
    }
    if force_bootstrap && reset_known_now {
        return true;
    }
    let delta = (after.weekly.used_percent - before.weekly.used_percent).abs();
    delta >= MIN_DELTA_PCT
}

/// Runs one full reconcile pass for `profile`, mutating `doc` in place
/// and persisting it before returning (every branch below writes state
/// before its early return, so a crash mid-pass never loses the last
/// observed measurement).
#[allow(clippy::too_many_arguments)]
pub async fn reconcile_profile<S: Settings>(
    measurer: &dyn UsageMeasurer,
    settings: &S,
    runtime: &dyn ContainerRuntime,
    sleeper: &dyn Sleeper,
    clock: &impl Clock,
    home: &Path,
    doc: &mut WarmupStateDocument,
    profile: &Profile,
    launch: &WarmupLaunchParams,
    options: ReconcileOptions,
) -> Result<ReconcileOutcome, Error> {
    let now = clock.now_epoch_secs();
    let mut state = doc.get(&profile.id).cloned().unwrap_or_else(|| WarmupProfileState::new(&profile.id));

    // 1. Select
    if !should_select(now, state.next_due, options.force_bootstrap, options.explicitly_targeted, state.last_weekly_used_pct) {
        return Ok(ReconcileOutcome { profile_id: profile.id.clone(), result: state.last_result, skipped: true });
    }

    // 2. Measure-before
    let before = match measure(measurer, profile, now).await {
        Ok(snapshot) => snapshot,
        Err(MeasureFailure::Auth(e)) => {
            state.last_result = WarmupResult::Paused;
            state.paused = true;
            state.next_due = now + AUTH_FAILURE_RETRY_SECS;
            doc.upsert(state.clone());
            state_store::write_state(home, doc)?;
            append_transition(home, LogLevel::Warn, "auth_failure", &profile.id, serde_json::json!({"error": e.to_string()}), now)?;
            return Ok(ReconcileOutcome { profile_id: profile.id.clone(), result: WarmupResult::Paused, skipped: false });
        }
        Err(MeasureFailure::Other(e)) => {
            state.failure_count += 1;
            state.last_result = WarmupResult::Failed;
            state.next_due = now + backoff_secs(state.failure_count);
            doc.upsert(state.clone());
            state_store::write_state(home, doc)?;
            append_transition(home, LogLevel::Error, "measure_failed", &profile.id, serde_json::json!({"error": e.to_string()}), now)?;
            return Ok(ReconcileOutcome { profile_id: profile.id.clone(), result: WarmupResult::Failed, skipped: false });
        }
    };

    let starting_at_full_limit = before.weekly.is_full_limit();
    let reset_was_unknown_before = before.weekly.resets_at_epoch(now).is_none();
    let window_advanced = match (state.last_weekly_reset, before.weekly.resets_at_epoch(now)) {
        (Some(prev), Some(cur)) => prev != cur,
        _ => false,
    };

    // 3. Decide
    let need_warm = options.force_bootstrap || starting_at_full_limit || reset_was_unknown_before || window_advanced;

    if !need_warm {
        state.last_result = WarmupResult::Ready;
        state.last_weekly_used_pct = Some(before.weekly.used_percent);
        state.last_weekly_used_ok = true;
        state.last_weekly_reset = before.weekly.resets_at_epoch(now);
        state.last_attempt = now;
        state.next_due = before.weekly.resets_at_epoch(now).map(|r| r + RESET_JITTER_SECS).unwrap_or(now + DEFAULT_NEXT_DUE_SECS);
        doc.upsert(state.clone());
        state_store::write_state(home, doc)?;
        append_transition(home, LogLevel::Info, "ready", &profile.id, serde_json::json!({}), now)?;
        return Ok(ReconcileOutcome { profile_id: profile.id.clone(), result: WarmupResult::Ready, skipped: false });
    }

    // 4. Execute-with-retries
    let auth_path = si_core::paths::auth_file_path(home, &profile.id);
    let mut after = before;
    let mut any_attempt_succeeded = false;
    let mut succeeded = false;

    for attempt in 1..=MAX_WARM_ATTEMPTS {
        match run_warm_attempt(
            settings,
            runtime,
            profile,
            &auth_path,
            launch,
            attempt,
            options.no_mcp,
            Deadline::from_secs(EXEC_DEADLINE_SECS),
        )
        .await
        {
            Ok(output) if output.success() => any_attempt_succeeded = true,
            Ok(_) => {}
            Err(e) => {
                append_transition(
                    home,
                    LogLevel::Warn,
                    "attempt_failed",
                    &profile.id,
                    serde_json::json!({"attempt": attempt, "error": e.to_string()}),
                    now,
                )?;
            }
        }

        if let Some(snapshot) = poll_usage(measurer, sleeper, profile, now).await {
            after = snapshot;
        }

        if bootstrap_success(starting_at_full_limit, reset_was_unknown_before, window_advanced, options.force_bootstrap, &before, &after, any_attempt_succeeded) {
            succeeded = true;
            break;
        }
    }

    // 6. Record
    state.last_attempt = now;
    state.last_weekly_used_pct = Some(after.weekly.used_percent);
    state.last_weekly_used_ok = true;
    state.last_weekly_reset = after.weekly.resets_at_epoch(now);
    state.last_usage_delta = Some(after.weekly.used_percent - before.weekly.used_percent);

    let result = if succeeded {
        state.failure_count = 0;
        state.last_result = WarmupResult::Warmed;
        state.last_warmed_reset = state.last_weekly_reset;
        state.next_due = state.last_weekly_reset.map(|r| r + RESET_JITTER_SECS).unwrap_or(now + DEFAULT_NEXT_DUE_SECS);
        WarmupResult::Warmed
    } else {
        state.failure_count += 1;
        state.last_result = WarmupResult::Failed;
        state.next_due =
            if after.weekly.is_full_limit() { now + FULL_LIMIT_RETRY_SECS } else { now + backoff_secs(state.failure_count) };
        WarmupResult::Failed
    };

    doc.upsert(state.clone());
    state_store::write_state(home, doc)?;
    append_transition(
        home,
        if succeeded { LogLevel::Info } else { LogLevel::Warn },
        if succeeded { "warmed" } else { "warm_failed" },
        &profile.id,
        serde_json::json!({"failure_count": state.failure_count, "next_due": state.next_due}),
        now,
    )?;

    Ok(ReconcileOutcome { profile_id: profile.id.clone(), result, skipped: false })
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
