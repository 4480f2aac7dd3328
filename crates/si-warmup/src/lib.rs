// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! si-warmup: the Warmup Reconciler + Scheduler.
//!
//! Drives each profile's weekly rolling-quota window to a known-advancing
//! state via a five-step per-profile state machine, persists that state
//! to `~/.si/warmup/state.json` under a cooperative file lock, logs every
//! transition to an append-only JSONL file, and ensures a cron-like
//! sidecar container that runs `warmup reconcile --quiet` every five
//! minutes — auto-healed from every other operator command.

mod jsonl_log;
mod prompt;
mod reconcile;
mod sidecar;
mod sleeper;
mod state_store;

pub use jsonl_log::{append_transition, read_transitions, LogLevel};
pub use prompt::{run_warm_attempt, warm_prompt, WarmupLaunchParams};
pub use reconcile::{reconcile_profile, ReconcileOptions, ReconcileOutcome, UsageMeasurer};
pub use sidecar::{
    disable, enable, ensure_sidecar, is_legacy_installation, needs_repair, read_markers,
    render_ofelia_config, spawn_auto_repair, write_ofelia_config, SIDECAR_CONTAINER_NAME,
};
pub use sleeper::{NoopSleeper, Sleeper, TokioSleeper};
pub use state_store::{acquire_lock, read_state, refresh_lock, write_state, StateLock, LOCK_STALE_TIMEOUT};
