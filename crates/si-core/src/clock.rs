// SPDX-License-Identifier: MIT

//! Clock abstraction so reconcilers (warmup's `next_due`, pane-session
//! staleness, credential expiry math) are testable without real sleeps.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that provides the current wall-clock time as epoch seconds.
///
/// Epoch seconds (not `Instant`) because every timestamp in the data model
/// (`AuthTokens::last_refresh_time`, `WarmupProfileState::next_due`, JWT
/// `exp`) is persisted to disk and must survive a process restart.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now_epoch_secs(&self) -> u64;
}

/// Real system clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
    }
}

/// Fake clock for tests with controllable, monotonically-advanced time.
#[derive(Clone)]
pub struct FakeClock {
    epoch_secs: Arc<Mutex<u64>>,
}

impl FakeClock {
    pub fn new(start_epoch_secs: u64) -> Self {
        Self { epoch_secs: Arc::new(Mutex::new(start_epoch_secs)) }
    }

    pub fn advance(&self, duration: Duration) {
        *self.epoch_secs.lock() += duration.as_secs();
    }

    pub fn set(&self, epoch_secs: u64) {
        *self.epoch_secs.lock() = epoch_secs;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(1_700_000_000)
    }
}

impl Clock for FakeClock {
    fn now_epoch_secs(&self) -> u64 {
        *self.epoch_secs.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
