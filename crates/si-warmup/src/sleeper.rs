// SPDX-License-Identifier: MIT

//! Injectable sleep so the reconciler's backoff/poll waits (polling with
//! increasing backoff) don't make unit tests wait on a real clock.

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Test double that returns immediately, so reconcile tests covering
/// several retry/poll rounds don't spend real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

#[cfg(test)]
#[path = "sleeper_tests.rs"]
mod tests;
