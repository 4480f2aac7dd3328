// SPDX-License-Identifier: MIT

//! Global profile-status fanout: fetches statuses for the whole profile
//! list with a small bounded pool — 2 to 6 tasks, sized to CPU count,
//! capped by the number of profiles — each task carrying its own deadline.

use std::future::Future;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};

use si_core::{AuthFile, Error, UsageSnapshot};

/// One profile's fetched status, or the error that stopped this task. A
/// per-task failure never aborts the fanout for other profiles.
#[derive(Debug, Clone)]
pub struct ProfileStatus {
    pub profile_id: String,
    pub auth: Result<AuthFile, String>,
    pub usage: Option<UsageSnapshot>,
}

/// The pool width: `clamp(available_parallelism, 2, 6)`, capped again by
/// the number of profiles since there's no point over-provisioning tasks
/// that don't exist.
pub fn pool_width(profile_count: usize) -> usize {
    let cpu = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(2);
    cpu.clamp(2, 6).min(profile_count.max(1))
}

/// Runs `fetch_one` for every profile with bounded concurrency, each call
/// wrapped in `per_task_timeout`. A task that exceeds its deadline reports
/// `Err` rather than hanging the whole fanout.
pub async fn fetch_statuses<F, Fut>(
    profile_ids: &[String],
    per_task_timeout: Duration,
    fetch_one: F,
) -> Vec<ProfileStatus>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(AuthFile, Option<UsageSnapshot>), Error>> + Send,
{
    let width = pool_width(profile_ids.len());

    stream::iter(profile_ids.iter().cloned())
        .map(|profile_id| {
            let fut = fetch_one(profile_id.clone());
            async move {
                let outcome = tokio::time::timeout(per_task_timeout, fut).await;
                let auth = match outcome {
                    Ok(Ok((auth, usage))) => return ProfileStatus { profile_id, auth: Ok(auth), usage },
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!("status fetch timed out after {per_task_timeout:?}")),
                };
                ProfileStatus { profile_id, auth, usage: None }
            }
        })
        .buffer_unordered(width)
        .collect()
        .await
}

#[cfg(test)]
#[path = "fanout_tests.rs"]
mod tests;
