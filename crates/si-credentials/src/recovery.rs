// SPDX-License-Identifier: MIT

//! Status recovery: when the expected local `auth.json` is missing, try
//! a running container's copy, then a secret-store sidecar, at most once
//! per profile per process. Never recovers a block-listed profile.

use async_trait::async_trait;
use dashmap::DashSet;

use si_core::{AuthFile, AuthTokens, Error, LogoutBlockList};
use si_runtime::{ContainerRuntime, Deadline};

/// A secret-store sidecar fetch, the second recovery source.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn fetch(&self, profile_id: &str) -> Option<AuthTokens>;
}

/// Tracks "already attempted this run": a single in-process set,
/// initialized at process start, discarded at exit — not persisted.
#[derive(Default)]
pub struct RecoveryTracker {
    attempted: DashSet<String>,
}

impl RecoveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time it's called for `profile_id` in this
    /// process; `false` on every subsequent call.
    fn claim(&self, profile_id: &str) -> bool {
        self.attempted.insert(profile_id.to_string())
    }
}

/// Attempt recovery for `profile_id`. Returns `Ok(None)` when recovery is
/// skipped (block-listed, already attempted this run) or both sources
/// came up empty — never an error on "nothing found", only on a genuine
/// I/O failure reading an existing container file.
#[allow(clippy::too_many_arguments)]
pub async fn recover_auth_file(
    profile_id: &str,
    container_name: &str,
    container_auth_path: &str,
    runtime: &dyn ContainerRuntime,
    secret_store: Option<&dyn SecretStore>,
    block_list: &LogoutBlockList,
    tracker: &RecoveryTracker,
    deadline: Deadline,
) -> Result<Option<AuthFile>, Error> {
    if block_list.contains(profile_id) {
        return Ok(None);
    }
    if !tracker.claim(profile_id) {
        return Ok(None);
    }

    match runtime.read_file_out(container_name, container_auth_path, deadline).await {
        Ok(bytes) => {
            let raw = String::from_utf8_lossy(&bytes);
            if let Ok(auth) = AuthFile::from_json(&raw) {
                return Ok(Some(auth));
            }
        }
        Err(e) if e.kind() == si_core::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    if let Some(store) = secret_store {
        if let Some(tokens) = store.fetch(profile_id).await {
            return Ok(Some(AuthFile { tokens }));
        }
    }

    Ok(None)
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
