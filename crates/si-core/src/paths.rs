// SPDX-License-Identifier: MIT

//! Persisted state layout under `$HOME/.si`.
//!
//! Every path helper here is a pure function of `$HOME` (or an injected
//! root, for tests) — no I/O is performed by this module itself.

use std::path::{Path, PathBuf};

/// Root of all si state: `$HOME/.si`, or `$SI_HOME` when set (test/CI
/// override).
pub fn si_home() -> PathBuf {
    if let Ok(dir) = std::env::var("SI_HOME") {
        return PathBuf::from(dir);
    }
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".si")
}

pub fn profiles_root(home: &Path) -> PathBuf {
    home.join("codex").join("profiles")
}

pub fn profile_dir(home: &Path, profile_id: &str) -> PathBuf {
    profiles_root(home).join(profile_id)
}

pub fn auth_file_path(home: &Path, profile_id: &str) -> PathBuf {
    profile_dir(home, profile_id).join("auth.json")
}

pub fn logout_block_list_path(home: &Path) -> PathBuf {
    home.join("codex-logout-blocked-profiles.json")
}

pub fn warmup_dir(home: &Path) -> PathBuf {
    home.join("warmup")
}

pub fn warmup_state_path(home: &Path) -> PathBuf {
    warmup_dir(home).join("state.json")
}

pub fn warmup_autostart_marker(home: &Path) -> PathBuf {
    warmup_dir(home).join("autostart.v1")
}

pub fn warmup_disabled_marker(home: &Path) -> PathBuf {
    warmup_dir(home).join("disabled.v1")
}

pub fn logs_dir(home: &Path) -> PathBuf {
    home.join("logs")
}

pub fn warmup_log_path(home: &Path) -> PathBuf {
    logs_dir(home).join("warmup.log")
}

pub fn ofelia_config_path(home: &Path) -> PathBuf {
    home.join("ofelia").join("warmup-reconcile.ini")
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
