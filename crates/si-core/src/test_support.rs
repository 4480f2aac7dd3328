// SPDX-License-Identifier: MIT

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]` so
//! downstream crates can pull in fixture builders without pulling
//! proptest into their non-test deps.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::auth::{AuthFile, AuthTokens};
use crate::container_binding::{BindMount, ObservedContainer, RequiredMounts};
use crate::profile::Profile;
use crate::settings::Settings;
use crate::usage::{UsageSnapshot, UsageWindow};

pub fn profile(id: &str) -> Profile {
    Profile { id: id.to_string(), name: format!("{id} operator"), email: format!("{id}@example.com") }
}

pub fn auth_file(access_token: &str, refresh_token: &str) -> AuthFile {
    AuthFile {
        tokens: AuthTokens {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            id_token: String::new(),
            account_id: "acct-test".to_string(),
            last_refresh_time: 0,
        },
    }
}

pub fn required_mounts(workspace_host: &str) -> RequiredMounts {
    RequiredMounts {
        workspace_bind: BindMount::new(workspace_host, "/workspace"),
        mirror_bind: BindMount::new(workspace_host, workspace_host),
        config_bind: BindMount::new("/home/test/.si", "/root/.si"),
        dev_root_bind: BindMount::new("/home/test/dev", "/dev-root"),
        vault_bind: None,
        home_volume: "si-codex-test-home".to_string(),
        skills_volume: "si-codex-skills".to_string(),
        cli_state_volume: "si-codex-test-state".to_string(),
        env: BTreeMap::new(),
        workdir: "/workspace".to_string(),
    }
}

pub fn observed_matching(required: &RequiredMounts) -> ObservedContainer {
    ObservedContainer {
        binds: required.binds().into_iter().cloned().collect(),
        volumes: required.volumes().iter().map(|s| s.to_string()).collect(),
        env: required.env.clone(),
        workdir: required.workdir.clone(),
    }
}

pub fn usage_snapshot(five_hour_used: f64, weekly_used: f64, fetched_at: u64) -> UsageSnapshot {
    let window = |used: f64| UsageWindow {
        used_percent: used,
        window_seconds: 18_000,
        resets_at: Some(fetched_at + 3_600),
        resets_after_seconds: None,
    };
    UsageSnapshot { five_hour: window(five_hour_used), weekly: window(weekly_used), fetched_at }
}

/// A fixed, in-memory [`Settings`] for tests, rooted at a caller-provided
/// temp directory instead of `$HOME`.
pub struct FakeSettings {
    pub profiles: Vec<Profile>,
    pub home: PathBuf,
}

impl FakeSettings {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { profiles: vec![profile("alice")], home: home.into() }
    }
}

impl Settings for FakeSettings {
    fn profile(&self, id: &str) -> Option<Profile> {
        self.profiles.iter().find(|p| p.id == id).cloned()
    }

    fn profiles(&self) -> Vec<Profile> {
        self.profiles.clone()
    }

    fn image_name(&self) -> String {
        "si-codex:latest".to_string()
    }

    fn network_name(&self) -> String {
        "si-codex".to_string()
    }

    fn workspace_host_path(&self) -> PathBuf {
        self.home.join("workspace")
    }

    fn host_config_dir(&self) -> PathBuf {
        self.home.join("config")
    }

    fn dev_root(&self) -> PathBuf {
        self.home.join("dev")
    }

    fn vault_env_file(&self) -> Option<PathBuf> {
        None
    }

    fn usage_api_url(&self) -> String {
        "https://usage.example.com/v1/usage".to_string()
    }

    fn auth_token_endpoint(&self) -> String {
        "https://auth.example.com/oauth/token".to_string()
    }

    fn model_name(&self) -> String {
        "codex-test".to_string()
    }

    fn reasoning_effort(&self) -> String {
        "medium".to_string()
    }

    fn mcp_sidecar_url(&self) -> Option<String> {
        None
    }

    fn logs_dir_override(&self) -> Option<PathBuf> {
        None
    }

    fn warmup_autostart_marker_override(&self) -> Option<PathBuf> {
        None
    }

    fn warmup_disabled_marker_override(&self) -> Option<PathBuf> {
        None
    }
}
