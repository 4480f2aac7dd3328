// SPDX-License-Identifier: MIT

//! The `Settings` trait: the seam between the core crates and whatever
//! concrete configuration format the CLI reads. `si-identity`,
//! `si-credentials`, `si-pane`, and `si-warmup` only ever consume this
//! trait — none of them knows that `si-cli` happens to implement it by
//! reading TOML plus environment variable overrides.

use std::path::PathBuf;

use crate::Profile;

/// Read-only configuration consumed by every core component. Implemented
/// in `si-cli` by a TOML-backed settings reader; core crates never see a
/// concrete file format.
pub trait Settings: Send + Sync {
    fn profile(&self, id: &str) -> Option<Profile>;
    fn profiles(&self) -> Vec<Profile>;

    /// Container image used for both long-lived and ephemeral containers.
    fn image_name(&self) -> String;
    fn network_name(&self) -> String;
    fn workspace_host_path(&self) -> PathBuf;

    /// Host directory mirrored into every container at a fixed path (this
    /// tool's own config directory, distinct from the agent's config).
    fn host_config_dir(&self) -> PathBuf;
    /// Host development root mounted into every container.
    fn dev_root(&self) -> PathBuf;
    /// Optional vault env-file mounted into every container when set.
    fn vault_env_file(&self) -> Option<PathBuf>;

    fn usage_api_url(&self) -> String;
    /// OAuth token endpoint used to exchange a refresh token for a new
    /// access/id token pair.
    fn auth_token_endpoint(&self) -> String;
    fn model_name(&self) -> String;
    fn reasoning_effort(&self) -> String;
    fn mcp_sidecar_url(&self) -> Option<String>;

    fn logs_dir_override(&self) -> Option<PathBuf>;
    fn warmup_autostart_marker_override(&self) -> Option<PathBuf>;
    fn warmup_disabled_marker_override(&self) -> Option<PathBuf>;
}
