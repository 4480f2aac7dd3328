// SPDX-License-Identifier: MIT

//! TOML-backed [`si_core::Settings`] with `SI_*` environment-variable
//! overrides. Settings persistence is an external collaborator rather
//! than a core-crate concern — this is the one place that file format
//! is decided.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use si_core::{Error, Profile, Settings};

#[derive(Debug, Clone, Deserialize, Default)]
struct ProfileEntry {
    name: String,
    email: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    workspace: Option<String>,
    #[serde(default)]
    host_config_dir: Option<String>,
    #[serde(default)]
    dev_root: Option<String>,
    #[serde(default)]
    vault_env_file: Option<String>,
    #[serde(default)]
    usage_api_url: Option<String>,
    #[serde(default)]
    auth_token_endpoint: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    reasoning_effort: Option<String>,
    #[serde(default)]
    mcp_sidecar_url: Option<String>,
}

const DEFAULT_IMAGE: &str = "si-codex:latest";
const DEFAULT_NETWORK: &str = "si-codex";
const DEFAULT_USAGE_API_URL: &str = "https://chatgpt.com/backend-api/codex/usage";
const DEFAULT_AUTH_TOKEN_ENDPOINT: &str = "https://auth.openai.com/oauth/token";
const DEFAULT_MODEL: &str = "o3";
const DEFAULT_REASONING_EFFORT: &str = "high";

/// Config path: `$SI_CONFIG` override, else `<si_home>/config.toml`.
pub fn config_path(home: &std::path::Path) -> PathBuf {
    std::env::var("SI_CONFIG").map(PathBuf::from).unwrap_or_else(|_| home.join("config.toml"))
}

pub struct CliSettings {
    profiles: Vec<Profile>,
    raw: RawConfig,
}

impl CliSettings {
    /// Reads `config.toml` from `home` (or `$SI_CONFIG`). A missing file
    /// is not an error — it yields an empty profile set and every
    /// default above, all still overridable by environment variables.
    pub fn load(home: &std::path::Path) -> Result<Self, Error> {
        let path = config_path(home);
        let raw: RawConfig = match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|e| Error::fatal(format!("invalid config at {}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
            Err(e) => return Err(e.into()),
        };

        let mut profiles = Vec::new();
        for (id, entry) in &raw.profiles {
            profiles.push(Profile::new(id, entry.name.clone(), entry.email.clone())?);
        }
        profiles.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Self { profiles, raw })
    }

    fn env(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl Settings for CliSettings {
    fn profile(&self, id: &str) -> Option<Profile> {
        self.profiles.iter().find(|p| p.id == id).cloned()
    }

    fn profiles(&self) -> Vec<Profile> {
        self.profiles.clone()
    }

    fn image_name(&self) -> String {
        Self::env("SI_IMAGE").or_else(|| self.raw.image.clone()).unwrap_or_else(|| DEFAULT_IMAGE.to_string())
    }

    fn network_name(&self) -> String {
        Self::env("SI_NETWORK").or_else(|| self.raw.network.clone()).unwrap_or_else(|| DEFAULT_NETWORK.to_string())
    }

    fn workspace_host_path(&self) -> PathBuf {
        Self::env("SI_WORKSPACE")
            .or_else(|| self.raw.workspace.clone())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    fn host_config_dir(&self) -> PathBuf {
        Self::env("SI_HOST_CONFIG_DIR")
            .or_else(|| self.raw.host_config_dir.clone())
            .map(PathBuf::from)
            .unwrap_or_else(|| si_core::paths::si_home())
    }

    fn dev_root(&self) -> PathBuf {
        Self::env("SI_DEV_ROOT")
            .or_else(|| self.raw.dev_root.clone())
            .map(PathBuf::from)
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join("dev"))
    }

    fn vault_env_file(&self) -> Option<PathBuf> {
        Self::env("SI_VAULT_ENV_FILE").or_else(|| self.raw.vault_env_file.clone()).map(PathBuf::from)
    }

    fn usage_api_url(&self) -> String {
        Self::env("SI_USAGE_API_URL").or_else(|| self.raw.usage_api_url.clone()).unwrap_or_else(|| DEFAULT_USAGE_API_URL.to_string())
    }

    fn auth_token_endpoint(&self) -> String {
        Self::env("SI_AUTH_TOKEN_ENDPOINT")
            .or_else(|| self.raw.auth_token_endpoint.clone())
            .unwrap_or_else(|| DEFAULT_AUTH_TOKEN_ENDPOINT.to_string())
    }

    fn model_name(&self) -> String {
        Self::env("SI_MODEL").or_else(|| self.raw.model.clone()).unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    fn reasoning_effort(&self) -> String {
        Self::env("SI_REASONING_EFFORT").or_else(|| self.raw.reasoning_effort.clone()).unwrap_or_else(|| DEFAULT_REASONING_EFFORT.to_string())
    }

    fn mcp_sidecar_url(&self) -> Option<String> {
        Self::env("SI_MCP_SIDECAR_URL").or_else(|| self.raw.mcp_sidecar_url.clone())
    }

    fn logs_dir_override(&self) -> Option<PathBuf> {
        Self::env("SI_LOGS_DIR").map(PathBuf::from)
    }

    fn warmup_autostart_marker_override(&self) -> Option<PathBuf> {
        Self::env("SI_WARMUP_AUTOSTART_MARKER").map(PathBuf::from)
    }

    fn warmup_disabled_marker_override(&self) -> Option<PathBuf> {
        Self::env("SI_WARMUP_DISABLED_MARKER").map(PathBuf::from)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
