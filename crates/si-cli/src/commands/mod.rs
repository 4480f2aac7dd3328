// SPDX-License-Identifier: MIT

//! Command handlers for the operator-facing command surface.

pub mod list;
pub mod login;
pub mod run;
pub mod spawn;
pub mod status;
pub mod warmup;

use std::sync::Arc;

use si_credentials::{CredentialManager, OAuthTokenClient};
use si_identity::IdentityReconciler;
use si_runtime::{ContainerRuntime, DockerRuntime};

use crate::settings::CliSettings;

/// Everything a command handler needs, wired once in `main` and shared
/// by reference across handlers.
pub struct Context {
    pub settings: Arc<CliSettings>,
    pub home: std::path::PathBuf,
    pub runtime: Arc<dyn ContainerRuntime>,
}

impl Context {
    pub fn new(settings: CliSettings, home: std::path::PathBuf) -> Self {
        Self { settings: Arc::new(settings), home, runtime: Arc::new(DockerRuntime::new()) }
    }

    pub fn identity_reconciler(&self) -> IdentityReconciler<CliSettings> {
        IdentityReconciler::new(self.settings.clone(), self.home.clone(), self.runtime.clone())
    }

    pub fn credential_manager(&self) -> CredentialManager<CliSettings, OAuthTokenClient> {
        let client = OAuthTokenClient::new(self.settings.auth_token_endpoint());
        CredentialManager::new(self.settings.clone(), self.home.clone(), self.runtime.clone(), client, None)
    }

    pub fn now(&self) -> u64 {
        std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
    }

    /// Resolves a profile argument: an explicit id, or the sole
    /// configured profile when there is exactly one and none was named.
    pub fn resolve_profile(&self, explicit: Option<&str>) -> anyhow::Result<si_core::Profile> {
        if let Some(id) = explicit {
            return self.settings.profile(id).ok_or_else(|| anyhow::anyhow!("unknown profile '{id}'"));
        }
        let mut profiles = self.settings.profiles();
        match profiles.len() {
            1 => Ok(profiles.remove(0)),
            0 => Err(anyhow::anyhow!("no profiles configured; add one to config.toml")),
            _ => Err(anyhow::anyhow!("multiple profiles configured; specify one with --profile")),
        }
    }
}
