// SPDX-License-Identifier: MIT

//! The binding algorithm: container lookup with ambiguity resolution,
//! mount-parity check, recreate-on-drift with the TTY-attach vault
//! exception, and the create path.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use si_core::{paths, workspace_matches, BindMount, ContainerBinding, Error, ObservedContainer, Profile, RequiredMounts, Settings};
use si_runtime::{ContainerInfo, ContainerRuntime, ContainerSpec, Deadline, LabelSelector};

use crate::seeding::{seed_config_and_auth, seed_git_identity};
use crate::{agent_home, LABEL_COMPONENT, LABEL_COMPONENT_VALUE, LABEL_NAME, LABEL_PROFILE};

const CONTAINER_WORKSPACE_PATH: &str = "/workspace";
const CONTAINER_CONFIG_PATH: &str = "/root/.si";
const CONTAINER_DEV_ROOT_PATH: &str = "/dev-root";
const CONTAINER_VAULT_PATH: &str = "/vault/.env";

/// Whether the caller reconciling this binding is in an interactive
/// TTY-attach path (the vault-only exception applies only here) or a
/// background path (status fanout, warmup) where drift is always fully
/// repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachContext {
    TtyAttach,
    Background,
}

/// The result of [`IdentityReconciler::bind`]: the steady-state binding,
/// plus an optional operator-facing remediation hint when drift was
/// detected but deliberately not repaired (the vault-only TTY exception).
#[derive(Debug, Clone)]
pub struct BindOutcome {
    pub binding: ContainerBinding,
    pub remediation: Option<String>,
}

/// Binds profiles to containers, repairs mount drift, and seeds
/// credentials and git identity. One instance is shared across every
/// profile; all state it needs comes from `Settings` and the injected
/// `ContainerRuntime`.
pub struct IdentityReconciler<S: Settings> {
    settings: Arc<S>,
    home: PathBuf,
    runtime: Arc<dyn ContainerRuntime>,
}

impl<S: Settings> IdentityReconciler<S> {
    /// `home` is the si state root (normally `paths::si_home()`), injected
    /// for the same testability reason as `CredentialManager::new`.
    pub fn new(settings: Arc<S>, home: PathBuf, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { settings, home, runtime }
    }

    /// The required mount/env/workdir set for a profile's container.
    pub fn required_mounts(&self, profile: &Profile) -> RequiredMounts {
        let workspace_host = self.settings.workspace_host_path().to_string_lossy().into_owned();
        RequiredMounts {
            workspace_bind: BindMount::new(workspace_host.clone(), CONTAINER_WORKSPACE_PATH),
            mirror_bind: BindMount::new(workspace_host.clone(), workspace_host),
            config_bind: BindMount::new(self.settings.host_config_dir().to_string_lossy().into_owned(), CONTAINER_CONFIG_PATH),
            dev_root_bind: BindMount::new(self.settings.dev_root().to_string_lossy().into_owned(), CONTAINER_DEV_ROOT_PATH),
            vault_bind: self
                .settings
                .vault_env_file()
                .map(|p| BindMount::new(p.to_string_lossy().into_owned(), CONTAINER_VAULT_PATH)),
            home_volume: format!("si-codex-{}-home", profile.id),
            skills_volume: "si-codex-skills".to_string(),
            cli_state_volume: format!("si-codex-{}-state", profile.id),
            env: BTreeMap::new(),
            workdir: CONTAINER_WORKSPACE_PATH.to_string(),
        }
    }

    /// Binds `profile` to a running container: lookup/ambiguity
    /// resolution, start-if-stopped, mount-parity check, recreate-on-drift
    /// (with the TTY-attach vault exception), and credential/git seeding.
    pub async fn bind(&self, profile: &Profile, attach: AttachContext, deadline: Deadline) -> Result<BindOutcome, Error> {
        let required = self.required_mounts(profile);
        let container_name = profile.container_name();

        let selector = LabelSelector::new().with(LABEL_COMPONENT, LABEL_COMPONENT_VALUE).with(LABEL_PROFILE, profile.id.as_str());
        let candidates = self.runtime.list(&selector, deadline).await?;
        let chosen = choose_candidate(&candidates, &container_name);

        let Some(mut info) = chosen else {
            let binding = self.create(profile, &container_name, &required, deadline).await?;
            return Ok(BindOutcome { binding, remediation: None });
        };

        if !info.running {
            self.runtime.start(&info.name, deadline).await?;
            info = self
                .runtime
                .inspect_by_name(&info.name, deadline)
                .await?
                .ok_or_else(|| Error::not_found(format!("container {} disappeared immediately after start", info.name)))?;
        }

        if workspace_matches(&info.observed, &required) {
            self.seed(&info.name, profile, deadline).await;
            return Ok(BindOutcome { binding: make_binding(&info.name, profile, &required), remediation: None });
        }

        if attach == AttachContext::TtyAttach && missing_only_vault(&info.observed, &required) {
            tracing::warn!(
                container = %info.name,
                profile = %profile.id,
                "vault env-file mount missing; keeping container under the TTY-attach exception"
            );
            self.seed(&info.name, profile, deadline).await;
            let hint = format!(
                "container {} is missing its vault env-file mount; run a non-attach command (e.g. `si status`) to recreate it",
                info.name
            );
            return Ok(BindOutcome { binding: make_binding(&info.name, profile, &required), remediation: Some(hint) });
        }

        tracing::warn!(container = %info.name, profile = %profile.id, "required-mount drift detected; recreating container");
        self.runtime.remove(&info.name, true, deadline).await?;
        let binding = self.create(profile, &container_name, &required, deadline).await?;
        Ok(BindOutcome { binding, remediation: None })
    }

    async fn create(
        &self,
        profile: &Profile,
        container_name: &str,
        required: &RequiredMounts,
        deadline: Deadline,
    ) -> Result<ContainerBinding, Error> {
        self.runtime.ensure_network(&self.settings.network_name(), deadline).await?;
        for volume in required.volumes() {
            self.runtime.ensure_volume(volume, deadline).await?;
        }

        let home = agent_home();
        let mut spec = ContainerSpec::new(container_name, self.settings.image_name());
        spec.labels.insert(LABEL_COMPONENT.to_string(), LABEL_COMPONENT_VALUE.to_string());
        spec.labels.insert(LABEL_NAME.to_string(), profile.id.clone());
        spec.labels.insert(LABEL_PROFILE.to_string(), profile.id.clone());
        spec.binds = required.binds().into_iter().cloned().collect();
        spec.volumes = vec![
            (required.home_volume.clone(), home.clone()),
            (required.skills_volume.clone(), format!("{home}/skills")),
            (required.cli_state_volume.clone(), format!("{home}/.cli-state")),
        ];
        spec.env = required.env.clone();
        spec.workdir = required.workdir.clone();
        spec.network = Some(self.settings.network_name());
        spec.restart_policy = Some("unless-stopped".to_string());

        self.runtime.create_container(&spec, deadline).await?;
        self.runtime.start(container_name, deadline).await?;
        self.seed(container_name, profile, deadline).await;

        Ok(make_binding(container_name, profile, required))
    }

    async fn seed(&self, container_name: &str, profile: &Profile, deadline: Deadline) {
        let config_host = self.settings.host_config_dir().join("config.toml");
        let auth_host = paths::auth_file_path(&self.home, &profile.id);
        seed_config_and_auth(self.runtime.as_ref(), container_name, &config_host, &auth_host, deadline).await;
        seed_git_identity(self.runtime.as_ref(), container_name, deadline).await;
    }
}

/// Name-equals-target wins, then any running container, then the first
/// by name order; the caller is expected to have already warned when
/// `candidates.len() > 1`.
fn choose_candidate(candidates: &[ContainerInfo], target_name: &str) -> Option<ContainerInfo> {
    if candidates.is_empty() {
        return None;
    }
    if candidates.len() > 1 {
        tracing::warn!(count = candidates.len(), target = target_name, "multiple containers match profile label");
    }

    if let Some(exact) = candidates.iter().find(|c| c.name == target_name) {
        return Some(exact.clone());
    }
    if let Some(running) = candidates.iter().find(|c| c.running) {
        return Some(running.clone());
    }
    let mut by_name: Vec<&ContainerInfo> = candidates.iter().collect();
    by_name.sort_by(|a, b| a.name.cmp(&b.name));
    by_name.first().map(|c| (*c).clone())
}

/// True iff the vault bind mount is the *only* thing missing from
/// `observed` relative to `required`.
fn missing_only_vault(observed: &ObservedContainer, required: &RequiredMounts) -> bool {
    let Some(vault) = required.vault_bind.as_ref() else {
        return false;
    };
    if observed.binds.contains(vault) {
        return false;
    }
    let mut sans_vault = required.clone();
    sans_vault.vault_bind = None;
    workspace_matches(observed, &sans_vault)
}

fn make_binding(container_name: &str, profile: &Profile, required: &RequiredMounts) -> ContainerBinding {
    ContainerBinding {
        container_name: container_name.to_string(),
        profile_id: profile.id.clone(),
        workspace_host: required.workspace_bind.source.clone(),
        required: required.clone(),
    }
}

#[cfg(test)]
#[path = "binding_tests.rs"]
mod tests;
