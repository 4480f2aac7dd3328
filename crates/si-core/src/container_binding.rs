// SPDX-License-Identifier: MIT

//! `ContainerBinding`: the (profile, container) pair at steady state, and
//! the pure mount-parity decidability check.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One bind mount: a host source path onto a container destination path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindMount {
    pub source: String,
    pub destination: String,
}

impl BindMount {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self { source: source.into(), destination: destination.into() }
    }
}

/// The mount/env/workdir set a bound container must carry: workspace at
/// `/workspace`, the same path mirrored at its absolute host path, the
/// host config dir, the host dev root, an optional vault env-file, and
/// three named volumes (home, shared skills, CLI state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredMounts {
    pub workspace_bind: BindMount,
    pub mirror_bind: BindMount,
    pub config_bind: BindMount,
    pub dev_root_bind: BindMount,
    pub vault_bind: Option<BindMount>,
    pub home_volume: String,
    pub skills_volume: String,
    pub cli_state_volume: String,
    pub env: BTreeMap<String, String>,
    pub workdir: String,
}

impl RequiredMounts {
    /// All required bind mounts as a flat list, including the optional
    /// vault mount when present.
    pub fn binds(&self) -> Vec<&BindMount> {
        let mut binds =
            vec![&self.workspace_bind, &self.mirror_bind, &self.config_bind, &self.dev_root_bind];
        if let Some(ref vault) = self.vault_bind {
            binds.push(vault);
        }
        binds
    }

    pub fn volumes(&self) -> [&str; 3] {
        [&self.home_volume, &self.skills_volume, &self.cli_state_volume]
    }
}

/// What `inspect` actually returned for a running container: the shape
/// `workspace_matches` checks against `RequiredMounts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedContainer {
    pub binds: Vec<BindMount>,
    pub volumes: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub workdir: String,
}

/// True iff every required bind mount destination+source pair, every
/// required named volume, every required env pair, and `WorkingDir` are
/// present in `observed`. Order
/// does not matter; extra mounts/env beyond the required set do not cause
/// a mismatch (the container may carry operator-added bind mounts too).
pub fn workspace_matches(observed: &ObservedContainer, required: &RequiredMounts) -> bool {
    let binds_ok = required.binds().into_iter().all(|needed| observed.binds.contains(needed));
    let volumes_ok = required.volumes().iter().all(|v| observed.volumes.iter().any(|ov| ov == v));
    let env_ok = required.env.iter().all(|(k, v)| observed.env.get(k) == Some(v));
    let workdir_ok = observed.workdir == required.workdir;
    binds_ok && volumes_ok && env_ok && workdir_ok
}

/// The (profile, container) pair at steady state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerBinding {
    pub container_name: String,
    pub profile_id: String,
    pub workspace_host: String,
    pub required: RequiredMounts,
}

#[cfg(test)]
#[path = "container_binding_tests.rs"]
mod tests;
