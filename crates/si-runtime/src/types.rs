// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use si_core::{BindMount, ObservedContainer};

/// A container creation request. `binds` and `volumes` become the bind
/// mounts / named-volume mounts the mount-parity check in `si-identity`
/// later verifies against via [`ObservedContainer`].
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub labels: BTreeMap<String, String>,
    pub binds: Vec<BindMount>,
    /// `(volume_name, destination)` pairs.
    pub volumes: Vec<(String, String)>,
    pub env: BTreeMap<String, String>,
    pub workdir: String,
    pub network: Option<String>,
    /// Docker restart policy, e.g. `"unless-stopped"`.
    pub restart_policy: Option<String>,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            labels: BTreeMap::new(),
            binds: Vec::new(),
            volumes: Vec::new(),
            env: BTreeMap::new(),
            workdir: String::new(),
            network: None,
            restart_policy: None,
        }
    }
}

/// The result of an `inspect_by_name` / `list` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerInfo {
    pub name: String,
    pub running: bool,
    pub labels: BTreeMap<String, String>,
    pub observed: ObservedContainer,
}

/// A label-value selector. The core only ever selects by the fixed
/// component label and optional profile label.
#[derive(Debug, Clone, Default)]
pub struct LabelSelector {
    pub labels: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.labels.iter().all(|(k, v)| labels.get(k) == Some(v))
    }
}

/// A one-off exec into a running (or ephemeral) container.
#[derive(Debug, Clone)]
pub struct ExecRequest<'a> {
    pub container: &'a str,
    pub command: Vec<String>,
    pub user: Option<String>,
    pub workdir: Option<String>,
    pub env: BTreeMap<String, String>,
    pub tty: bool,
    pub stdin: Option<Vec<u8>>,
}

impl<'a> ExecRequest<'a> {
    pub fn new(container: &'a str, command: Vec<String>) -> Self {
        Self { container, command, user: None, workdir: None, env: BTreeMap::new(), tty: false, stdin: None }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
