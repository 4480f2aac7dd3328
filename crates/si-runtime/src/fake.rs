// SPDX-License-Identifier: MIT

//! In-memory [`ContainerRuntime`] fake, backing every upper-layer unit
//! test.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;

use si_core::{Error, ObservedContainer};

use crate::{ContainerInfo, ContainerRuntime, ContainerSpec, Deadline, ExecOutput, ExecRequest, LabelSelector};

#[derive(Debug, Clone, Default)]
struct FakeContainer {
    info: ContainerInfo,
    files: BTreeMap<String, Vec<u8>>,
}

/// An in-memory runtime: networks/volumes are just name sets, containers
/// are a `HashMap` keyed by name. `exec` never actually runs a command —
/// tests install canned responses via [`FakeRuntime::set_exec_response`].
#[derive(Default)]
pub struct FakeRuntime {
    networks: Mutex<Vec<String>>,
    volumes: Mutex<Vec<String>>,
    containers: Mutex<BTreeMap<String, FakeContainer>>,
    exec_responses: Mutex<BTreeMap<String, ExecOutput>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preinstall a container as if `create_container` + `start` had
    /// already run, for tests that start mid-scenario.
    pub fn seed_container(&self, info: ContainerInfo) {
        let name = info.name.clone();
        self.containers.lock().insert(name, FakeContainer { info, files: BTreeMap::new() });
    }

    pub fn seed_file(&self, container: &str, path: &str, contents: &[u8]) {
        if let Some(c) = self.containers.lock().get_mut(container) {
            c.files.insert(path.to_string(), contents.to_vec());
        }
    }

    /// Key exec responses by the joined command string, e.g. `"cat /x"`.
    pub fn set_exec_response(&self, command_key: &str, output: ExecOutput) {
        self.exec_responses.lock().insert(command_key.to_string(), output);
    }

    pub fn networks(&self) -> Vec<String> {
        self.networks.lock().clone()
    }

    pub fn volumes(&self) -> Vec<String> {
        self.volumes.lock().clone()
    }

    pub fn container_names(&self) -> Vec<String> {
        self.containers.lock().keys().cloned().collect()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn ensure_network(&self, name: &str, _deadline: Deadline) -> Result<(), Error> {
        let mut networks = self.networks.lock();
        if !networks.iter().any(|n| n == name) {
            networks.push(name.to_string());
        }
        Ok(())
    }

    async fn ensure_volume(&self, name: &str, _deadline: Deadline) -> Result<(), Error> {
        let mut volumes = self.volumes.lock();
        if !volumes.iter().any(|v| v == name) {
            volumes.push(name.to_string());
        }
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec, _deadline: Deadline) -> Result<(), Error> {
        let observed = ObservedContainer {
            binds: spec.binds.clone(),
            volumes: spec.volumes.iter().map(|(v, _)| v.clone()).collect(),
            env: spec.env.clone(),
            workdir: spec.workdir.clone(),
        };
        let info = ContainerInfo { name: spec.name.clone(), running: false, labels: spec.labels.clone(), observed };
        self.containers.lock().insert(spec.name.clone(), FakeContainer { info, files: BTreeMap::new() });
        Ok(())
    }

    async fn start(&self, name: &str, _deadline: Deadline) -> Result<(), Error> {
        let mut containers = self.containers.lock();
        let c = containers.get_mut(name).ok_or_else(|| Error::not_found(name.to_string()))?;
        c.info.running = true;
        Ok(())
    }

    async fn stop(&self, name: &str, _deadline: Deadline) -> Result<(), Error> {
        let mut containers = self.containers.lock();
        let c = containers.get_mut(name).ok_or_else(|| Error::not_found(name.to_string()))?;
        c.info.running = false;
        Ok(())
    }

    async fn remove(&self, name: &str, _force: bool, _deadline: Deadline) -> Result<(), Error> {
        self.containers.lock().remove(name).ok_or_else(|| Error::not_found(name.to_string()))?;
        Ok(())
    }

    async fn inspect_by_name(&self, name: &str, _deadline: Deadline) -> Result<Option<ContainerInfo>, Error> {
        Ok(self.containers.lock().get(name).map(|c| c.info.clone()))
    }

    async fn list(&self, selector: &LabelSelector, _deadline: Deadline) -> Result<Vec<ContainerInfo>, Error> {
        Ok(self
            .containers
            .lock()
            .values()
            .filter(|c| selector.matches(&c.info.labels))
            .map(|c| c.info.clone())
            .collect())
    }

    async fn exec(&self, request: ExecRequest<'_>, _deadline: Deadline) -> Result<ExecOutput, Error> {
        if !self.containers.lock().contains_key(request.container) {
            return Err(Error::not_found(request.container.to_string()));
        }
        let key = request.command.join(" ");
        Ok(self.exec_responses.lock().get(&key).cloned().unwrap_or_default())
    }

    async fn copy_file_in(
        &self,
        container: &str,
        host_path: &Path,
        container_path: &str,
        _deadline: Deadline,
    ) -> Result<(), Error> {
        let contents = std::fs::read(host_path)?;
        let mut containers = self.containers.lock();
        let c = containers.get_mut(container).ok_or_else(|| Error::not_found(container.to_string()))?;
        c.files.insert(container_path.to_string(), contents);
        Ok(())
    }

    async fn read_file_out(&self, container: &str, container_path: &str, _deadline: Deadline) -> Result<Vec<u8>, Error> {
        let containers = self.containers.lock();
        let c = containers.get(container).ok_or_else(|| Error::not_found(container.to_string()))?;
        c.files
            .get(container_path)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{container_path} not found in {container}")))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
