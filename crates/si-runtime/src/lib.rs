// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! si-runtime: the Container Runtime Adapter.
//!
//! A thin, command-oriented view of a container engine. Every other
//! component (`si-identity`, `si-pane`, `si-warmup`) consumes the
//! [`ContainerRuntime`] trait rather than shelling out to `docker` itself.

mod deadline;
mod docker;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use deadline::Deadline;
pub use docker::DockerRuntime;
pub use types::{ContainerInfo, ContainerSpec, ExecOutput, ExecRequest, LabelSelector};

use async_trait::async_trait;
use std::path::Path;

use si_core::Error;

/// Capability set for a container engine, injected into every upper-layer
/// component. All operations carry a [`Deadline`]; errors classify into
/// `si_core::Error::{Transient, NotFound, Fatal}` once, at this boundary.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn ensure_network(&self, name: &str, deadline: Deadline) -> Result<(), Error>;
    async fn ensure_volume(&self, name: &str, deadline: Deadline) -> Result<(), Error>;
    async fn create_container(&self, spec: &ContainerSpec, deadline: Deadline) -> Result<(), Error>;
    async fn start(&self, name: &str, deadline: Deadline) -> Result<(), Error>;
    async fn stop(&self, name: &str, deadline: Deadline) -> Result<(), Error>;
    async fn remove(&self, name: &str, force: bool, deadline: Deadline) -> Result<(), Error>;

    /// `None` when no container with this name exists — distinct from an
    /// inspect error.
    async fn inspect_by_name(
        &self,
        name: &str,
        deadline: Deadline,
    ) -> Result<Option<ContainerInfo>, Error>;

    async fn list(&self, selector: &LabelSelector, deadline: Deadline) -> Result<Vec<ContainerInfo>, Error>;

    async fn exec(&self, request: ExecRequest<'_>, deadline: Deadline) -> Result<ExecOutput, Error>;

    async fn copy_file_in(
        &self,
        container: &str,
        host_path: &Path,
        container_path: &str,
        deadline: Deadline,
    ) -> Result<(), Error>;

    /// Returns `Error::NotFound` when the file was never written inside
    /// the container (the adapter's "no such file" sentinel), distinct
    /// from any other read failure.
    async fn read_file_out(
        &self,
        container: &str,
        container_path: &str,
        deadline: Deadline,
    ) -> Result<Vec<u8>, Error>;
}
