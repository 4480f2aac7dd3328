// SPDX-License-Identifier: MIT

//! `DockerRuntime`: shells out to the `docker` binary, parsing its
//! JSON output (`docker inspect --format '{{json .}}'`).

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use si_core::{BindMount, Error, ObservedContainer};

use crate::{ContainerInfo, ContainerRuntime, ContainerSpec, Deadline, ExecOutput, ExecRequest, LabelSelector};

/// Docker-CLI-backed [`ContainerRuntime`]. Every call shells out to the
/// `docker` binary (overridable via `SI_DOCKER_BIN`) and is bounded by
/// the caller's [`Deadline`].
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    binary: String,
}

impl Default for DockerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerRuntime {
    pub fn new() -> Self {
        let binary = std::env::var("SI_DOCKER_BIN").unwrap_or_else(|_| "docker".to_string());
        Self { binary }
    }

    async fn run(&self, args: &[&str], deadline: Deadline) -> Result<String, Error> {
        let fut = Command::new(&self.binary).args(args).output();
        let output = tokio::time::timeout(deadline.as_duration(), fut)
            .await
            .map_err(|_| Error::transient(format!("docker {} timed out", args.first().unwrap_or(&""))))?
            .map_err(|e| Error::transient(format!("failed to exec docker: {e}")))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(classify_cli_failure(&stderr))
        }
    }

    async fn inspect_raw(&self, name: &str, deadline: Deadline) -> Result<Option<Value>, Error> {
        match self.run(&["inspect", "--format", "{{json .}}", name], deadline).await {
            Ok(raw) => {
                let value: Value = serde_json::from_str(&raw)
                    .map_err(|e| Error::fatal(format!("invalid docker inspect output for {name}: {e}")))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == si_core::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Docker CLI errors have no structured exit codes; classify by message
/// into the transient | not-found | fatal grouping.
fn classify_cli_failure(stderr: &str) -> Error {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("no such container")
        || lower.contains("no such object")
        || lower.contains("no such network")
        || lower.contains("no such volume")
        || lower.contains("no such file or directory")
    {
        Error::not_found(stderr.to_string())
    } else if lower.contains("cannot connect to the docker daemon")
        || lower.contains("connection refused")
        || lower.contains("timeout")
    {
        Error::transient(stderr.to_string())
    } else {
        Error::fatal(stderr.to_string())
    }
}

fn parse_observed(value: &Value) -> ObservedContainer {
    let mut binds = Vec::new();
    if let Some(raw_binds) = value.pointer("/HostConfig/Binds").and_then(Value::as_array) {
        for b in raw_binds {
            if let Some(s) = b.as_str() {
                let parts: Vec<&str> = s.splitn(3, ':').collect();
                if parts.len() >= 2 {
                    binds.push(BindMount::new(parts[0], parts[1]));
                }
            }
        }
    }

    let mut volumes = Vec::new();
    if let Some(mounts) = value.get("Mounts").and_then(Value::as_array) {
        for m in mounts {
            if m.get("Type").and_then(Value::as_str) == Some("volume") {
                if let Some(name) = m.get("Name").and_then(Value::as_str) {
                    volumes.push(name.to_string());
                }
            } else if let (Some(src), Some(dst)) =
                (m.get("Source").and_then(Value::as_str), m.get("Destination").and_then(Value::as_str))
            {
                // Bind mounts from Mounts (as opposed to HostConfig.Binds)
                // may appear here too; avoid duplicating entries already
                // captured from Binds.
                let already = binds.iter().any(|b: &BindMount| b.source == src && b.destination == dst);
                if !already && m.get("Type").and_then(Value::as_str) == Some("bind") {
                    binds.push(BindMount::new(src, dst));
                }
            }
        }
    }

    let mut env = BTreeMap::new();
    if let Some(raw_env) = value.pointer("/Config/Env").and_then(Value::as_array) {
        for e in raw_env {
            if let Some(s) = e.as_str() {
                if let Some((k, v)) = s.split_once('=') {
                    env.insert(k.to_string(), v.to_string());
                }
            }
        }
    }

    let workdir = value.pointer("/Config/WorkingDir").and_then(Value::as_str).unwrap_or("").to_string();

    ObservedContainer { binds, volumes, env, workdir }
}

fn parse_container_info(value: &Value) -> ContainerInfo {
    let name = value
        .get("Name")
        .and_then(Value::as_str)
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_default();
    let running = value.pointer("/State/Running").and_then(Value::as_bool).unwrap_or(false);
    let mut labels = BTreeMap::new();
    if let Some(raw_labels) = value.pointer("/Config/Labels").and_then(Value::as_object) {
        for (k, v) in raw_labels {
            if let Some(s) = v.as_str() {
                labels.insert(k.clone(), s.to_string());
            }
        }
    }
    ContainerInfo { name, running, labels, observed: parse_observed(value) }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn ensure_network(&self, name: &str, deadline: Deadline) -> Result<(), Error> {
        match self.run(&["network", "inspect", name], deadline).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == si_core::ErrorKind::NotFound => {
                self.run(&["network", "create", name], deadline).await.map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    async fn ensure_volume(&self, name: &str, deadline: Deadline) -> Result<(), Error> {
        match self.run(&["volume", "inspect", name], deadline).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == si_core::ErrorKind::NotFound => {
                self.run(&["volume", "create", name], deadline).await.map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    async fn create_container(&self, spec: &ContainerSpec, deadline: Deadline) -> Result<(), Error> {
        let mut args: Vec<String> = vec!["create".to_string(), "--name".to_string(), spec.name.clone()];

        for (k, v) in &spec.labels {
            args.push("--label".to_string());
            args.push(format!("{k}={v}"));
        }
        for bind in &spec.binds {
            args.push("-v".to_string());
            args.push(format!("{}:{}", bind.source, bind.destination));
        }
        for (volume, dest) in &spec.volumes {
            args.push("-v".to_string());
            args.push(format!("{volume}:{dest}"));
        }
        for (k, v) in &spec.env {
            args.push("-e".to_string());
            args.push(format!("{k}={v}"));
        }
        if !spec.workdir.is_empty() {
            args.push("-w".to_string());
            args.push(spec.workdir.clone());
        }
        if let Some(ref network) = spec.network {
            args.push("--network".to_string());
            args.push(network.clone());
        }
        if let Some(ref policy) = spec.restart_policy {
            args.push("--restart".to_string());
            args.push(policy.clone());
        }
        args.push(spec.image.clone());

        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&refs, deadline).await.map(|_| ())
    }

    async fn start(&self, name: &str, deadline: Deadline) -> Result<(), Error> {
        self.run(&["start", name], deadline).await.map(|_| ())
    }

    async fn stop(&self, name: &str, deadline: Deadline) -> Result<(), Error> {
        self.run(&["stop", name], deadline).await.map(|_| ())
    }

    async fn remove(&self, name: &str, force: bool, deadline: Deadline) -> Result<(), Error> {
        if force {
            self.run(&["rm", "-f", name], deadline).await.map(|_| ())
        } else {
            self.run(&["rm", name], deadline).await.map(|_| ())
        }
    }

    async fn inspect_by_name(&self, name: &str, deadline: Deadline) -> Result<Option<ContainerInfo>, Error> {
        Ok(self.inspect_raw(name, deadline).await?.map(|v| parse_container_info(&v)))
    }

    async fn list(&self, selector: &LabelSelector, deadline: Deadline) -> Result<Vec<ContainerInfo>, Error> {
        let mut args = vec!["ps".to_string(), "-a".to_string(), "--format".to_string(), "{{.Names}}".to_string()];
        for (k, v) in &selector.labels {
            args.push("--filter".to_string());
            args.push(format!("label={k}={v}"));
        }
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let raw = self.run(&refs, deadline).await?;

        let mut out = Vec::new();
        for name in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(info) = self.inspect_by_name(name, deadline).await? {
                if selector.matches(&info.labels) {
                    out.push(info);
                }
            }
        }
        Ok(out)
    }

    async fn exec(&self, request: ExecRequest<'_>, deadline: Deadline) -> Result<ExecOutput, Error> {
        let mut args: Vec<String> = vec!["exec".to_string()];
        if request.stdin.is_some() {
            args.push("-i".to_string());
        }
        if request.tty {
            args.push("-t".to_string());
        }
        if let Some(ref user) = request.user {
            args.push("-u".to_string());
            args.push(user.clone());
        }
        if let Some(ref workdir) = request.workdir {
            args.push("-w".to_string());
            args.push(workdir.clone());
        }
        for (k, v) in &request.env {
            args.push("-e".to_string());
            args.push(format!("{k}={v}"));
        }
        args.push(request.container.to_string());
        args.extend(request.command.iter().cloned());

        let mut command = Command::new(&self.binary);
        command.args(&args);
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        if request.stdin.is_some() {
            command.stdin(Stdio::piped());
        } else {
            command.stdin(Stdio::null());
        }

        let mut child = command.spawn().map_err(|e| Error::transient(format!("failed to exec docker: {e}")))?;
        if let Some(bytes) = request.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(&bytes).await.map_err(|e| Error::transient(e.to_string()))?;
            }
        }

        let output = tokio::time::timeout(deadline.as_duration(), child.wait_with_output())
            .await
            .map_err(|_| Error::transient("docker exec timed out".to_string()))?
            .map_err(|e| Error::transient(format!("docker exec failed: {e}")))?;

        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn copy_file_in(
        &self,
        container: &str,
        host_path: &Path,
        container_path: &str,
        deadline: Deadline,
    ) -> Result<(), Error> {
        let host = host_path.to_string_lossy().to_string();
        let dest = format!("{container}:{container_path}");
        self.run(&["cp", &host, &dest], deadline).await.map(|_| ())
    }

    async fn read_file_out(
        &self,
        container: &str,
        container_path: &str,
        deadline: Deadline,
    ) -> Result<Vec<u8>, Error> {
        let request = ExecRequest::new(container, vec!["cat".to_string(), container_path.to_string()]);
        let output = self.exec(request, deadline).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(classify_cli_failure(&stderr))
        }
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
