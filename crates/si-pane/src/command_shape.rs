// SPDX-License-Identifier: MIT

//! The "command shape": a stable string for the launch command with the
//! host cwd replaced by a placeholder, so the hash is unaffected by which
//! directory the operator happened to launch from.

use sha2::{Digest, Sha256};

/// Placeholder substituted for the host cwd before hashing.
pub const HOST_CWD_PLACEHOLDER: &str = "<host-cwd>";

/// The `docker` binary the exec wrapper shells out to, overridable via
/// `SI_DOCKER_BIN` (same override `si_runtime::DockerRuntime` honors) —
/// the tmux session itself runs on the host, so the launch command must
/// name the container explicitly.
fn docker_bin() -> String {
    std::env::var("SI_DOCKER_BIN").unwrap_or_else(|_| "docker".to_string())
}

/// Builds the launch command for a profile: a `docker exec -it` into
/// `container_name` that `cd`s to `container_cwd`, execs the agent CLI,
/// then drops to an interactive shell so the pane survives agent
/// termination. This whole string is what tmux runs as the pane's
/// command — tmux itself is host-side, so the container boundary is
/// crossed here, not by tmux.
pub fn primary_command(container_name: &str, agent_binary: &str, container_cwd: &str, model: &str, reasoning_effort: &str) -> String {
    let inner = format!("cd {container_cwd} && {agent_binary} --model {model} --reasoning-effort {reasoning_effort}; exec $SHELL");
    format!("{} exec -it {container_name} sh -c {}", docker_bin(), shell_quote(&inner))
}

/// As [`primary_command`], but resuming a prior agent session id.
pub fn resume_command(container_name: &str, agent_binary: &str, container_cwd: &str, session_id: &str) -> String {
    let inner = format!("cd {container_cwd} && {agent_binary} resume {session_id}; exec $SHELL");
    format!("{} exec -it {container_name} sh -c {}", docker_bin(), shell_quote(&inner))
}

/// Single-quotes `value` for embedding in a shell command line, escaping
/// any embedded single quotes the POSIX way (`'\''`).
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// The stable "shape" of a launch command: `host_cwd` replaced by
/// [`HOST_CWD_PLACEHOLDER`] wherever it appears, so the same logical
/// command launched from two different directories hashes identically.
pub fn command_shape(command: &str, host_cwd: &str) -> String {
    if host_cwd.is_empty() {
        command.to_string()
    } else {
        command.replace(host_cwd, HOST_CWD_PLACEHOLDER)
    }
}

/// Hex-encoded SHA-256 of [`command_shape`], persisted as a tmux session
/// option (`PaneSession::command_shape_hash`).
pub fn command_shape_hash(command: &str, host_cwd: &str) -> String {
    let shape = command_shape(command, host_cwd);
    let digest = Sha256::digest(shape.as_bytes());
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
#[path = "command_shape_tests.rs"]
mod tests;
