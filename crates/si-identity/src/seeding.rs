// SPDX-License-Identifier: MIT

//! Config/auth/git-identity seeding. Every failure here is a warning,
//! never fatal — a container with unseeded credentials is still a
//! container the rest of the system can use; the operator will notice a
//! failed login on next auth check.

use std::path::Path;
use std::time::Duration;

use si_core::Error;
use si_runtime::{ContainerRuntime, Deadline, ExecRequest};

use crate::{agent_home, AGENT_USER};

const PRIVILEGED_SEED_DIR: &str = "/root/.codex";

fn agent_seed_dir() -> String {
    format!("{}/.codex", agent_home())
}

/// Copies `config.toml` and `auth.json` into both the privileged user's
/// home and the unprivileged agent user's home. A failure seeding one
/// target does not stop the other from being attempted.
pub async fn seed_config_and_auth(
    runtime: &dyn ContainerRuntime,
    container_name: &str,
    config_host_path: &Path,
    auth_host_path: &Path,
    deadline: Deadline,
) {
    let targets: [(String, Option<&str>); 2] =
        [(PRIVILEGED_SEED_DIR.to_string(), None), (agent_seed_dir(), Some(AGENT_USER))];

    for (dir, owner) in targets {
        if let Err(e) =
            seed_one_target(runtime, container_name, &dir, owner, config_host_path, auth_host_path, deadline).await
        {
            tracing::warn!(container = container_name, dir = %dir, error = %e, "seeding config/auth into container failed");
        }
    }
}

async fn seed_one_target(
    runtime: &dyn ContainerRuntime,
    container_name: &str,
    dir: &str,
    owner: Option<&str>,
    config_host_path: &Path,
    auth_host_path: &Path,
    deadline: Deadline,
) -> Result<(), Error> {
    runtime
        .exec(ExecRequest::new(container_name, vec!["mkdir".to_string(), "-p".to_string(), dir.to_string()]), deadline)
        .await?;

    if config_host_path.exists() {
        runtime.copy_file_in(container_name, config_host_path, &format!("{dir}/config.toml"), deadline).await?;
    }
    if auth_host_path.exists() {
        runtime.copy_file_in(container_name, auth_host_path, &format!("{dir}/auth.json"), deadline).await?;
    }

    if let Some(user) = owner {
        let owner_spec = format!("{user}:{user}");
        runtime
            .exec(
                ExecRequest::new(container_name, vec!["chown".to_string(), "-R".to_string(), owner_spec, dir.to_string()]),
                deadline,
            )
            .await?;
    }
    Ok(())
}

/// Reads the host's global git identity and, if set, applies it inside
/// the container under the agent user. The home directory may not be
/// writable immediately after container start, so writability is polled
/// with backoff, with one privileged chown/chmod repair attempt.
pub async fn seed_git_identity(runtime: &dyn ContainerRuntime, container_name: &str, deadline: Deadline) {
    let Some((name, email)) = read_host_git_identity().await else {
        return;
    };

    if let Err(e) = apply_git_identity(runtime, container_name, &name, &email, deadline).await {
        tracing::warn!(container = container_name, error = %e, "git identity seeding failed");
    }
}

async fn read_host_git_identity() -> Option<(String, String)> {
    let name = run_host_git(&["config", "--global", "user.name"]).await?;
    let email = run_host_git(&["config", "--global", "user.email"]).await?;
    if name.is_empty() || email.is_empty() {
        return None;
    }
    Some((name, email))
}

async fn run_host_git(args: &[&str]) -> Option<String> {
    let output = tokio::process::Command::new("git").args(args).output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

const WRITABILITY_BACKOFF: [Duration; 4] =
    [Duration::from_millis(50), Duration::from_millis(100), Duration::from_millis(200), Duration::from_millis(400)];

async fn apply_git_identity(
    runtime: &dyn ContainerRuntime,
    container_name: &str,
    name: &str,
    email: &str,
    deadline: Deadline,
) -> Result<(), Error> {
    ensure_gitconfig_writable(runtime, container_name, deadline).await?;

    let set_name = ExecRequest {
        user: Some(AGENT_USER.to_string()),
        ..ExecRequest::new(
            container_name,
            vec!["git".to_string(), "config".to_string(), "--global".to_string(), "user.name".to_string(), name.to_string()],
        )
    };
    runtime.exec(set_name, deadline).await?;

    let set_email = ExecRequest {
        user: Some(AGENT_USER.to_string()),
        ..ExecRequest::new(
            container_name,
            vec!["git".to_string(), "config".to_string(), "--global".to_string(), "user.email".to_string(), email.to_string()],
        )
    };
    runtime.exec(set_email, deadline).await?;
    Ok(())
}

/// Polls `test -w <home>` as the agent user, repairing ownership once via
/// a privileged chown+chmod after the first failed attempt.
async fn ensure_gitconfig_writable(runtime: &dyn ContainerRuntime, container_name: &str, deadline: Deadline) -> Result<(), Error> {
    let home = agent_home();

    for (attempt, backoff) in WRITABILITY_BACKOFF.iter().enumerate() {
        let probe = ExecRequest {
            user: Some(AGENT_USER.to_string()),
            ..ExecRequest::new(container_name, vec!["sh".to_string(), "-c".to_string(), format!("test -w {home}")])
        };
        let output = runtime.exec(probe, deadline).await?;
        if output.success() {
            return Ok(());
        }

        if attempt == 0 {
            let chown_spec = format!("{AGENT_USER}:{AGENT_USER}");
            let _ = runtime
                .exec(ExecRequest::new(container_name, vec!["chown".to_string(), "-R".to_string(), chown_spec, home.clone()]), deadline)
                .await;
            let _ = runtime
                .exec(ExecRequest::new(container_name, vec!["chmod".to_string(), "u+w".to_string(), home.clone()]), deadline)
                .await;
        }

        tokio::time::sleep(*backoff).await;
    }

    Err(Error::transient(format!("{home} not writable for git identity seeding after retries")))
}

#[cfg(test)]
#[path = "seeding_tests.rs"]
mod tests;
