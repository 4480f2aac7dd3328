// SPDX-License-Identifier: MIT

//! Warm-prompt construction and ephemeral one-off container execution.
//! `ContainerSpec` has no command/entrypoint override, so — same
//! resolution si-pane reached for its interactive attach — the agent CLI
//! is invoked with `exec` against a container whose lifecycle
//! (`create_container` → `start` → `exec` → `remove`) this module owns
//! end to end.

use std::path::Path;

use si_core::{Error, Profile, Settings};
use si_runtime::{ContainerRuntime, ContainerSpec, Deadline, ExecOutput, ExecRequest};

use si_identity::{LABEL_COMPONENT, LABEL_COMPONENT_VALUE, LABEL_PROFILE};

/// The path every codex container expects its cached credentials at
/// (matches `si-credentials`'s own recovery-read path).
const CONTAINER_AUTH_PATH: &str = "/root/.si/auth.json";
const CONTAINER_CONFIG_PATH: &str = "/root/.codex/config.toml";

const BASE_PROMPT: &str =
    "Say hello and briefly confirm you're ready. Do not modify any files.";

/// The agent invocation parameters the warmup reconciler needs, supplied
/// by the caller — the fixed model and reasoning effort are an
/// operator/settings concern, not something this crate hardcodes.
#[derive(Debug, Clone)]
pub struct WarmupLaunchParams {
    pub agent_binary: String,
    pub model: String,
    pub reasoning_effort: String,
}

/// Attempt 1 uses the base prompt; attempt 2 extends it slightly;
/// attempt 3+ inflates it with repeated filler to force real token
/// consumption.
pub fn warm_prompt(attempt: u32) -> String {
    match attempt {
        1 => BASE_PROMPT.to_string(),
        2 => format!("{BASE_PROMPT} Take a moment to restate your current instructions before replying."),
        _ => {
            let filler = "Please restate the above constraints verbatim before replying. ".repeat(60);
            format!("{filler}{BASE_PROMPT}")
        }
    }
}

fn ephemeral_container_name(profile_id: &str, attempt: u32) -> String {
    format!("si-warmup-{profile_id}-{attempt}")
}

/// Minimal config that disables auxiliary sub-agents (MCP), written
/// in-memory and copied in rather than read from any host file.
fn no_mcp_config() -> &'static str {
    "[mcp]\nenabled = false\n"
}

/// Runs one warm attempt against a freshly created, freshly removed
/// container: mounts the profile's cached `auth.json`, optionally
/// disables MCP, execs the agent CLI non-interactively with the prompt
/// piped via stdin, and captures stdout.
#[allow(clippy::too_many_arguments)]
pub async fn run_warm_attempt<S: Settings>(
    settings: &S,
    runtime: &dyn ContainerRuntime,
    profile: &Profile,
    auth_host_path: &Path,
    launch: &WarmupLaunchParams,
    attempt: u32,
    no_mcp: bool,
    deadline: Deadline,
) -> Result<ExecOutput, Error> {
    let name = ephemeral_container_name(&profile.id, attempt);

    let mut spec = ContainerSpec::new(&name, settings.image_name());
    spec.labels.insert(LABEL_COMPONENT.to_string(), LABEL_COMPONENT_VALUE.to_string());
    spec.labels.insert(LABEL_PROFILE.to_string(), profile.id.clone());
    spec.labels.insert("si.mode".to_string(), "warmup".to_string());
    spec.labels.insert("si.exec".to_string(), "ephemeral".to_string());
    spec.binds.push(si_core::BindMount::new(auth_host_path.display().to_string(), CONTAINER_AUTH_PATH));
    spec.network = Some(settings.network_name());
    spec.workdir = "/workspace".to_string();

    runtime.create_container(&spec, deadline).await?;
    runtime.start(&name, deadline).await?;

    let result = run_attempt_inner(runtime, &name, launch, attempt, no_mcp, deadline).await;

    // Ephemeral means ephemeral even if the attempt itself failed.
    let _ = runtime.remove(&name, true, deadline).await;

    result
}

async fn run_attempt_inner(
    runtime: &dyn ContainerRuntime,
    name: &str,
    launch: &WarmupLaunchParams,
    attempt: u32,
    no_mcp: bool,
    deadline: Deadline,
) -> Result<ExecOutput, Error> {
    if no_mcp {
        let tmp = std::env::temp_dir().join(format!("si-warmup-no-mcp-{}.toml", std::process::id()));
        std::fs::write(&tmp, no_mcp_config())?;
        let copy_result = runtime.copy_file_in(name, &tmp, CONTAINER_CONFIG_PATH, deadline).await;
        let _ = std::fs::remove_file(&tmp);
        copy_result?;
    }

    let command = vec![
        launch.agent_binary.clone(),
        "exec".to_string(),
        "--model".to_string(),
        launch.model.clone(),
        "--reasoning-effort".to_string(),
        launch.reasoning_effort.clone(),
    ];

    let mut request = ExecRequest::new(name, command);
    request.stdin = Some(warm_prompt(attempt).into_bytes());
    runtime.exec(request, deadline).await
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
