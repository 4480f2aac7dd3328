// SPDX-License-Identifier: MIT

//! `run`: pane supervisor / direct exec / one-off prompt.

use std::io::IsTerminal;
use std::sync::Arc;

use si_identity::AttachContext;
use si_pane::{LaunchParams, PaneSupervisor, TokioTmux};
use si_runtime::{Deadline, ExecRequest};

use crate::commands::Context;
use crate::exit_error::from_core_error;

const BIND_DEADLINE_SECS: u64 = 60;
const EXEC_DEADLINE_SECS: u64 = 120;

fn launch_params(ctx: &Context) -> LaunchParams {
    LaunchParams {
        agent_binary: "codex".to_string(),
        model: ctx.settings.model_name(),
        reasoning_effort: ctx.settings.reasoning_effort(),
    }
}

/// `run <name> [--tmux|--no-tmux] [cmd...]`: attach via the Pane
/// Supervisor, or fall back to a direct exec when `--no-tmux` is given or
/// there is no TTY.
pub async fn run(ctx: &Context, profile_id: Option<&str>, use_tmux: bool, command: Vec<String>) -> anyhow::Result<()> {
    let profile = ctx.resolve_profile(profile_id)?;
    let has_tty = std::io::stdin().is_terminal();

    let reconciler = ctx.identity_reconciler();
    let outcome = reconciler
        .bind(&profile, AttachContext::TtyAttach, Deadline::from_secs(BIND_DEADLINE_SECS))
        .await
        .map_err(|e| from_core_error(&e))?;
    if let Some(hint) = &outcome.remediation {
        println!("{}", crate::color::warn(hint));
    }

    if use_tmux && has_tty {
        let tmux: Arc<dyn si_pane::TmuxController> = Arc::new(TokioTmux::new());
        let supervisor = PaneSupervisor::new(tmux);
        let host_cwd = std::env::current_dir().map_err(|e| anyhow::anyhow!("cannot read current directory: {e}"))?;
        let host_cwd_str = host_cwd.to_string_lossy().into_owned();
        let host_cwd_physical = std::fs::canonicalize(&host_cwd).ok().map(|p| p.to_string_lossy().into_owned());

        let attach_outcome = supervisor
            .attach(
                &profile,
                &outcome.binding,
                &host_cwd_str,
                host_cwd_physical.as_deref(),
                None,
                &launch_params(ctx),
                has_tty,
            )
            .await
            .map_err(|e| from_core_error(&e))?;

        if attach_outcome.reset {
            println!("{}", crate::color::warn("pane was dead; session was recreated"));
        }
        std::process::exit(attach_outcome.exit_code);
    }

    let exec_command = if command.is_empty() { vec!["codex".to_string()] } else { command };
    let mut request = ExecRequest::new(&outcome.binding.container_name, exec_command);
    request.tty = has_tty;
    let output = ctx.runtime.exec(request, Deadline::from_secs(EXEC_DEADLINE_SECS)).await.map_err(|e| from_core_error(&e))?;
    print!("{}", output.stdout_string());
    if !output.success() {
        std::process::exit(output.exit_code);
    }
    Ok(())
}

/// `run --prompt <text> [--no-mcp] [--output-only]`: a one-off ephemeral
/// exec that never touches the pane session.
pub async fn run_prompt(ctx: &Context, profile_id: Option<&str>, prompt: &str, no_mcp: bool, output_only: bool) -> anyhow::Result<()> {
    let profile = ctx.resolve_profile(profile_id)?;
    let reconciler = ctx.identity_reconciler();
    let outcome = reconciler
        .bind(&profile, AttachContext::Background, Deadline::from_secs(BIND_DEADLINE_SECS))
        .await
        .map_err(|e| from_core_error(&e))?;

    let mut command = vec!["codex".to_string(), "exec".to_string(), prompt.to_string()];
    if no_mcp {
        command.push("--no-mcp".to_string());
    }

    let request = ExecRequest::new(&outcome.binding.container_name, command);
    let output = ctx.runtime.exec(request, Deadline::from_secs(EXEC_DEADLINE_SECS)).await.map_err(|e| from_core_error(&e))?;

    if output_only {
        print!("{}", output.stdout_string());
    } else {
        println!("{} {}", crate::color::context("profile"), crate::color::literal(&profile.id));
        print!("{}", output.stdout_string());
        if !output.stderr.is_empty() {
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
        }
    }

    if !output.success() {
        std::process::exit(output.exit_code);
    }
    Ok(())
}
