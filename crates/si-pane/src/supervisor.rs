// SPDX-License-Identifier: MIT

//! The Pane Supervisor's attach algorithm, in full: create-if-absent,
//! pane-dead-only reset, resume-with-fallback on reset, pane labeling,
//! and the final attach.

use std::sync::Arc;

use si_core::{should_reset_session, BindMount, ContainerBinding, Error, PaneSession, Profile};

use crate::command_shape::{command_shape_hash, primary_command, resume_command};
use crate::cwd::resolve_container_cwd;
use crate::tmux::{read_recorded, write_recorded, TmuxController};

/// Everything the attach algorithm needs about the agent invocation that
/// the core doesn't already know — the agent binary, model, and
/// reasoning effort are left to settings.
#[derive(Debug, Clone)]
pub struct LaunchParams {
    pub agent_binary: String,
    pub model: String,
    pub reasoning_effort: String,
}

/// The result of [`PaneSupervisor::attach`]: whether a reset happened and
/// with what outcome, plus the blocking attach's exit code once the
/// operator detaches.
#[derive(Debug, Clone)]
pub struct AttachOutcome {
    pub session_name: String,
    pub container_cwd: String,
    pub reset: bool,
    pub resumed_session_id: Option<String>,
    pub exit_code: i32,
}

/// Manages one multiplexed terminal session per container. Stateless
/// across calls; all session state lives in tmux itself, which persists
/// the metadata as session options.
pub struct PaneSupervisor {
    tmux: Arc<dyn TmuxController>,
}

impl PaneSupervisor {
    pub fn new(tmux: Arc<dyn TmuxController>) -> Self {
        Self { tmux }
    }

    /// Runs the full attach algorithm for `profile`, bound to `binding`,
    /// from the operator's current `host_cwd` (and, if different, its
    /// symlink-resolved physical path). `has_tty` is the caller's own
    /// `stdin().is_terminal()` check — missing TTY is fatal — threaded in
    /// rather than read here so the algorithm is testable outside a real
    /// terminal.
    #[allow(clippy::too_many_arguments)]
    pub async fn attach(
        &self,
        profile: &Profile,
        binding: &ContainerBinding,
        host_cwd: &str,
        host_cwd_physical: Option<&str>,
        resume_session_id: Option<&str>,
        launch: &LaunchParams,
        has_tty: bool,
    ) -> Result<AttachOutcome, Error> {
        if !has_tty {
            return Err(Error::fatal("pane attach requires an interactive terminal"));
        }

        let session = profile.pane_session_name();
        let binds: Vec<BindMount> = binding.required.binds().into_iter().cloned().collect();
        let container_cwd = resolve_container_cwd(&binds, host_cwd)
            .or_else(|| host_cwd_physical.and_then(|p| resolve_container_cwd(&binds, p)))
            .unwrap_or_else(|| binding.required.workdir.clone());

        let command = primary_command(
            &binding.container_name,
            &launch.agent_binary,
            &container_cwd,
            &launch.model,
            &launch.reasoning_effort,
        );
        let shape_hash = command_shape_hash(&command, host_cwd);

        let (reset, resumed) = if !self.tmux.has_session(&session).await? {
            self.tmux.new_session(&session, &command).await?;
            write_recorded(self.tmux.as_ref(), &session, &shape_hash, host_cwd, resume_session_id).await?;
            (false, None)
        } else {
            let recorded = read_recorded(self.tmux.as_ref(), &session).await?;
            let pane = recorded_as_pane_session(&session, &recorded);
            let pane_dead = self.tmux.pane_dead(&session).await?;

            if should_reset_session(pane_dead, &pane, &shape_hash, host_cwd) {
                self.tmux.kill_session(&session).await?;

                let resume_id = recorded.resume_session_id.as_deref().or(resume_session_id);
                let reset_command = match resume_id {
                    Some(id) => resume_command(&binding.container_name, &launch.agent_binary, &container_cwd, id),
                    None => command.clone(),
                };
                self.tmux.new_session(&session, &reset_command).await?;
                write_recorded(self.tmux.as_ref(), &session, &shape_hash, host_cwd, resume_id).await?;

                if let Some(id) = resume_id {
                    tracing::warn!(session = %session, resumed_session_id = %id, "pane died; resumed prior agent session");
                }
                (true, resume_id.map(str::to_string))
            } else {
                (false, recorded.resume_session_id)
            }
        };

        let label = format!("{} ({})", profile.name, profile.id);
        self.tmux.rename_window(&session, &label).await?;
        self.tmux.set_pane_title(&session, &label).await?;
        self.tmux.set_option(&session, "destroy-unattached", "off").await?;

        let exit_code = self.tmux.attach(&session)?;

        Ok(AttachOutcome { session_name: session, container_cwd, reset, resumed_session_id: resumed, exit_code })
    }
}

fn recorded_as_pane_session(session: &str, recorded: &crate::tmux::RecordedPane) -> PaneSession {
    let mut pane = PaneSession::new(
        session,
        recorded.command_shape_hash.clone().unwrap_or_default(),
        recorded.host_cwd.clone().unwrap_or_default(),
    );
    pane.resume_session_id = recorded.resume_session_id.clone();
    pane
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
