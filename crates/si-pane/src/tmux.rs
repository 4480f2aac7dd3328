// SPDX-License-Identifier: MIT

//! Tmux process wrappers.
//!
//! Session metadata (`command_shape_hash`, `host_cwd`, `resume_session_id`)
//! is persisted as tmux user options rather than a side file, so it lives
//! and dies with the session itself.

use async_trait::async_trait;

use si_core::Error;

const OPT_COMMAND_SHAPE_HASH: &str = "@si_command_shape_hash";
const OPT_HOST_CWD: &str = "@si_host_cwd";
const OPT_RESUME_SESSION_ID: &str = "@si_resume_session_id";

/// Everything the Pane Supervisor needs from a terminal multiplexer.
/// Implemented against the real `tmux` binary by [`TokioTmux`]; tests use
/// an in-memory fake (`si-pane::test_support` behind `test-support`).
#[async_trait]
pub trait TmuxController: Send + Sync {
    async fn has_session(&self, session: &str) -> Result<bool, Error>;

    /// `tmux new-session -d -s <session> <command>`.
    async fn new_session(&self, session: &str, command: &str) -> Result<(), Error>;

    async fn kill_session(&self, session: &str) -> Result<(), Error>;

    /// Whether the session's (sole) pane has died, via `#{pane_dead}`.
    async fn pane_dead(&self, session: &str) -> Result<bool, Error>;

    async fn set_option(&self, session: &str, option: &str, value: &str) -> Result<(), Error>;
    async fn get_option(&self, session: &str, option: &str) -> Result<Option<String>, Error>;

    async fn rename_window(&self, session: &str, name: &str) -> Result<(), Error>;
    async fn set_pane_title(&self, session: &str, title: &str) -> Result<(), Error>;

    /// Interactive, blocking attach — replaces the calling process's
    /// terminal. Not asynchronous: there is nothing to await once the
    /// operator's own TTY is handed to tmux.
    fn attach(&self, session: &str) -> Result<i32, Error>;
}

/// Recorded pane metadata, read back from tmux user options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedPane {
    pub command_shape_hash: Option<String>,
    pub host_cwd: Option<String>,
    pub resume_session_id: Option<String>,
}

/// Reads the three recorded options for `session` in one place so callers
/// don't repeat the option-name constants.
pub async fn read_recorded(tmux: &dyn TmuxController, session: &str) -> Result<RecordedPane, Error> {
    Ok(RecordedPane {
        command_shape_hash: tmux.get_option(session, OPT_COMMAND_SHAPE_HASH).await?,
        host_cwd: tmux.get_option(session, OPT_HOST_CWD).await?,
        resume_session_id: tmux.get_option(session, OPT_RESUME_SESSION_ID).await?,
    })
}

/// Writes the three recorded options for `session`, used after both
/// session creation and reset.
pub async fn write_recorded(
    tmux: &dyn TmuxController,
    session: &str,
    command_shape_hash: &str,
    host_cwd: &str,
    resume_session_id: Option<&str>,
) -> Result<(), Error> {
    tmux.set_option(session, OPT_COMMAND_SHAPE_HASH, command_shape_hash).await?;
    tmux.set_option(session, OPT_HOST_CWD, host_cwd).await?;
    if let Some(id) = resume_session_id {
        tmux.set_option(session, OPT_RESUME_SESSION_ID, id).await?;
    }
    Ok(())
}

/// The real `tmux`-binary-backed [`TmuxController`], overridable via
/// `SI_TMUX_BIN` (mirroring `si-runtime::DockerRuntime`'s `SI_DOCKER_BIN`
/// convention).
#[derive(Debug, Clone)]
pub struct TokioTmux {
    binary: String,
}

impl Default for TokioTmux {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioTmux {
    pub fn new() -> Self {
        let binary = std::env::var("SI_TMUX_BIN").unwrap_or_else(|_| "tmux".to_string());
        Self { binary }
    }

    async fn run(&self, args: &[&str]) -> Result<String, Error> {
        let output = tokio::process::Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::transient(format!("failed to run tmux: {e}")))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(classify_tmux_failure(&stderr))
        }
    }
}

fn classify_tmux_failure(stderr: &str) -> Error {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("can't find session") || lower.contains("session not found") {
        Error::not_found(stderr.to_string())
    } else {
        Error::fatal(stderr.to_string())
    }
}

#[async_trait]
impl TmuxController for TokioTmux {
    async fn has_session(&self, session: &str) -> Result<bool, Error> {
        match self.run(&["has-session", "-t", session]).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == si_core::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn new_session(&self, session: &str, command: &str) -> Result<(), Error> {
        self.run(&["new-session", "-d", "-s", session, command]).await.map(|_| ())
    }

    async fn kill_session(&self, session: &str) -> Result<(), Error> {
        match self.run(&["kill-session", "-t", session]).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == si_core::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn pane_dead(&self, session: &str) -> Result<bool, Error> {
        let raw = self.run(&["list-panes", "-t", session, "-F", "#{pane_dead}"]).await?;
        Ok(raw.lines().next().map(|l| l.trim() == "1").unwrap_or(true))
    }

    async fn set_option(&self, session: &str, option: &str, value: &str) -> Result<(), Error> {
        self.run(&["set-option", "-t", session, option, value]).await.map(|_| ())
    }

    async fn get_option(&self, session: &str, option: &str) -> Result<Option<String>, Error> {
        match self.run(&["show-options", "-t", session, "-v", option]).await {
            Ok(raw) if raw.is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == si_core::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn rename_window(&self, session: &str, name: &str) -> Result<(), Error> {
        self.run(&["rename-window", "-t", session, name]).await.map(|_| ())
    }

    async fn set_pane_title(&self, session: &str, title: &str) -> Result<(), Error> {
        self.run(&["select-pane", "-t", session, "-T", title]).await.map(|_| ())
    }

    fn attach(&self, session: &str) -> Result<i32, Error> {
        let status = std::process::Command::new(&self.binary)
            .args(["attach-session", "-t", session])
            .status()
            .map_err(|e| Error::fatal(format!("failed to run tmux attach: {e}")))?;
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
