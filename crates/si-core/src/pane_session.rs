// SPDX-License-Identifier: MIT

//! `PaneSession`: the operator's recorded view of a multiplexed terminal
//! session for one container.
//!
//! The reset policy is a deliberate inversion of the naive approach: a
//! naive implementation resets on any metadata drift (cwd changed, launch
//! command changed); this one resets *only* when the pane process itself
//! has died, so a live agent conversation survives an operator reconnecting
//! from a different directory.

use serde::{Deserialize, Serialize};

/// Recorded metadata for a pane session, persisted as tmux session options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneSession {
    pub session_name: String,
    /// Hash of the launch command with the host cwd replaced by a
    /// placeholder (so the hash is stable across reconnects from different
    /// directories).
    pub command_shape_hash: String,
    pub host_cwd: String,
    /// The agent CLI's own "session id" for this profile, if known, used to
    /// build a `resume` command on reset instead of starting fresh.
    pub resume_session_id: Option<String>,
}

impl PaneSession {
    pub fn new(session_name: impl Into<String>, command_shape_hash: impl Into<String>, host_cwd: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            command_shape_hash: command_shape_hash.into(),
            host_cwd: host_cwd.into(),
            resume_session_id: None,
        }
    }
}

/// Reset iff the pane is dead. `current_command_shape_hash` and
/// `current_host_cwd` are accepted only so callers can log what drifted
/// — they never affect the decision.
///
/// `should_reset_session(pane_dead=false, ..) == false` for every drift
/// combination.
pub fn should_reset_session(
    pane_dead: bool,
    _recorded: &PaneSession,
    _current_command_shape_hash: &str,
    _current_host_cwd: &str,
) -> bool {
    pane_dead
}

#[cfg(test)]
#[path = "pane_session_tests.rs"]
mod tests;
