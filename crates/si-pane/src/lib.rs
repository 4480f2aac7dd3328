// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! si-pane: the Pane Supervisor.
//!
//! Attaches an operator TTY to a running agent container via a
//! multiplexed terminal session, deciding between reuse, resume, and full
//! recreate while preserving conversation continuity.

mod command_shape;
mod cwd;
mod supervisor;
mod tmux;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use command_shape::{command_shape, command_shape_hash, primary_command, resume_command, HOST_CWD_PLACEHOLDER};
pub use cwd::resolve_container_cwd;
pub use supervisor::{AttachOutcome, LaunchParams, PaneSupervisor};
pub use tmux::{read_recorded, write_recorded, RecordedPane, TmuxController, TokioTmux};
