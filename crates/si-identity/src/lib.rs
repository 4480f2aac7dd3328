// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! si-identity: the Identity/Mount Reconciler.
//!
//! Binds a profile to a running container, detects required-mount drift,
//! recreates when necessary (with the TTY-attach vault-only exception),
//! and seeds `config.toml`, `auth.json`, and git identity into it.

mod binding;
mod seeding;

pub use binding::{AttachContext, BindOutcome, IdentityReconciler};

/// The non-root user every long-lived codex container runs its agent
/// process as; its home directory is where the unprivileged seeding
/// target and the three named volumes live.
pub(crate) const AGENT_USER: &str = "node";

pub(crate) fn agent_home() -> String {
    format!("/home/{AGENT_USER}")
}

/// Container labels: `si.component=codex`, `si.name=<slug>`,
/// `si.codex.profile=<id>`.
pub const LABEL_COMPONENT: &str = "si.component";
pub const LABEL_COMPONENT_VALUE: &str = "codex";
pub const LABEL_NAME: &str = "si.name";
pub const LABEL_PROFILE: &str = "si.codex.profile";
