// SPDX-License-Identifier: MIT

//! `Profile`: a logical agent identity, drawn from settings.
//!
//! The Profile Store itself (the settings-backed lookup of `id → {name,
//! email}`) is ambient, not core — it lives behind a `Settings` trait
//! implemented in `si-cli`. This module only owns the data shape and the
//! id validation every other crate relies on.

use serde::{Deserialize, Serialize};

use crate::slug;
use crate::Error;

/// A logical agent identity: `profile_id → {name, email}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Profile {
    /// Construct a profile, normalizing (lowercasing) `id` and rejecting
    /// ids that don't conform to the safe-slug alphabet.
    pub fn new(id: impl AsRef<str>, name: impl Into<String>, email: impl Into<String>) -> Result<Self, Error> {
        let id = slug::normalize(id.as_ref())?;
        Ok(Self { id, name: name.into(), email: email.into() })
    }

    pub fn container_name(&self) -> String {
        slug::container_name(&self.id)
    }

    pub fn pane_session_name(&self) -> String {
        slug::pane_session_name(&self.id)
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
