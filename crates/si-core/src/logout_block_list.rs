// SPDX-License-Identifier: MIT

//! `LogoutBlockList`: profiles that explicitly logged out and must never be
//! silently re-authenticated by the credential lifecycle's recovery paths.
//!
//! Persisted as a sorted, lowercased JSON array at
//! `codex-logout-blocked-profiles.json`. Sorted so that
//! diffs of the file are stable and so two processes appending the same id
//! concurrently converge on the same serialized form.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutBlockList(BTreeSet<String>);

impl LogoutBlockList {
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let ids: Vec<String> = serde_json::from_str(raw)?;
        Ok(Self(ids.into_iter().map(|id| id.to_ascii_lowercase()).collect()))
    }

    pub fn to_json_pretty(&self) -> Result<String, Error> {
        let ids: Vec<&String> = self.0.iter().collect();
        serde_json::to_string_pretty(&ids).map_err(Error::from)
    }

    pub fn contains(&self, profile_id: &str) -> bool {
        self.0.contains(&profile_id.to_ascii_lowercase())
    }

    /// Explicit logout: add `profile_id` to the block list.
    pub fn block(&mut self, profile_id: &str) {
        self.0.insert(profile_id.to_ascii_lowercase());
    }

    /// Explicit login: clear the block for `profile_id`, scoped to the
    /// one profile, not the whole file.
    pub fn unblock(&mut self, profile_id: &str) {
        self.0.remove(&profile_id.to_ascii_lowercase());
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[path = "logout_block_list_tests.rs"]
mod tests;
