// SPDX-License-Identifier: MIT

//! `AuthTokens` / `AuthFile`: the credential schema si owns on disk.

use serde::{Deserialize, Serialize};

use crate::jwt;

/// Token material for one profile. Either `access_token` or
/// `refresh_token` MUST be non-empty (enforced by [`AuthFile::is_valid`],
/// not by the type itself — deserializing a file with neither present
/// should surface as "invalid", not panic).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthTokens {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub account_id: String,
    /// Epoch seconds of the last successful refresh; 0 if never refreshed.
    #[serde(default)]
    pub last_refresh_time: u64,
}

impl AuthTokens {
    pub fn has_access_or_refresh(&self) -> bool {
        !self.access_token.is_empty() || !self.refresh_token.is_empty()
    }

    /// Whether any JWT-shaped token we hold (`access_token` first, then
    /// `id_token`) carries an `exp` claim that has passed as of `now`.
    /// `None` means no JWT with an `exp` claim was found — not expired by
    /// this check, but also not proven valid (see `AuthFile::is_valid`).
    fn jwt_expired(&self, now_epoch_secs: u64) -> Option<bool> {
        jwt::is_expired(&self.access_token, now_epoch_secs)
            .or_else(|| jwt::is_expired(&self.id_token, now_epoch_secs))
    }
}

/// The on-disk document at `<profiles_root>/<id>/auth.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthFile {
    pub tokens: AuthTokens,
}

impl AuthFile {
    /// Valid iff it parses, `tokens` is present, either
    /// token is non-empty, and any JWT-shaped `exp` claim present is
    /// strictly after `now`. A refresh-only file (expired or absent
    /// access token, present refresh token) is still valid — refresh will
    /// mint a fresh access token.
    pub fn is_valid(&self, now_epoch_secs: u64) -> bool {
        if !self.tokens.has_access_or_refresh() {
            return false;
        }
        match self.tokens.jwt_expired(now_epoch_secs) {
            Some(true) => !self.tokens.refresh_token.is_empty(),
            Some(false) | None => true,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(raw).map_err(|e| crate::Error::fatal(format!("invalid auth.json: {e}")))
    }

    pub fn to_json_pretty(&self) -> Result<String, crate::Error> {
        serde_json::to_string_pretty(self).map_err(crate::Error::from)
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
