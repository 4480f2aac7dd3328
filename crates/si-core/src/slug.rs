// SPDX-License-Identifier: MIT

//! Profile-id slug validation.
//!
//! A profile id is a lowercased slug: ASCII lowercase letters, digits, `-`
//! and `_`, 1-63 bytes, never starting or ending with a separator. It is
//! safe to interpolate directly into a container name (`si-codex-<slug>`),
//! a tmux session name (`si-codex-pane-<slug>`), and a filesystem path
//! segment (`~/.si/codex/profiles/<slug>/`).

use crate::error::Error;

const MAX_LEN: usize = 63;

/// Validate and normalize a candidate profile id.
///
/// Returns the lowercased slug on success. Rejects empty strings, strings
/// over [`MAX_LEN`] bytes, any byte outside `[a-z0-9_-]` after lowering,
/// and leading/trailing separators (which would produce a confusing
/// container name like `si-codex--alice` or `si-codex-alice-`).
pub fn normalize(candidate: &str) -> Result<String, Error> {
    if candidate.is_empty() {
        return Err(Error::fatal("profile id must not be empty"));
    }
    let lowered = candidate.to_ascii_lowercase();
    if lowered.len() > MAX_LEN {
        return Err(Error::fatal(format!(
            "profile id exceeds {MAX_LEN} bytes: {candidate:?}"
        )));
    }
    let valid = lowered.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if !valid {
        return Err(Error::fatal(format!(
            "profile id {candidate:?} must be ASCII letters, digits, '-' or '_'"
        )));
    }
    if lowered.starts_with(['-', '_']) || lowered.ends_with(['-', '_']) {
        return Err(Error::fatal(format!(
            "profile id {candidate:?} must not start or end with a separator"
        )));
    }
    Ok(lowered)
}

/// Whether `candidate` is already a valid, normalized slug (no case folding
/// performed — used to detect ids that need [`normalize`] vs. ones that
/// are already canonical).
pub fn is_normalized(candidate: &str) -> bool {
    normalize(candidate).map(|n| n == candidate).unwrap_or(false)
}

/// Derive the container name for a profile: `si-codex-<slug>`.
pub fn container_name(profile_id: &str) -> String {
    format!("si-codex-{profile_id}")
}

/// Derive the pane session name for a profile: `si-codex-pane-<slug>`.
pub fn pane_session_name(profile_id: &str) -> String {
    format!("si-codex-pane-{profile_id}")
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
