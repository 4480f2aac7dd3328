// SPDX-License-Identifier: MIT

//! `auth.json` on-disk I/O: parse/validate on read, create-temp + chmod
//! 0600 + atomic rename on write.

use std::io::Write as _;
use std::path::Path;

use si_core::{AuthFile, Error};

pub fn read_auth_file(path: &Path) -> Result<AuthFile, Error> {
    let raw = std::fs::read_to_string(path)?;
    AuthFile::from_json(&raw)
}

/// Write `auth.json` atomically: write to a sibling temp file, `chmod
/// 0600`, then rename over the destination. A concurrent reader therefore
/// always observes either the old or the new file in full.
pub fn write_auth_file_atomic(path: &Path, auth: &AuthFile) -> Result<(), Error> {
    let parent = path.parent().ok_or_else(|| Error::fatal(format!("auth path has no parent: {}", path.display())))?;
    std::fs::create_dir_all(parent)?;

    let json = auth.to_json_pretty()?;
    let tmp_path = parent.join(format!(".auth.json.{}.tmp", std::process::id()));
    {
        let mut tmp = std::fs::File::create(&tmp_path)?;
        tmp.write_all(json.as_bytes())?;
        tmp.sync_all()?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
