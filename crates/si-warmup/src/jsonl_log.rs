// SPDX-License-Identifier: MIT

//! Append-only transition log: every significant transition gets one
//! JSONL record. `OpenOptions` with `append(true)`, one `writeln!` per
//! record, `sync_all` before returning.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde_json::Value;

use si_core::{paths, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Appends one structured transition record to `~/.si/logs/warmup.log`.
pub fn append_transition(
    home: &Path,
    level: LogLevel,
    event: &str,
    profile_id: &str,
    extras: Value,
    now_epoch_secs: u64,
) -> Result<(), Error> {
    let path = paths::warmup_log_path(home);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let record = serde_json::json!({
        "ts": now_epoch_secs,
        "level": level.as_str(),
        "event": event,
        "profile": profile_id,
        "extras": extras,
    });

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", serde_json::to_string(&record)?)?;
    file.sync_all()?;
    Ok(())
}

/// Reads back every record, newest last — test and `warmup status
/// --raw` helper.
pub fn read_transitions(home: &Path) -> Result<Vec<Value>, Error> {
    let path = paths::warmup_log_path(home);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(Error::from))
        .collect()
}

#[cfg(test)]
#[path = "jsonl_log_tests.rs"]
mod tests;
