// SPDX-License-Identifier: MIT

//! Persistence for the warmup state document: temp + rename writes,
//! guarded by a cooperative file lock with a staleness timeout: open
//! without truncating, `try_lock_exclusive`, only write content once the
//! lock is actually held.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use fs2::FileExt;

use si_core::{paths, Error, WarmupStateDocument};

/// How long an unreleased lock file is assumed to belong to a crashed
/// process rather than one still mid-reconcile.
pub const LOCK_STALE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Held for the lifetime of one reconcile pass; dropping it releases the
/// flock automatically.
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Acquires the warmup state lock, breaking it first if it looks stale.
/// Writing the PID only happens after the lock is confirmed held, so a
/// losing racer never wipes the winner's PID out from under it.
pub fn acquire_lock(home: &Path) -> Result<StateLock, Error> {
    acquire_lock_with_timeout(home, LOCK_STALE_TIMEOUT)
}

pub(crate) fn acquire_lock_with_timeout(home: &Path, stale_timeout: Duration) -> Result<StateLock, Error> {
    let lock_path = paths::warmup_dir(home).join("state.lock");
    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = open_lock_file(&lock_path)?;
    match file.try_lock_exclusive() {
        Ok(()) => {
            write_pid(&file)?;
            Ok(StateLock { file, path: lock_path })
        }
        Err(_) if is_stale(&lock_path, stale_timeout) => {
            // The holder is presumed dead. Replace the file (a fresh inode
            // sidesteps the dead process's now-meaningless flock) and
            // lock the replacement.
            let fresh = open_lock_file(&lock_path)?;
            fresh.try_lock_exclusive().map_err(|e| Error::conflict(format!("warmup lock: {e}")))?;
            write_pid(&fresh)?;
            Ok(StateLock { file: fresh, path: lock_path })
        }
        Err(e) => Err(Error::conflict(format!("warmup state lock held by another process: {e}"))),
    }
}

fn open_lock_file(path: &Path) -> Result<File, Error> {
    Ok(OpenOptions::new().write(true).create(true).truncate(false).open(path)?)
}

fn write_pid(file: &File) -> Result<(), Error> {
    use std::io::Write;
    file.set_len(0)?;
    let mut file = file;
    writeln!(file, "{}", std::process::id())?;
    Ok(())
}

fn is_stale(path: &Path, timeout: Duration) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|modified| modified.elapsed().unwrap_or(Duration::ZERO) > timeout)
        .unwrap_or(false)
}

/// Reads the on-disk document, or an empty (version-stamped) one if it
/// has never been written.
pub fn read_state(home: &Path) -> Result<WarmupStateDocument, Error> {
    let path = paths::warmup_state_path(home);
    match fs::read_to_string(&path) {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(WarmupStateDocument::new()),
        Err(e) => Err(e.into()),
    }
}

/// Writes the document via temp + rename, so every mutator is atomic.
pub fn write_state(home: &Path, doc: &WarmupStateDocument) -> Result<(), Error> {
    let path = paths::warmup_state_path(home);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(doc)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

/// Touches the lock file's mtime forward so a long-running reconcile
/// pass isn't mistaken for stale by a concurrent starter partway through.
pub fn refresh_lock(lock: &StateLock) -> Result<(), Error> {
    let now = SystemTime::now();
    lock.file.set_modified(now)?;
    Ok(())
}

#[cfg(test)]
#[path = "state_store_tests.rs"]
mod tests;
