// SPDX-License-Identifier: MIT

//! The closed error taxonomy shared across every si crate.
//!
//! Classification happens once, at whichever adapter boundary first sees
//! the failure (container runtime, HTTP client, filesystem). Upper layers
//! match on `Error::kind()` rather than re-sniffing the underlying error.

use std::fmt;

/// The six error kinds named in the design notes: callers retry
/// `Transient`, surface `Fatal` and `AuthFailure` to the operator, degrade
/// on `DriftDetected` when in a TTY-attach path, and treat `Conflict` as
/// "someone else holds the lock, try again".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("auth failure: {0}")]
    AuthFailure(String),

    #[error("transient: {0}")]
    Transient(String),

    #[error("fatal: {0}")]
    Fatal(String),

    #[error("mount drift detected on {container}: {detail}")]
    DriftDetected { container: String, detail: String },

    #[error("conflict: {0}")]
    Conflict(String),
}

/// The kind of an [`Error`], used for classification without matching on
/// the full variant (and its payload) everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AuthFailure,
    Transient,
    Fatal,
    DriftDetected,
    Conflict,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AuthFailure => "auth_failure",
            ErrorKind::Transient => "transient",
            ErrorKind::Fatal => "fatal",
            ErrorKind::DriftDetected => "drift_detected",
            ErrorKind::Conflict => "conflict",
        };
        f.write_str(s)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AuthFailure(_) => ErrorKind::AuthFailure,
            Error::Transient(_) => ErrorKind::Transient,
            Error::Fatal(_) => ErrorKind::Fatal,
            Error::DriftDetected { .. } => ErrorKind::DriftDetected,
            Error::Conflict(_) => ErrorKind::Conflict,
        }
    }

    /// Whether retrying this operation with backoff is worthwhile.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient | ErrorKind::Conflict)
    }

    /// The corrective command to suggest to the operator, when one exists.
    /// Drift has a standard remediation; auth failures point at re-login.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Error::DriftDetected { .. } => Some("si respawn <name>"),
            Error::AuthFailure(_) => Some("si login"),
            _ => None,
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Error::Fatal(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Error::Transient(msg.into())
    }

    pub fn auth_failure(msg: impl Into<String>) -> Self {
        Error::AuthFailure(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind as IoKind;
        match e.kind() {
            IoKind::NotFound => Error::NotFound(e.to_string()),
            IoKind::WouldBlock | IoKind::TimedOut | IoKind::Interrupted => {
                Error::Transient(e.to_string())
            }
            _ => Error::Fatal(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Fatal(format!("invalid json: {e}"))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
