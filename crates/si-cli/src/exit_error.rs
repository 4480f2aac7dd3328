// SPDX-License-Identifier: MIT

//! Carries a process exit code through an `anyhow::Error` chain so
//! `main()` can decide the exit code without calling
//! `std::process::exit()` from deep inside command handlers.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Fatal errors exit 1; non-zero exit codes from wrapped external
    /// processes propagate unchanged.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }

    pub fn from_exit_code(code: i32, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Classifies an `si_core::Error` into the corresponding exit code and
/// remediation-annotated message surfaced to the operator.
pub fn from_core_error(err: &si_core::Error) -> ExitError {
    let mut message = err.to_string();
    if let Some(hint) = err.remediation() {
        message.push_str(&format!("\n{}", crate::color::muted(&format!("hint: {hint}"))));
    }
    ExitError::fatal(message)
}
