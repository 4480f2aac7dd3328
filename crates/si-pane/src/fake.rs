// SPDX-License-Identifier: MIT

//! In-memory [`TmuxController`] fake, backing every pane-supervisor unit
//! test — the same test-support idiom as `si_runtime::fake::FakeRuntime`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use si_core::Error;

use crate::tmux::TmuxController;

#[derive(Debug, Clone, Default)]
struct FakeSession {
    command: String,
    options: BTreeMap<String, String>,
    pane_dead: bool,
}

/// An in-memory tmux stand-in. `attach` never blocks — it just returns the
/// exit code installed via [`FakeTmux::set_attach_exit_code`] (default 0).
#[derive(Default)]
pub struct FakeTmux {
    sessions: Mutex<BTreeMap<String, FakeSession>>,
    attach_exit_code: Mutex<i32>,
    attach_log: Mutex<Vec<String>>,
}

impl FakeTmux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_session(&self, name: &str, command: &str, pane_dead: bool) {
        self.sessions.lock().insert(
            name.to_string(),
            FakeSession { command: command.to_string(), options: BTreeMap::new(), pane_dead },
        );
    }

    pub fn set_pane_dead(&self, name: &str, dead: bool) {
        if let Some(s) = self.sessions.lock().get_mut(name) {
            s.pane_dead = dead;
        }
    }

    pub fn set_attach_exit_code(&self, code: i32) {
        *self.attach_exit_code.lock() = code;
    }

    pub fn command_of(&self, name: &str) -> Option<String> {
        self.sessions.lock().get(name).map(|s| s.command.clone())
    }

    pub fn option_of(&self, name: &str, option: &str) -> Option<String> {
        self.sessions.lock().get(name).and_then(|s| s.options.get(option).cloned())
    }

    pub fn attach_log(&self) -> Vec<String> {
        self.attach_log.lock().clone()
    }
}

#[async_trait]
impl TmuxController for FakeTmux {
    async fn has_session(&self, session: &str) -> Result<bool, Error> {
        Ok(self.sessions.lock().contains_key(session))
    }

    async fn new_session(&self, session: &str, command: &str) -> Result<(), Error> {
        self.sessions.lock().insert(
            session.to_string(),
            FakeSession { command: command.to_string(), options: BTreeMap::new(), pane_dead: false },
        );
        Ok(())
    }

    async fn kill_session(&self, session: &str) -> Result<(), Error> {
        self.sessions.lock().remove(session);
        Ok(())
    }

    async fn pane_dead(&self, session: &str) -> Result<bool, Error> {
        self.sessions.lock().get(session).map(|s| s.pane_dead).ok_or_else(|| Error::not_found(session.to_string()))
    }

    async fn set_option(&self, session: &str, option: &str, value: &str) -> Result<(), Error> {
        let mut sessions = self.sessions.lock();
        let s = sessions.get_mut(session).ok_or_else(|| Error::not_found(session.to_string()))?;
        s.options.insert(option.to_string(), value.to_string());
        Ok(())
    }

    async fn get_option(&self, session: &str, option: &str) -> Result<Option<String>, Error> {
        Ok(self.sessions.lock().get(session).and_then(|s| s.options.get(option).cloned()))
    }

    async fn rename_window(&self, session: &str, name: &str) -> Result<(), Error> {
        self.set_option(session, "@window_name", name).await
    }

    async fn set_pane_title(&self, session: &str, title: &str) -> Result<(), Error> {
        self.set_option(session, "@pane_title", title).await
    }

    fn attach(&self, session: &str) -> Result<i32, Error> {
        self.attach_log.lock().push(session.to_string());
        Ok(*self.attach_exit_code.lock())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
