// SPDX-License-Identifier: MIT

//! Token refresh: at most one refresh in flight per profile, client id
//! recovered from the `id_token`'s `aud` claim, atomic write on success,
//! and `refresh_token_reused` recovery by re-reading the file another
//! process already rotated.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use si_core::{jwt, AuthFile, AuthTokens, Error};

use crate::store::{read_auth_file, write_auth_file_atomic};

/// The token endpoint, injected so tests never make a real HTTP call.
#[async_trait]
pub trait RefreshClient: Send + Sync {
    async fn exchange(&self, refresh_token: &str, client_id: &str) -> Result<AuthTokens, RefreshClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshClientError {
    /// The upstream signaled `refresh_token_reused`: another process
    /// already rotated this profile's tokens.
    Reused,
    Auth(String),
    Transient(String),
}

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// This call performed the refresh and wrote the new file.
    Refreshed(AuthFile),
    /// Another process rotated first; the latest tokens were re-read from
    /// disk without this call touching the token endpoint again.
    ReusedRecovered(AuthFile),
}

impl RefreshOutcome {
    pub fn auth_file(&self) -> &AuthFile {
        match self {
            RefreshOutcome::Refreshed(a) | RefreshOutcome::ReusedRecovered(a) => a,
        }
    }
}

/// Serializes refresh calls per profile id so two concurrent callers for
/// the same profile result in exactly one token endpoint call.
pub struct TokenRefresher<C> {
    client: C,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<C: RefreshClient> TokenRefresher<C> {
    pub fn new(client: C) -> Self {
        Self { client, locks: DashMap::new() }
    }

    fn lock_for(&self, profile_id: &str) -> Arc<Mutex<()>> {
        self.locks.entry(profile_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    pub async fn refresh(
        &self,
        profile_id: &str,
        auth_path: &Path,
        now_epoch_secs: u64,
    ) -> Result<RefreshOutcome, Error> {
        // Snapshot before acquiring the lock: if a concurrent caller for
        // the same profile wins the race and refreshes first, we detect
        // that our snapshot is stale once we get the lock and skip calling
        // the token endpoint a second time.
        let pre_lock = read_auth_file(auth_path)?;

        let lock = self.lock_for(profile_id);
        let _guard = lock.lock().await;

        let current = read_auth_file(auth_path)?;
        if current.tokens != pre_lock.tokens {
            return Ok(RefreshOutcome::ReusedRecovered(current));
        }

        let client_id = jwt::aud_claim(&current.tokens.id_token)
            .ok_or_else(|| Error::fatal("id_token missing aud claim; cannot recover refresh client id"))?;

        match self.client.exchange(&current.tokens.refresh_token, &client_id).await {
            Ok(mut tokens) => {
                tokens.last_refresh_time = now_epoch_secs;
                let new_auth = AuthFile { tokens };
                write_auth_file_atomic(auth_path, &new_auth)?;
                Ok(RefreshOutcome::Refreshed(new_auth))
            }
            Err(RefreshClientError::Reused) => {
                let latest = read_auth_file(auth_path)?;
                if latest.tokens.refresh_token != current.tokens.refresh_token {
                    Ok(RefreshOutcome::ReusedRecovered(latest))
                } else {
                    Err(Error::auth_failure("refresh_token_reused with no rotation observed on disk"))
                }
            }
            Err(RefreshClientError::Auth(msg)) => Err(Error::auth_failure(msg)),
            Err(RefreshClientError::Transient(msg)) => Err(Error::transient(msg)),
        }
    }
}

/// The production [`RefreshClient`]: a `grant_type=refresh_token` POST
/// against the configured OAuth token endpoint.
pub struct OAuthTokenClient {
    http: reqwest::Client,
    token_endpoint: String,
}

impl OAuthTokenClient {
    pub fn new(token_endpoint: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), token_endpoint: token_endpoint.into() }
    }
}

#[derive(serde::Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
    client_id: &'a str,
}

#[derive(serde::Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
    id_token: String,
    #[serde(default)]
    account_id: String,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl RefreshClient for OAuthTokenClient {
    async fn exchange(&self, refresh_token: &str, client_id: &str) -> Result<AuthTokens, RefreshClientError> {
        let body = RefreshRequest { grant_type: "refresh_token", refresh_token, client_id };

        let resp = self
            .http
            .post(&self.token_endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RefreshClientError::Transient(e.to_string()))?;

        let status = resp.status();
        let parsed: RefreshResponse = resp
            .json()
            .await
            .map_err(|e| RefreshClientError::Transient(format!("malformed token response: {e}")))?;

        if let Some(err) = parsed.error {
            return if err == "refresh_token_reused" {
                Err(RefreshClientError::Reused)
            } else if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::BAD_REQUEST {
                Err(RefreshClientError::Auth(err))
            } else {
                Err(RefreshClientError::Transient(err))
            };
        }

        Ok(AuthTokens {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            id_token: parsed.id_token,
            account_id: parsed.account_id,
            last_refresh_time: 0,
        })
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
