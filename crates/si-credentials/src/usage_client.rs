// SPDX-License-Identifier: MIT

//! Usage API client: a GET request authenticated by the current access
//! token, returning the two rate-limit windows. A 401 with
//! `code=token_expired` triggers exactly one refresh-and-retry; any
//! further failure surfaces as an auth failure.

use serde::Deserialize;

use si_core::{Error, UsageSnapshot, UsageWindow};

#[derive(Debug, Deserialize)]
struct UsageResponse {
    primary: RawWindow,
    secondary: RawWindow,
}

#[derive(Debug, Deserialize)]
struct RawWindow {
    used_percent: f64,
    window_seconds: u64,
    resets_at: Option<u64>,
    resets_after_seconds: Option<u64>,
}

impl From<RawWindow> for UsageWindow {
    fn from(raw: RawWindow) -> Self {
        UsageWindow {
            used_percent: raw.used_percent,
            window_seconds: raw.window_seconds,
            resets_at: raw.resets_at,
            resets_after_seconds: raw.resets_after_seconds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageFetchError {
    /// 401 with `code=token_expired`: caller should refresh and retry once.
    TokenExpired,
    Auth(String),
    Transient(String),
}

impl From<UsageFetchError> for Error {
    fn from(e: UsageFetchError) -> Self {
        match e {
            UsageFetchError::TokenExpired => Error::auth_failure("usage API: token_expired after retry"),
            UsageFetchError::Auth(msg) => Error::auth_failure(format!("usage API: {msg}")),
            UsageFetchError::Transient(msg) => Error::transient(format!("usage API: {msg}")),
        }
    }
}

/// Parses a successful (2xx) response body into a [`UsageSnapshot`].
/// Pulled out of [`UsageApiClient::fetch`] so response-shape handling is
/// unit-testable without a live server.
fn parse_usage_body(body: &[u8], now_epoch_secs: u64) -> Result<UsageSnapshot, UsageFetchError> {
    let parsed: UsageResponse =
        serde_json::from_slice(body).map_err(|e| UsageFetchError::Transient(e.to_string()))?;
    Ok(UsageSnapshot {
        five_hour: parsed.primary.into(),
        weekly: parsed.secondary.into(),
        fetched_at: now_epoch_secs,
    })
}

/// Classifies a 401 response body: `code=token_expired` is the
/// refresh-and-retry signal, anything else is a hard auth failure.
fn classify_unauthorized(body: &[u8]) -> UsageFetchError {
    let code = serde_json::from_slice::<ErrorBody>(body).ok().and_then(|b| b.code);
    match code.as_deref() {
        Some("token_expired") => UsageFetchError::TokenExpired,
        Some(other) => UsageFetchError::Auth(other.to_string()),
        None => UsageFetchError::Auth("unauthorized".to_string()),
    }
}

/// GETs the usage endpoint with a bearer access token.
pub struct UsageApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl UsageApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    pub async fn fetch(&self, access_token: &str, now_epoch_secs: u64) -> Result<UsageSnapshot, UsageFetchError> {
        let resp = self
            .http
            .get(&self.base_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| UsageFetchError::Transient(e.to_string()))?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| UsageFetchError::Transient(e.to_string()))?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(classify_unauthorized(&body));
        }
        if !status.is_success() {
            return Err(UsageFetchError::Transient(format!("usage API returned {status}")));
        }

        parse_usage_body(&body, now_epoch_secs)
    }
}

#[cfg(test)]
#[path = "usage_client_tests.rs"]
mod tests;
