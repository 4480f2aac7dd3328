// SPDX-License-Identifier: MIT

//! Minimal JWT payload inspection.
//!
//! si never verifies a JWT signature — the token was issued by an upstream
//! auth server and is trusted once it's in `auth.json`. All we need is the
//! `exp` claim (for validity) and the `aud` claim (to recover the refresh
//! client id). Decoding tolerates both URL-safe and standard base64
//! alphabets, and both padded and unpadded variants, because different
//! token issuers have been observed to emit either.

use base64::Engine;
use serde_json::Value;

/// A JWT that fails to parse as three dot-separated segments, or whose
/// payload segment isn't valid base64/JSON, is simply "not a JWT" rather
/// than malformed — many `access_token` values are opaque strings, not
/// JWTs, and that's a valid state (see `validate_auth_file` in `auth.rs`).
pub fn decode_payload(token: &str) -> Option<Value> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;
    if parts.next().is_none() {
        // Needs exactly 3 segments (header.payload.signature).
        return None;
    }

    let bytes = decode_tolerant(payload)?;
    serde_json::from_slice(&bytes).ok()
}

/// Decode a single base64 segment, trying URL-safe then standard, each
/// with and without padding.
fn decode_tolerant(segment: &str) -> Option<Vec<u8>> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE.decode(segment))
        .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(segment))
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(segment))
        .ok()
}

/// Extract the `exp` claim as epoch seconds, if present and numeric.
pub fn exp_claim(token: &str) -> Option<u64> {
    decode_payload(token)?.get("exp")?.as_u64()
}

/// Extract the `aud` claim (string form; first entry if an array), used to
/// recover the refresh client id without separate configuration.
pub fn aud_claim(token: &str) -> Option<String> {
    let payload = decode_payload(token)?;
    match payload.get("aud")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first()?.as_str().map(str::to_owned),
        _ => None,
    }
}

/// Whether a token with an `exp` claim is still valid as of `now_epoch_secs`.
/// A token with no `exp` claim at all is neither expired nor unexpired by
/// this function — callers treat "no exp" as "can't tell, assume fine"
/// (only JWTs *with* an `exp` claim are checked).
pub fn is_expired(token: &str, now_epoch_secs: u64) -> Option<bool> {
    exp_claim(token).map(|exp| exp <= now_epoch_secs)
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
