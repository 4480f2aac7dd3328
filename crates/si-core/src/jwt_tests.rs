use super::*;
use base64::Engine;

fn make_token(payload_json: &str, url_safe: bool, padded: bool) -> String {
    let engine: &dyn Fn(&[u8]) -> String = &|b: &[u8]| match (url_safe, padded) {
        (true, true) => base64::engine::general_purpose::URL_SAFE.encode(b),
        (true, false) => base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b),
        (false, true) => base64::engine::general_purpose::STANDARD.encode(b),
        (false, false) => base64::engine::general_purpose::STANDARD_NO_PAD.encode(b),
    };
    let header = engine(b"{\"alg\":\"none\"}");
    let payload = engine(payload_json.as_bytes());
    format!("{header}.{payload}.sig")
}

#[test]
fn decodes_url_safe_unpadded() {
    let token = make_token(r#"{"exp": 100}"#, true, false);
    assert_eq!(exp_claim(&token), Some(100));
}

#[test]
fn decodes_url_safe_padded() {
    let token = make_token(r#"{"exp": 100}"#, true, true);
    assert_eq!(exp_claim(&token), Some(100));
}

#[test]
fn decodes_standard_unpadded() {
    let token = make_token(r#"{"exp": 100}"#, false, false);
    assert_eq!(exp_claim(&token), Some(100));
}

#[test]
fn decodes_standard_padded() {
    let token = make_token(r#"{"exp": 100}"#, false, true);
    assert_eq!(exp_claim(&token), Some(100));
}

#[test]
fn non_jwt_opaque_token_has_no_claims() {
    assert_eq!(exp_claim("not-a-jwt-just-opaque"), None);
    assert_eq!(aud_claim("not-a-jwt-just-opaque"), None);
}

#[test]
fn aud_claim_handles_string_and_array() {
    let string_aud = make_token(r#"{"aud": "client-123"}"#, true, false);
    assert_eq!(aud_claim(&string_aud), Some("client-123".to_string()));

    let array_aud = make_token(r#"{"aud": ["client-abc", "other"]}"#, true, false);
    assert_eq!(aud_claim(&array_aud), Some("client-abc".to_string()));
}

#[test]
fn is_expired_true_in_the_past_false_in_the_future() {
    let token = make_token(r#"{"exp": 1000}"#, true, false);
    assert_eq!(is_expired(&token, 1001), Some(true));
    assert_eq!(is_expired(&token, 999), Some(false));
    assert_eq!(is_expired(&token, 1000), Some(true)); // strictly after now required
}

#[test]
fn missing_exp_claim_is_indeterminate() {
    let token = make_token(r#"{"aud": "client"}"#, true, false);
    assert_eq!(is_expired(&token, 1000), None);
}
