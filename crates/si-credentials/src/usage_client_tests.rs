use super::*;

#[test]
fn parses_two_windows_from_upstream_shape() {
    let body = br#"{
        "primary": {"used_percent": 42.5, "window_seconds": 18000, "resets_at": 1700004800},
        "secondary": {"used_percent": 0.0, "window_seconds": 604800, "resets_after_seconds": 604800}
    }"#;

    let snapshot = parse_usage_body(body, 1_700_000_000).unwrap();
    assert_eq!(snapshot.five_hour.used_percent, 42.5);
    assert_eq!(snapshot.five_hour.resets_at, Some(1_700_004_800));
    assert_eq!(snapshot.weekly.resets_after_seconds, Some(604_800));
    assert!(snapshot.weekly.is_full_limit());
    assert_eq!(snapshot.fetched_at, 1_700_000_000);
}

#[test]
fn malformed_body_is_transient() {
    let err = parse_usage_body(b"not json", 0).unwrap_err();
    assert!(matches!(err, UsageFetchError::Transient(_)));
}

#[test]
fn token_expired_code_maps_to_retry_signal() {
    let body = br#"{"code":"token_expired"}"#;
    assert_eq!(classify_unauthorized(body), UsageFetchError::TokenExpired);
}

#[test]
fn other_401_code_is_auth_failure() {
    let body = br#"{"code":"invalid_client"}"#;
    match classify_unauthorized(body) {
        UsageFetchError::Auth(code) => assert_eq!(code, "invalid_client"),
        other => panic!("expected Auth, got {other:?}"),
    }
}

#[test]
fn missing_code_on_401_is_generic_auth_failure() {
    let body = b"{}";
    match classify_unauthorized(body) {
        UsageFetchError::Auth(code) => assert_eq!(code, "unauthorized"),
        other => panic!("expected Auth, got {other:?}"),
    }
}

#[test]
fn usage_fetch_error_converts_to_core_error_kind() {
    let e: Error = UsageFetchError::TokenExpired.into();
    assert_eq!(e.kind(), si_core::ErrorKind::AuthFailure);
    let e: Error = UsageFetchError::Transient("boom".to_string()).into();
    assert_eq!(e.kind(), si_core::ErrorKind::Transient);
}
