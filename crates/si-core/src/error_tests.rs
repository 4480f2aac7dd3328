use super::*;

#[test]
fn drift_detected_suggests_respawn() {
    let err = Error::DriftDetected { container: "si-codex-alice".into(), detail: "vault missing".into() };
    assert_eq!(err.remediation(), Some("si respawn <name>"));
    assert_eq!(err.kind(), ErrorKind::DriftDetected);
}

#[test]
fn transient_and_conflict_are_retryable() {
    assert!(Error::transient("timeout").is_retryable());
    assert!(Error::conflict("lock held").is_retryable());
    assert!(!Error::fatal("bad config").is_retryable());
    assert!(!Error::auth_failure("expired").is_retryable());
}

#[test]
fn io_not_found_maps_to_not_found_kind() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: Error = io.into();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn io_would_block_is_transient() {
    let io = std::io::Error::new(std::io::ErrorKind::WouldBlock, "busy");
    let err: Error = io.into();
    assert_eq!(err.kind(), ErrorKind::Transient);
}
