use tempfile::tempdir;

use super::*;

#[test]
fn reading_before_any_write_returns_empty() {
    let dir = tempdir().unwrap();
    assert!(read_transitions(dir.path()).unwrap().is_empty());
}

#[test]
fn append_then_read_preserves_order_and_fields() {
    let dir = tempdir().unwrap();
    append_transition(dir.path(), LogLevel::Info, "ready", "alice", serde_json::json!({}), 100).unwrap();
    append_transition(
        dir.path(),
        LogLevel::Warn,
        "auth_failure",
        "alice",
        serde_json::json!({"detail": "expired"}),
        200,
    )
    .unwrap();

    let records = read_transitions(dir.path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["event"], "ready");
    assert_eq!(records[0]["level"], "info");
    assert_eq!(records[1]["event"], "auth_failure");
    assert_eq!(records[1]["extras"]["detail"], "expired");
}
