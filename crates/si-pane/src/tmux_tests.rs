use super::*;

#[test]
fn classify_tmux_failure_detects_not_found() {
    let e = classify_tmux_failure("can't find session: si-codex-pane-alice");
    assert_eq!(e.kind(), si_core::ErrorKind::NotFound);
}

#[test]
fn classify_tmux_failure_defaults_fatal() {
    let e = classify_tmux_failure("open terminal failed: not a terminal");
    assert_eq!(e.kind(), si_core::ErrorKind::Fatal);
}

#[tokio::test]
async fn read_write_recorded_round_trips_through_fake() {
    let tmux = crate::fake::FakeTmux::new();
    tmux.seed_session("si-codex-pane-alice", "echo hi", false);

    write_recorded(&tmux, "si-codex-pane-alice", "hash123", "/home/u/dev", Some("resume-1")).await.unwrap();
    let recorded = read_recorded(&tmux, "si-codex-pane-alice").await.unwrap();

    assert_eq!(recorded.command_shape_hash.as_deref(), Some("hash123"));
    assert_eq!(recorded.host_cwd.as_deref(), Some("/home/u/dev"));
    assert_eq!(recorded.resume_session_id.as_deref(), Some("resume-1"));
}

#[tokio::test]
async fn write_recorded_without_resume_id_leaves_it_unset() {
    let tmux = crate::fake::FakeTmux::new();
    tmux.seed_session("si-codex-pane-bob", "echo hi", false);

    write_recorded(&tmux, "si-codex-pane-bob", "hash456", "/home/u/dev", None).await.unwrap();
    let recorded = read_recorded(&tmux, "si-codex-pane-bob").await.unwrap();

    assert_eq!(recorded.resume_session_id, None);
}
