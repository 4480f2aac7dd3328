use std::sync::Arc;

use si_core::test_support::{profile, required_mounts};
use si_core::ContainerBinding;

use crate::fake::FakeTmux;

use super::*;

fn binding() -> ContainerBinding {
    let required = required_mounts("/home/alice/dev");
    ContainerBinding {
        container_name: "si-codex-alice".to_string(),
        profile_id: "alice".to_string(),
        workspace_host: "/home/alice/dev".to_string(),
        required,
    }
}

fn launch() -> LaunchParams {
    LaunchParams { agent_binary: "codex".to_string(), model: "o3".to_string(), reasoning_effort: "high".to_string() }
}

#[tokio::test]
async fn rejects_without_a_tty() {
    let tmux = Arc::new(FakeTmux::new());
    let supervisor = PaneSupervisor::new(tmux as Arc<dyn TmuxController>);
    let p = profile("alice");
    let binding = binding();

    let err = supervisor
        .attach(&p, &binding, "/home/alice/dev", None, None, &launch(), false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), si_core::ErrorKind::Fatal);
}

#[tokio::test]
async fn creates_session_when_absent() {
    let tmux = Arc::new(FakeTmux::new());
    let supervisor = PaneSupervisor::new(Arc::clone(&tmux) as Arc<dyn TmuxController>);
    let p = profile("alice");
    let binding = binding();

    let outcome =
        supervisor.attach(&p, &binding, "/home/alice/dev", None, None, &launch(), true).await.unwrap();

    assert!(!outcome.reset);
    assert!(tmux.has_session(&p.pane_session_name()).await.unwrap());
    assert!(tmux.command_of(&p.pane_session_name()).unwrap().contains("codex"));
}

#[tokio::test]
async fn reuses_live_session_despite_metadata_drift() {
    let tmux = Arc::new(FakeTmux::new());
    let p = profile("alice");
    let session = p.pane_session_name();

    tmux.seed_session(&session, "old-command", false);
    write_recorded(tmux.as_ref(), &session, "stale-hash", "/some/other/dir", None).await.unwrap();

    let supervisor = PaneSupervisor::new(Arc::clone(&tmux) as Arc<dyn TmuxController>);
    let binding = binding();

    let outcome =
        supervisor.attach(&p, &binding, "/home/alice/dev", None, None, &launch(), true).await.unwrap();

    assert!(!outcome.reset);
    // The live pane is preserved verbatim; its original command is untouched.
    assert_eq!(tmux.command_of(&session).as_deref(), Some("old-command"));
}

#[tokio::test]
async fn resets_when_pane_is_dead() {
    let tmux = Arc::new(FakeTmux::new());
    let p = profile("alice");
    let session = p.pane_session_name();

    tmux.seed_session(&session, "old-command", true);
    write_recorded(tmux.as_ref(), &session, "stale-hash", "/home/alice/dev", None).await.unwrap();

    let supervisor = PaneSupervisor::new(Arc::clone(&tmux) as Arc<dyn TmuxController>);
    let binding = binding();

    let outcome =
        supervisor.attach(&p, &binding, "/home/alice/dev", None, None, &launch(), true).await.unwrap();

    assert!(outcome.reset);
    assert_ne!(tmux.command_of(&session).as_deref(), Some("old-command"));
}

#[tokio::test]
async fn reset_resumes_prior_session_when_recorded() {
    let tmux = Arc::new(FakeTmux::new());
    let p = profile("alice");
    let session = p.pane_session_name();

    tmux.seed_session(&session, "old-command", true);
    write_recorded(tmux.as_ref(), &session, "stale-hash", "/home/alice/dev", Some("sess-9")).await.unwrap();

    let supervisor = PaneSupervisor::new(Arc::clone(&tmux) as Arc<dyn TmuxController>);
    let binding = binding();

    let outcome =
        supervisor.attach(&p, &binding, "/home/alice/dev", None, None, &launch(), true).await.unwrap();

    assert_eq!(outcome.resumed_session_id.as_deref(), Some("sess-9"));
    assert!(tmux.command_of(&session).unwrap().contains("resume sess-9"));
}

#[tokio::test]
async fn attach_reports_exit_code_from_tmux() {
    let tmux = Arc::new(FakeTmux::new());
    tmux.set_attach_exit_code(3);
    let supervisor = PaneSupervisor::new(Arc::clone(&tmux) as Arc<dyn TmuxController>);
    let p = profile("alice");
    let binding = binding();

    let outcome =
        supervisor.attach(&p, &binding, "/home/alice/dev", None, None, &launch(), true).await.unwrap();
    assert_eq!(outcome.exit_code, 3);
}
