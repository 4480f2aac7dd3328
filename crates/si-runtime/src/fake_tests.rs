use super::*;
use std::time::Duration;

fn dl() -> Deadline {
    Deadline::new(Duration::from_secs(5))
}

#[tokio::test]
async fn create_start_inspect_round_trip() {
    let runtime = FakeRuntime::new();
    let mut spec = ContainerSpec::new("si-codex-alice", "codex:latest");
    spec.workdir = "/workspace".to_string();
    runtime.create_container(&spec, dl()).await.unwrap();
    runtime.start("si-codex-alice", dl()).await.unwrap();

    let info = runtime.inspect_by_name("si-codex-alice", dl()).await.unwrap().unwrap();
    assert!(info.running);
    assert_eq!(info.observed.workdir, "/workspace");
}

#[tokio::test]
async fn inspect_missing_container_returns_none() {
    let runtime = FakeRuntime::new();
    assert!(runtime.inspect_by_name("ghost", dl()).await.unwrap().is_none());
}

#[tokio::test]
async fn remove_missing_container_is_not_found() {
    let runtime = FakeRuntime::new();
    let err = runtime.remove("ghost", true, dl()).await.unwrap_err();
    assert_eq!(err.kind(), si_core::ErrorKind::NotFound);
}

#[tokio::test]
async fn copy_file_in_and_read_file_out_round_trip() {
    let runtime = FakeRuntime::new();
    let spec = ContainerSpec::new("si-codex-alice", "codex:latest");
    runtime.create_container(&spec, dl()).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let host_path = dir.path().join("auth.json");
    std::fs::write(&host_path, b"{\"tokens\":{}}").unwrap();

    runtime.copy_file_in("si-codex-alice", &host_path, "/root/.si/auth.json", dl()).await.unwrap();
    let contents = runtime.read_file_out("si-codex-alice", "/root/.si/auth.json", dl()).await.unwrap();
    assert_eq!(contents, b"{\"tokens\":{}}");
}

#[tokio::test]
async fn read_file_out_missing_file_is_not_found() {
    let runtime = FakeRuntime::new();
    let spec = ContainerSpec::new("si-codex-alice", "codex:latest");
    runtime.create_container(&spec, dl()).await.unwrap();
    let err = runtime.read_file_out("si-codex-alice", "/nope", dl()).await.unwrap_err();
    assert_eq!(err.kind(), si_core::ErrorKind::NotFound);
}

#[tokio::test]
async fn list_filters_by_label_selector() {
    let runtime = FakeRuntime::new();
    let mut spec_a = ContainerSpec::new("si-codex-alice", "codex:latest");
    spec_a.labels.insert("si.component".to_string(), "codex".to_string());
    spec_a.labels.insert("si.codex.profile".to_string(), "alice".to_string());
    runtime.create_container(&spec_a, dl()).await.unwrap();

    let mut spec_b = ContainerSpec::new("si-codex-bob", "codex:latest");
    spec_b.labels.insert("si.component".to_string(), "codex".to_string());
    spec_b.labels.insert("si.codex.profile".to_string(), "bob".to_string());
    runtime.create_container(&spec_b, dl()).await.unwrap();

    let selector = LabelSelector::new().with("si.codex.profile", "alice");
    let found = runtime.list(&selector, dl()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "si-codex-alice");
}
