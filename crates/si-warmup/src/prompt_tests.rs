use std::sync::Arc;

use si_core::test_support::{profile, FakeSettings};
use si_runtime::fake::FakeRuntime;
use si_runtime::{ContainerRuntime, Deadline, ExecOutput};
use tempfile::tempdir;

use super::*;

fn launch() -> WarmupLaunchParams {
    WarmupLaunchParams {
        agent_binary: "codex".to_string(),
        model: "o3".to_string(),
        reasoning_effort: "high".to_string(),
    }
}

#[test]
fn attempt_one_is_the_base_prompt() {
    assert_eq!(warm_prompt(1), BASE_PROMPT);
}

#[test]
fn attempt_two_extends_the_base_prompt() {
    let p = warm_prompt(2);
    assert!(p.starts_with(BASE_PROMPT));
    assert!(p.len() > BASE_PROMPT.len());
}

#[test]
fn attempt_three_inflates_with_filler() {
    let p = warm_prompt(3);
    assert!(p.contains(BASE_PROMPT));
    assert!(p.len() > warm_prompt(2).len() * 5);
}

#[tokio::test]
async fn run_warm_attempt_creates_and_removes_the_ephemeral_container() {
    let dir = tempdir().unwrap();
    let auth_path = dir.path().join("auth.json");
    std::fs::write(&auth_path, "{}").unwrap();

    let runtime = Arc::new(FakeRuntime::new());
    let settings = FakeSettings::new(dir.path());
    let p = profile("alice");

    let command_key = "codex exec --model o3 --reasoning-effort high";
    runtime.set_exec_response(command_key, ExecOutput { stdout: b"hello".to_vec(), stderr: Vec::new(), exit_code: 0 });

    let output = run_warm_attempt(
        &settings,
        runtime.as_ref() as &dyn ContainerRuntime,
        &p,
        &auth_path,
        &launch(),
        1,
        false,
        Deadline::from_secs(30),
    )
    .await
    .unwrap();

    assert!(output.success());
    assert_eq!(output.stdout_string(), "hello");
    // Ephemeral: gone again once the attempt finishes.
    assert!(runtime.container_names().is_empty());
}

#[tokio::test]
async fn run_warm_attempt_writes_no_mcp_config_when_requested() {
    let dir = tempdir().unwrap();
    let auth_path = dir.path().join("auth.json");
    std::fs::write(&auth_path, "{}").unwrap();

    let runtime = Arc::new(FakeRuntime::new());
    let settings = FakeSettings::new(dir.path());
    let p = profile("alice");

    // No exec response seeded: default ExecOutput is exit_code 0, empty
    // stdout, which is fine for this test's purpose.
    let output = run_warm_attempt(
        &settings,
        runtime.as_ref() as &dyn ContainerRuntime,
        &p,
        &auth_path,
        &launch(),
        1,
        true,
        Deadline::from_secs(30),
    )
    .await
    .unwrap();

    assert!(output.success());
}
