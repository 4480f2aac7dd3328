use super::*;
use serde_json::json;

#[test]
fn classify_cli_failure_detects_not_found() {
    let e = classify_cli_failure("Error: No such container: si-codex-alice");
    assert_eq!(e.kind(), si_core::ErrorKind::NotFound);
}

#[test]
fn classify_cli_failure_detects_transient() {
    let e = classify_cli_failure("Cannot connect to the Docker daemon at unix:///var/run/docker.sock");
    assert_eq!(e.kind(), si_core::ErrorKind::Transient);
}

#[test]
fn classify_cli_failure_defaults_fatal() {
    let e = classify_cli_failure("Error: invalid reference format");
    assert_eq!(e.kind(), si_core::ErrorKind::Fatal);
}

#[test]
fn parse_container_info_extracts_shape() {
    let value = json!({
        "Name": "/si-codex-alice",
        "State": {"Running": true},
        "Config": {
            "Labels": {"si.component": "codex", "si.codex.profile": "alice"},
            "Env": ["WORKDIR=/workspace", "FOO=bar"],
            "WorkingDir": "/workspace",
        },
        "HostConfig": {
            "Binds": ["/home/u/dev:/workspace", "/home/u/dev:/home/u/dev:ro"],
        },
        "Mounts": [
            {"Type": "volume", "Name": "si-codex-alice-home", "Destination": "/home/agent"},
        ],
    });

    let info = parse_container_info(&value);
    assert_eq!(info.name, "si-codex-alice");
    assert!(info.running);
    assert_eq!(info.labels.get("si.codex.profile"), Some(&"alice".to_string()));
    assert_eq!(info.observed.workdir, "/workspace");
    assert_eq!(info.observed.env.get("FOO"), Some(&"bar".to_string()));
    assert!(info.observed.binds.contains(&BindMount::new("/home/u/dev", "/workspace")));
    assert!(info.observed.volumes.contains(&"si-codex-alice-home".to_string()));
}
