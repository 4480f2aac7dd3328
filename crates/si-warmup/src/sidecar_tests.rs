use std::sync::Arc;

use si_core::test_support::FakeSettings;
use si_core::WarmupMarkers;
use si_runtime::fake::FakeRuntime;
use si_runtime::{ContainerRuntime, Deadline};
use tempfile::tempdir;

use super::*;

#[test]
fn render_includes_schedule_and_container_name() {
    let rendered = render_ofelia_config("/usr/local/bin/si");
    assert!(rendered.contains("@every 5m"));
    assert!(rendered.contains(SIDECAR_CONTAINER_NAME));
    assert!(rendered.contains("warmup reconcile --quiet"));
}

#[test]
fn markers_default_to_absent() {
    let dir = tempdir().unwrap();
    let settings = FakeSettings::new(dir.path());
    let markers = read_markers(dir.path(), &settings);
    assert!(!markers.autostart_present);
    assert!(!markers.disabled_present);
}

#[tokio::test]
async fn enable_then_markers_report_autostart() {
    let dir = tempdir().unwrap();
    let settings = FakeSettings::new(dir.path());
    let runtime = Arc::new(FakeRuntime::new());

    enable(dir.path(), &settings, runtime.as_ref() as &dyn ContainerRuntime, "/usr/local/bin/si", "si-warmup-vol", Deadline::from_secs(60))
        .await
        .unwrap();

    let markers = read_markers(dir.path(), &settings);
    assert!(markers.autostart_present);
    assert!(!markers.disabled_present);
    assert!(runtime.container_names().contains(&SIDECAR_CONTAINER_NAME.to_string()));
}

#[tokio::test]
async fn disable_after_enable_removes_the_sidecar_and_writes_marker() {
    let dir = tempdir().unwrap();
    let settings = FakeSettings::new(dir.path());
    let runtime = Arc::new(FakeRuntime::new());

    enable(dir.path(), &settings, runtime.as_ref() as &dyn ContainerRuntime, "/usr/local/bin/si", "si-warmup-vol", Deadline::from_secs(60))
        .await
        .unwrap();
    disable(dir.path(), &settings, runtime.as_ref() as &dyn ContainerRuntime, Deadline::from_secs(60)).await.unwrap();

    let markers = read_markers(dir.path(), &settings);
    assert!(markers.disabled_present);
    assert!(!runtime.container_names().contains(&SIDECAR_CONTAINER_NAME.to_string()));
}

#[test]
fn needs_repair_true_only_when_wanted_and_not_running() {
    let wants = WarmupMarkers { autostart_present: true, disabled_present: false };
    assert!(needs_repair(wants, false, false));
    assert!(!needs_repair(wants, false, true));

    let disabled = WarmupMarkers { autostart_present: true, disabled_present: true };
    assert!(!needs_repair(disabled, false, false));
}

#[test]
fn legacy_installation_detected_when_state_exists_without_markers() {
    let dir = tempdir().unwrap();
    let state_path = si_core::paths::warmup_state_path(dir.path());
    std::fs::create_dir_all(state_path.parent().unwrap()).unwrap();
    std::fs::write(&state_path, "{}").unwrap();

    let markers = WarmupMarkers::default();
    assert!(is_legacy_installation(dir.path(), markers));

    let with_marker = WarmupMarkers { autostart_present: true, disabled_present: false };
    assert!(!is_legacy_installation(dir.path(), with_marker));
}
