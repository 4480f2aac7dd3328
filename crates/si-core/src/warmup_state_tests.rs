use super::*;

#[test]
fn select_skips_before_next_due() {
    assert!(!should_select(100, 200, false, false, Some(50.0)));
}

#[test]
fn select_runs_at_or_after_next_due() {
    assert!(should_select(200, 200, false, false, Some(50.0)));
    assert!(should_select(300, 200, false, false, Some(50.0)));
}

#[test]
fn select_forced_or_targeted_ignores_next_due() {
    assert!(should_select(0, 1_000_000, true, false, Some(50.0)));
    assert!(should_select(0, 1_000_000, false, true, Some(50.0)));
}

#[test]
fn select_runs_early_at_full_limit_boundary() {
    assert!(should_select(0, 1_000_000, false, false, Some(0.5)));
    assert!(!should_select(0, 1_000_000, false, false, Some(5.0)));
}

#[test]
fn markers_disabled_wins_over_autostart() {
    let m = WarmupMarkers { autostart_present: true, disabled_present: true };
    assert!(!m.wants_sidecar(false));
}

#[test]
fn markers_legacy_state_treated_as_autostart() {
    let m = WarmupMarkers::default();
    assert!(m.wants_sidecar(true));
    assert!(!m.wants_sidecar(false));
}

#[test]
fn state_document_upsert_and_prune() {
    let mut doc = WarmupStateDocument::new();
    doc.upsert(WarmupProfileState::new("alice"));
    doc.upsert(WarmupProfileState::new("bob"));
    assert!(doc.get("alice").is_some());
    doc.retain_profiles(&["alice".to_string()]);
    assert!(doc.get("alice").is_some());
    assert!(doc.get("bob").is_none());
}
