use super::*;

#[test]
fn label_selector_matches_subset() {
    let selector = LabelSelector::new().with("si.component", "codex");
    let mut labels = BTreeMap::new();
    labels.insert("si.component".to_string(), "codex".to_string());
    labels.insert("si.name".to_string(), "alice".to_string());
    assert!(selector.matches(&labels));
}

#[test]
fn label_selector_rejects_mismatch() {
    let selector = LabelSelector::new().with("si.component", "codex");
    let mut labels = BTreeMap::new();
    labels.insert("si.component".to_string(), "other".to_string());
    assert!(!selector.matches(&labels));
}

#[test]
fn exec_output_success_and_stdout_string() {
    let out = ExecOutput { stdout: b"hello".to_vec(), stderr: Vec::new(), exit_code: 0 };
    assert!(out.success());
    assert_eq!(out.stdout_string(), "hello");
}
