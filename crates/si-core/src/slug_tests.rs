use super::*;

#[test]
fn lowercases_mixed_case() {
    assert_eq!(normalize("Alice").unwrap(), "alice");
}

#[test]
fn accepts_digits_and_separators() {
    assert_eq!(normalize("alice-2").unwrap(), "alice-2");
    assert_eq!(normalize("alice_2").unwrap(), "alice_2");
}

#[test]
fn rejects_empty() {
    assert!(normalize("").is_err());
}

#[test]
fn rejects_leading_or_trailing_separator() {
    assert!(normalize("-alice").is_err());
    assert!(normalize("alice-").is_err());
    assert!(normalize("_alice").is_err());
}

#[test]
fn rejects_non_ascii_alphabet() {
    assert!(normalize("alice!").is_err());
    assert!(normalize("alice bob").is_err());
    assert!(normalize("al\u{00ef}ce").is_err());
}

#[test]
fn rejects_over_max_len() {
    let long = "a".repeat(64);
    assert!(normalize(&long).is_err());
    let ok = "a".repeat(63);
    assert!(normalize(&ok).is_ok());
}

#[test]
fn container_and_pane_names_are_derived_consistently() {
    assert_eq!(container_name("alice"), "si-codex-alice");
    assert_eq!(pane_session_name("alice"), "si-codex-pane-alice");
}
