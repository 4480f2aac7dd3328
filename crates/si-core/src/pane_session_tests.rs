use super::*;

fn recorded() -> PaneSession {
    PaneSession::new("si-codex-pane-alice", "hash-a", "/home/alice/dev")
}

#[test]
fn alive_pane_never_resets_despite_drift() {
    let r = recorded();
    assert!(!should_reset_session(false, &r, "hash-a", "/home/alice/dev"));
    assert!(!should_reset_session(false, &r, "hash-b", "/home/alice/dev"));
    assert!(!should_reset_session(false, &r, "hash-a", "/home/alice/sub"));
    assert!(!should_reset_session(false, &r, "hash-b", "/home/alice/sub"));
}

#[test]
fn dead_pane_always_resets() {
    let r = recorded();
    assert!(should_reset_session(true, &r, "hash-a", "/home/alice/dev"));
    assert!(should_reset_session(true, &r, "hash-b", "/home/alice/other"));
}

mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn never_resets_while_alive(hash in ".*", cwd in ".*") {
            let r = recorded();
            prop_assert!(!should_reset_session(false, &r, &hash, &cwd));
        }
    }
}
