use super::*;

#[test]
fn block_and_unblock_roundtrip() {
    let mut list = LogoutBlockList::default();
    list.block("Alice");
    assert!(list.contains("alice"));
    assert!(list.contains("ALICE"));
    list.unblock("alice");
    assert!(!list.contains("alice"));
}

#[test]
fn json_roundtrip_is_sorted_and_lowercased() {
    let mut list = LogoutBlockList::default();
    list.block("Zed");
    list.block("alice");
    let json = list.to_json_pretty().unwrap();
    let parsed = LogoutBlockList::from_json(&json).unwrap();
    assert!(parsed.contains("zed"));
    assert!(parsed.contains("alice"));
    assert_eq!(json.find("alice").unwrap() < json.find("zed").unwrap(), true);
}

#[test]
fn from_json_lowercases_stored_entries() {
    let list = LogoutBlockList::from_json(r#"["Bob"]"#).unwrap();
    assert!(list.contains("bob"));
}
