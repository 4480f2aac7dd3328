use super::*;

#[test]
fn handle_list_prints_empty_message_for_text() {
    let items: Vec<ContainerRecord> = Vec::new();
    handle_list(OutputFormat::Text, &items, "no containers", |_| {
        panic!("render_text must not be called for an empty list");
    })
    .unwrap();
}

#[test]
fn handle_list_invokes_render_for_non_empty_text() {
    let items = vec![ContainerRecord { name: "si-codex-alice".to_string(), profile_id: "alice".to_string(), running: true }];
    let mut rendered = false;
    handle_list(OutputFormat::Text, &items, "no containers", |rows| {
        rendered = rows.len() == 1;
    })
    .unwrap();
    assert!(rendered);
}

#[test]
fn format_or_json_calls_text_fn_for_text_format() {
    let mut called = false;
    format_or_json(OutputFormat::Text, &serde_json::json!({}), || called = true).unwrap();
    assert!(called);
}
