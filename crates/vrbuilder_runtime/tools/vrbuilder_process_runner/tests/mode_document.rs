use serde_json::json;
use vrbuilder_core::mode::{Mode, TypeRule, DEFAULT_MODE_NAME};
use vrbuilder_process_runner::modes::{merge_requested, modes_from_slice};

fn known_modes() -> Vec<u8> {
    serde_json::to_vec(&json!([
        { "name": "guided" },
        { "name": "exam", "rule": { "blacklist": ["delay"] } }
    ]))
    .expect("encode")
}

#[test]
fn mode_document_lists_modes_in_order() {
    let modes = modes_from_slice(&known_modes()).expect("parse");
    let names: Vec<_> = modes.modes().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["guided", "exam"]);
    assert_eq!(modes.current().name, "guided");
    assert!(!modes.modes()[1].allows("delay"));
}

#[test]
fn empty_document_falls_back_to_default_mode() {
    let modes = modes_from_slice(b"[]").expect("parse");
    assert_eq!(modes.current().name, DEFAULT_MODE_NAME);
}

#[test]
fn bare_name_selects_a_known_mode() {
    let mut modes = modes_from_slice(&known_modes()).expect("parse");

    let selected = merge_requested(&mut modes, Some(Mode::new("exam")));
    assert_eq!(selected.as_deref(), Some("exam"));
    assert_eq!(modes.modes().len(), 2);
    assert!(!modes.select("exam").expect("known").allows("delay"));
}

#[test]
fn typed_or_unknown_modes_are_added() {
    let mut modes = modes_from_slice(&known_modes()).expect("parse");

    merge_requested(&mut modes, Some(Mode::new("exam").with_blacklist(["timeout"])));
    merge_requested(&mut modes, Some(Mode::new("free play")));
    assert_eq!(modes.modes().len(), 3);

    let exam = modes.select("exam").expect("replaced").clone();
    assert_eq!(exam.rule, TypeRule::Blacklist(["timeout".to_string()].into()));
    assert!(merge_requested(&mut modes, None).is_none());
}
