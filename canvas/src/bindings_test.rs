use super::*;

fn decoded(actions: &[Action]) -> Value {
    serde_json::from_str(&actions_json(actions)).unwrap()
}

#[test]
fn actions_encode_as_tagged_objects() {
    let json = decoded(&[
        Action::EdgeClicked("e1".into()),
        Action::RoomLockToggled { id: "r1".into(), locked: true },
        Action::SetCursor("grabbing"),
        Action::RenderNeeded,
    ]);
    assert_eq!(
        json,
        json!([
            { "type": "edge_clicked", "id": "e1" },
            { "type": "room_lock_toggled", "id": "r1", "locked": true },
            { "type": "set_cursor", "cursor": "grabbing" },
            { "type": "render_needed" },
        ])
    );
}

#[test]
fn fixture_click_carries_id() {
    assert_eq!(decoded(&[Action::FixtureClicked("f2".into())]), json!([{ "type": "fixture_clicked", "id": "f2" }]));
}

#[test]
fn no_actions_is_empty_array() {
    assert_eq!(actions_json(&[]), "[]");
}

#[test]
fn dom_buttons_map_to_engine_buttons() {
    assert_eq!(button_from_dom(0), Some(Button::Primary));
    assert_eq!(button_from_dom(1), Some(Button::Middle));
    assert_eq!(button_from_dom(2), Some(Button::Secondary));
    assert_eq!(button_from_dom(3), None);
    assert_eq!(button_from_dom(-1), None);
}

#[test]
fn plan_json_loads_with_optional_parts_missing() {
    let plan = parse_plan(
        r#"{
            "nodes": [{"id": "a", "x": 0, "y": 0}, {"id": "b", "x": 100, "y": 0}],
            "edges": [{"id": "e1", "source": "a", "target": "b", "type": "wall"}]
        }"#,
    )
    .unwrap();
    assert_eq!(plan.nodes.len(), 2);
    assert_eq!(plan.edges[0].target, "b");
    assert!(plan.rooms.is_empty());
    assert!(plan.fixtures.is_empty());
}

#[test]
fn sample_plan_survives_the_boundary() {
    let json = serde_json::to_string(&sample_plan()).unwrap();
    assert_eq!(parse_plan(&json).unwrap(), sample_plan());
}

#[test]
fn malformed_plan_is_an_error() {
    assert!(parse_plan(r#"{"nodes": 3}"#).is_err());
    assert!(parse_plan("").is_err());
}
