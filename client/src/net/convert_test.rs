use super::*;
use canvas::scene::{RenderMode, select_mode};
use serde_json::json;

fn detail() -> FloorPlanDetail {
    serde_json::from_value(json!({
        "id": 11,
        "user_id": 1,
        "name": "Studio",
        "unit_scale": 100.0,
        "nodes": [
            {"id": "a", "x": 0.0, "y": 0.0},
            {"id": "b", "x": 400.0, "y": 0.0},
            {"id": "c", "x": 400.0, "y": 300.0}
        ],
        "edges": [
            {"id": "e1", "from_node": "a", "to_node": "b", "edge_type": "wall", "thickness": 20.0, "is_inner": false},
            {"id": "e2", "from_node": "b", "to_node": "c", "edge_type": "Door"},
            {"id": "e3", "from_node": "c", "to_node": "a", "edge_type": "opening"}
        ],
        "rooms": [{"id": "r1", "polygon_coords": [[0, 0], [400, 0], [400, 300]], "tags": ["bedroom"]}],
        "fixtures": [
            {"id": "f1", "polygon_coords": [[390, 100], [410, 100], [410, 180], [390, 180]], "fixture_type": "door"},
            {"id": "f2", "polygon_coords": [{"x": 1, "y": 2}], "fixture_type": "sink"}
        ]
    }))
    .unwrap()
}

#[test]
fn endpoints_become_source_and_target() {
    let plan = plan_from_detail(&detail());
    let e1 = plan.edge("e1").unwrap();
    assert_eq!(e1.source, "a");
    assert_eq!(e1.target, "b");
    assert_eq!(e1.thickness, Some(20.0));
    assert_eq!(e1.is_inner, Some(false));
}

#[test]
fn edge_types_are_parsed_loosely() {
    let plan = plan_from_detail(&detail());
    assert_eq!(plan.edge("e2").unwrap().kind, EdgeKind::Door);
    assert_eq!(plan.edge("e3").unwrap().kind, EdgeKind::Wall);
}

#[test]
fn polygons_become_points() {
    let plan = plan_from_detail(&detail());
    let room = plan.room("r1").unwrap();
    assert_eq!(room.polygon, vec![Point::new(0.0, 0.0), Point::new(400.0, 0.0), Point::new(400.0, 300.0)]);
    assert!(!room.locked);
    assert_eq!(plan.fixtures[1].polygon, vec![Point::new(1.0, 2.0)]);
}

#[test]
fn fixture_types_map_to_kinds() {
    let plan = plan_from_detail(&detail());
    assert_eq!(plan.fixtures[0].kind, FixtureKind::Door);
    assert_eq!(plan.fixtures[1].kind, FixtureKind::Other);
}

#[test]
fn converted_plan_with_thickness_is_rich() {
    assert_eq!(select_mode(&plan_from_detail(&detail())), RenderMode::Rich);
}

#[test]
fn empty_graph_converts_to_empty_plan() {
    assert_eq!(plan_from_graph(&PlanGraph::default()), FloorPlan::default());
}

#[test]
fn kind_parsers_ignore_case_and_whitespace() {
    assert_eq!(edge_kind(" WINDOW "), EdgeKind::Window);
    assert_eq!(fixture_kind("Window"), FixtureKind::Window);
}
