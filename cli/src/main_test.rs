use super::*;

#[test]
fn parse_point_accepts_spaces() {
    assert_eq!(parse_point("12.5, -3").unwrap(), Point::new(12.5, -3.0));
}

#[test]
fn parse_point_rejects_missing_comma() {
    let err = parse_point("12").unwrap_err();
    assert!(err.contains("expected X,Y"));
}

#[test]
fn parse_point_rejects_bad_number() {
    let err = parse_point("1,abc").unwrap_err();
    assert!(err.contains("bad y"));
}

#[test]
fn parse_node_position_splits_id() {
    let pos = parse_node_position("n3:300,0").unwrap();
    assert_eq!(pos, NodePosition { id: "n3".into(), x: 300.0, y: 0.0 });
}

#[test]
fn parse_node_position_requires_id() {
    assert!(parse_node_position(":1,2").is_err());
    assert!(parse_node_position("1,2").is_err());
}

#[test]
fn confirmation_only_on_yes() {
    assert_eq!(confirmation_from("y\n"), Confirmation::Confirmed);
    assert_eq!(confirmation_from(" YES "), Confirmation::Confirmed);
    assert_eq!(confirmation_from("\n"), Confirmation::Declined);
    assert_eq!(confirmation_from("nope"), Confirmation::Declined);
}

#[test]
fn describe_sample_plan() {
    let text = describe_plan(&LoadedPlan::sample());
    assert_eq!(
        text,
        "Sample plan (unsaved): 12 nodes, 19 edges, 0 rooms, 0 fixtures; fallback rendering; uncalibrated"
    );
}

#[test]
fn edge_lengths_in_pixels_when_uncalibrated() {
    let plan = canvas::doc::sample_plan();
    let lines = edge_lines(&plan, &UnitSystem::new(None));
    assert_eq!(lines.len(), 19);
    assert_eq!(lines[0], "e1 wall 150 px");
    assert_eq!(lines[9], "e10 wall 200 px");
}

#[test]
fn edge_lengths_in_meters_when_calibrated() {
    let plan = canvas::doc::sample_plan();
    let lines = edge_lines(&plan, &UnitSystem::new(Some(100.0)));
    assert_eq!(lines[4], "e5 door 1.50 m");
}

#[test]
fn dangling_edge_is_reported() {
    let mut plan = canvas::doc::sample_plan();
    plan.edges[0].target = "ghost".into();
    let lines = edge_lines(&plan, &UnitSystem::new(None));
    assert_eq!(lines[0], "e1 wall dangling");
}

#[test]
fn render_svg_fits_plan_into_viewport() {
    let svg = render_svg(&canvas::doc::sample_plan(), 800.0, 600.0);
    assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="600""#));
    // Fitted camera is pan (175, 100) at zoom 1, so n1 lands there.
    assert!(svg.contains(r#"cx="175" cy="100""#));
}

#[test]
fn render_svg_of_empty_plan_is_background_only() {
    let svg = render_svg(&FloorPlan::default(), 100.0, 50.0);
    assert_eq!(svg.lines().count(), 3);
}

#[test]
fn file_names_fall_back() {
    assert_eq!(file_name_of(Path::new("/tmp/flat.png")), "flat.png");
    assert_eq!(plan_name_from_file(Path::new("/tmp/flat.png")), "flat");
    assert_eq!(plan_name_from_file(Path::new("/")), "Untitled plan");
}
