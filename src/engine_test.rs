#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::doc::ElementKind;
use crate::geom::Size;
use crate::surface::Color;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(ElementKind::Rect, pt(x, y), Size::new(w, h))
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn shift() -> Modifiers {
    Modifiers { shift: true, ..Default::default() }
}

fn alt() -> Modifiers {
    Modifiers { alt: true, ..Default::default() }
}

fn key(name: &str) -> Key {
    Key(name.to_owned())
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn has_render_needed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::RenderNeeded))
}

fn has_selection_changed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::SelectionChanged { .. }))
}

/// Core with one 20x20 rect centered at (50, 50).
fn core_with_rect() -> (EngineCore, ElementId) {
    let mut core = EngineCore::new();
    let e = rect(50.0, 50.0, 20.0, 20.0);
    let id = e.id;
    core.insert(e);
    (core, id)
}

fn drag(core: &mut EngineCore, from: Point, to: Point, modifiers: Modifiers) -> Vec<Action> {
    let mut actions = core.on_pointer_down(from, Button::Primary, modifiers);
    actions.extend(core.on_pointer_move(to, modifiers));
    actions.extend(core.on_pointer_up(to, Button::Primary, modifiers));
    actions
}

// =============================================================
// Construction
// =============================================================

#[test]
fn core_defaults() {
    let core = EngineCore::new();
    assert!(core.selection().is_empty());
    assert!(core.doc.is_empty());
    assert_eq!(core.ui.tool, Tool::Grab);
    assert!(core.input.is_idle());
    assert!(core.transform_box().is_empty());
    assert_eq!(core.surface().size(), (800, 600));
}

#[test]
fn with_config_sizes_surface() {
    let config = EngineConfig { canvas_width: 32, canvas_height: 16, ..EngineConfig::default() };
    let core = EngineCore::with_config(config);
    assert_eq!(core.surface().size(), (32, 16));
}

// =============================================================
// Loading
// =============================================================

#[test]
fn load_elements_json_replaces_doc_and_clears_selection() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);
    let raw = json!([
        {"id": Uuid::new_v4(), "kind": "rect", "size": {"width": 4, "height": 4},
         "filters": [{"id": "drop-shadow"}, {"id": "no-such-filter"}]},
    ])
    .to_string();
    assert_eq!(core.load_elements_json(&raw).unwrap(), 1);
    assert!(core.selection().is_empty());
    assert!(core.transform_box().is_empty());
    let loaded = core.doc.sorted_elements()[0].clone();
    assert_eq!(loaded.filters.len(), 1);
}

#[test]
fn load_elements_json_error_keeps_doc() {
    let (mut core, id) = core_with_rect();
    assert!(core.load_elements_json("[{").is_err());
    assert!(core.element(&id).is_some());
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_builds_transform_box() {
    let (mut core, id) = core_with_rect();
    let actions = core.select(&[id, Uuid::new_v4()]);
    assert_eq!(core.selection(), &[id]);
    assert!(actions.contains(&Action::SelectionChanged { ids: vec![id] }));
    assert!(has_render_needed(&actions));
    assert_eq!(core.transform_box().position(), pt(50.0, 50.0));
}

#[test]
fn clear_selection_empties_box() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);
    core.clear_selection();
    assert!(core.selection().is_empty());
    assert!(core.transform_box().bounding_box().is_none());
}

#[test]
fn click_on_element_selects_and_grabs() {
    let (mut core, id) = core_with_rect();
    let actions = drag(&mut core, pt(50.0, 50.0), pt(60.0, 70.0), no_modifiers());
    assert!(has_selection_changed(&actions));
    assert!(actions.contains(&Action::TransformChanged { ids: vec![id] }));
    assert!(actions.contains(&Action::TransformCommitted { ids: vec![id] }));
    assert_eq!(core.element(&id).unwrap().position, pt(60.0, 70.0));
    assert!(core.input.is_idle());
}

#[test]
fn shift_click_toggles_membership() {
    let (mut core, a) = core_with_rect();
    let other = rect(150.0, 50.0, 20.0, 20.0);
    let b = other.id;
    core.insert(other);

    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_up(pt(50.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_down(pt(150.0, 50.0), Button::Primary, shift());
    core.on_pointer_up(pt(150.0, 50.0), Button::Primary, shift());
    assert_eq!(core.selection(), &[a, b]);

    // Shift-clicking a selected element drops it without starting a drag.
    let actions = core.on_pointer_down(pt(150.0, 50.0), Button::Primary, shift());
    assert!(actions.contains(&Action::SelectionChanged { ids: vec![a] }));
    assert!(core.input.is_idle());
    assert_eq!(core.transform_box().position(), pt(50.0, 50.0));
}

#[test]
fn click_on_empty_canvas_clears_and_marquee_selects() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);

    let down = core.on_pointer_down(pt(200.0, 200.0), Button::Primary, no_modifiers());
    assert!(has_selection_changed(&down));
    assert!(core.selection().is_empty());
    assert!(matches!(core.input, InputState::Marquee { .. }));

    core.on_pointer_move(pt(0.0, 0.0), no_modifiers());
    let up = core.on_pointer_up(pt(0.0, 0.0), Button::Primary, no_modifiers());
    assert!(up.contains(&Action::SelectionChanged { ids: vec![id] }));
    assert_eq!(core.selection(), &[id]);
}

#[test]
fn secondary_button_is_ignored() {
    let (mut core, _) = core_with_rect();
    assert!(core.on_pointer_down(pt(50.0, 50.0), Button::Secondary, no_modifiers()).is_empty());
    assert!(core.input.is_idle());
}

// =============================================================
// Tools
// =============================================================

#[test]
fn escape_cancels_drag() {
    let (mut core, id) = core_with_rect();
    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(90.0, 90.0), no_modifiers());
    assert_eq!(core.element(&id).unwrap().position, pt(90.0, 90.0));

    let actions = core.on_key_down(&key("Escape"), no_modifiers());
    assert!(has_render_needed(&actions));
    assert_eq!(core.element(&id).unwrap().position, pt(50.0, 50.0));
    assert_eq!(core.transform_box().position(), pt(50.0, 50.0));
    assert!(core.input.is_idle());

    // Release after cancel commits nothing.
    let up = core.on_pointer_up(pt(90.0, 90.0), Button::Primary, no_modifiers());
    assert!(up.is_empty());
}

#[test]
fn escape_when_idle_clears_selection() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);
    core.on_key_down(&key("Escape"), no_modifiers());
    assert!(core.selection().is_empty());
}

#[test]
fn alt_click_places_anchor_that_survives_tool_switch() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);
    let actions = core.on_pointer_down(pt(50.0, 0.0), Button::Primary, alt());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(core.input.is_idle());

    core.set_tool(Tool::Rotate);
    assert_eq!(core.transform_box().anchor_point(), pt(50.0, 0.0));

    // Half a turn about the anchor.
    drag(&mut core, pt(50.0, 10.0), pt(50.0, -10.0), no_modifiers());
    assert!(core.element(&id).unwrap().position.approx_eq(pt(50.0, -50.0), 1e-6));
}

#[test]
fn rotate_tool_turns_selection() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);
    let actions = core.set_tool(Tool::Rotate);
    assert!(has_action(&actions, |a| matches!(a, Action::SetCursor(_))));
    drag(&mut core, pt(100.0, 50.0), pt(50.0, 100.0), no_modifiers());
    assert!((core.element(&id).unwrap().rotation - 90.0).abs() < 1e-9);
}

#[test]
fn scale_tool_drags_a_handle() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);
    core.set_tool(Tool::Scale);
    drag(&mut core, pt(60.0, 60.0), pt(80.0, 80.0), no_modifiers());
    let e = core.element(&id).unwrap();
    assert!(e.scale.approx_eq(pt(2.0, 2.0), 1e-9));
    assert!(e.position.approx_eq(pt(60.0, 60.0), 1e-9));
}

#[test]
fn rotate_with_nothing_selected_does_nothing() {
    let (mut core, id) = core_with_rect();
    core.set_tool(Tool::Rotate);
    assert!(drag(&mut core, pt(100.0, 50.0), pt(50.0, 100.0), no_modifiers()).is_empty());
    assert_eq!(core.element(&id).unwrap().rotation, 0.0);
}

#[test]
fn pointer_maps_through_camera() {
    let (mut core, id) = core_with_rect();
    core.camera = Camera { pan_x: 10.0, pan_y: 0.0, zoom: 2.0 };
    // Screen (110, 100) is canvas (50, 50).
    drag(&mut core, pt(110.0, 100.0), pt(130.0, 100.0), no_modifiers());
    assert_eq!(core.element(&id).unwrap().position, pt(60.0, 50.0));
}

// =============================================================
// Edits
// =============================================================

#[test]
fn delete_removes_selected_elements() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);
    let actions = core.on_key_down(&key("Delete"), no_modifiers());
    assert!(actions.contains(&Action::ElementsDeleted { ids: vec![id] }));
    assert!(core.doc.is_empty());
    assert!(core.transform_box().is_empty());
}

#[test]
fn set_opacity_applies_to_selection() {
    let (mut core, id) = core_with_rect();
    assert!(core.set_opacity(0.5).is_empty());
    core.select(&[id]);
    let actions = core.set_opacity(1.5);
    assert!(actions.contains(&Action::TransformCommitted { ids: vec![id] }));
    assert_eq!(core.element(&id).unwrap().opacity, 1.0);
    core.set_opacity(0.25);
    assert_eq!(core.element(&id).unwrap().opacity, 0.25);
    assert_eq!(core.transform_box().opacity(), 0.25);
}

// =============================================================
// Viewport / render
// =============================================================

#[test]
fn set_viewport_uses_device_pixels() {
    let mut core = EngineCore::new();
    core.set_viewport(100.0, 50.0, 2.0);
    assert_eq!(core.surface().size(), (200, 100));
    core.set_viewport(0.0, 0.0, 1.0);
    assert_eq!(core.surface().size(), (1, 1));
}

#[test]
fn render_draws_elements_and_selection() {
    let config = EngineConfig { canvas_width: 100, canvas_height: 100, ..EngineConfig::default() };
    let mut core = EngineCore::with_config(config);
    let mut e = rect(50.0, 50.0, 60.0, 60.0);
    e.props = json!({"fill": "#FF0000"});
    let id = e.id;
    core.insert(e);
    core.render().unwrap();
    assert_eq!(core.surface().color_at(30, 30), Some(Color::rgba(255, 0, 0, 255)));
    assert_eq!(core.surface().color_at(5, 5), Some(Color::WHITE));

    core.select(&[id]);
    core.render().unwrap();
    // Outline on the left edge, between handles.
    assert_eq!(core.surface().color_at(20, 35), Color::from_hex(&core.config().outline_color));
}

#[test]
fn render_after_viewport_change_keeps_filters_working() {
    let config = EngineConfig { canvas_width: 40, canvas_height: 40, ..EngineConfig::default() };
    let mut core = EngineCore::with_config(config);
    let raw = json!([{"id": Uuid::new_v4(), "kind": "rect", "position": {"x": 10, "y": 10},
        "size": {"width": 6, "height": 6}, "filters": [{"id": "drop-shadow", "blur": 0}]}])
    .to_string();
    core.load_elements_json(&raw).unwrap();
    core.set_viewport(30.0, 30.0, 1.0);
    assert!(core.render().is_ok());
}

// =============================================================
// Document edits
// =============================================================

#[test]
fn reinserting_a_selected_element_refreshes_the_box() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);
    let mut moved = core.element(&id).unwrap().clone();
    moved.position = pt(300.0, 300.0);
    moved.rotation = 30.0;

    let actions = core.insert(moved);
    assert!(has_render_needed(&actions));
    assert_eq!(core.selection(), &[id]);
    assert_eq!(core.transform_box().position(), pt(300.0, 300.0));
    assert_eq!(core.transform_box().rotation(), 30.0);
    assert_eq!(core.transform_box().anchor_point(), pt(300.0, 300.0));
}

#[test]
fn reinserting_during_a_drag_keeps_the_new_geometry() {
    let (mut core, id) = core_with_rect();
    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(70.0, 50.0), no_modifiers());
    let mut replaced = rect(200.0, 200.0, 10.0, 10.0);
    replaced.id = id;

    core.insert(replaced);
    assert!(core.input.is_idle());
    assert_eq!(core.element(&id).unwrap().position, pt(200.0, 200.0));
    assert_eq!(core.transform_box().position(), pt(200.0, 200.0));
}

#[test]
fn inserting_an_unselected_element_leaves_the_box_alone() {
    let (mut core, id) = core_with_rect();
    core.select(&[id]);
    let actions = core.insert(rect(150.0, 150.0, 10.0, 10.0));
    assert!(actions.is_empty());
    assert_eq!(core.transform_box().position(), pt(50.0, 50.0));
}
