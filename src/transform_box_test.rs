#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::ElementKind;
use crate::hit::Handle;
use uuid::Uuid;

const EPSILON: f64 = 1e-9;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Rect given by top-left and size, like `(x, y, w, h)`.
fn rect_tl(x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(ElementKind::Rect, pt(x + w / 2.0, y + h / 2.0), Size::new(w, h))
}

fn doc_with(elements: Vec<Element>) -> (DocStore, Vec<ElementId>) {
    let mut doc = DocStore::new();
    let ids = elements.iter().map(|e| e.id).collect();
    for e in elements {
        doc.insert(e);
    }
    (doc, ids)
}

// =============================================================
// Construction
// =============================================================

#[test]
fn empty_selection_has_no_box_and_ignores_operations() {
    let (mut doc, _) = doc_with(vec![rect_tl(0.0, 0.0, 10.0, 10.0)]);
    let mut tbox = TransformBox::new(&doc, &[]);
    assert!(tbox.is_empty());
    assert!(tbox.bounding_box().is_none());
    assert!(tbox.handles().is_none());
    assert!(tbox.update_position(&mut doc, pt(50.0, 50.0)).is_empty());
    assert!(tbox.update_rotation(&mut doc, 45.0, None).is_empty());
    assert!(tbox.update_scale(&mut doc, pt(2.0, 2.0), None).is_empty());
    assert!(tbox.update_opacity(&mut doc, 0.5).is_empty());
    assert!(tbox.bounding_box().is_none());
    assert_eq!(tbox, TransformBox::empty());
}

#[test]
fn unknown_ids_are_dropped() {
    let (doc, ids) = doc_with(vec![rect_tl(0.0, 0.0, 10.0, 10.0)]);
    let tbox = TransformBox::new(&doc, &[Uuid::new_v4(), ids[0], ids[0]]);
    assert_eq!(tbox.selection(), ids.as_slice());
}

#[test]
fn single_selection_follows_element_rotation_and_scale() {
    let mut e = rect_tl(0.0, 0.0, 20.0, 10.0);
    e.rotation = 30.0;
    e.scale = pt(2.0, 1.0);
    e.opacity = 0.4;
    let expected = e.bounding_box();
    let (doc, ids) = doc_with(vec![e]);
    let tbox = TransformBox::new(&doc, &ids);
    assert_eq!(tbox.rotation(), 30.0);
    assert_eq!(tbox.size(), Size::new(40.0, 10.0));
    assert_eq!(tbox.opacity(), 0.4);
    assert_eq!(tbox.bounding_box(), Some(&expected));
    assert_eq!(tbox.anchor_point(), tbox.position());
}

#[test]
fn multi_selection_envelope() {
    let a = rect_tl(0.0, 0.0, 10.0, 10.0);
    let mut b = rect_tl(100.0, 100.0, 10.0, 10.0);
    b.rotation = 90.0;
    let (doc, ids) = doc_with(vec![a, b]);
    let tbox = TransformBox::new(&doc, &ids);
    assert!(tbox.position().approx_eq(pt(55.0, 55.0), EPSILON));
    assert!((tbox.size().width - 110.0).abs() < EPSILON);
    assert!((tbox.size().height - 110.0).abs() < EPSILON);
    assert_eq!(tbox.rotation(), 0.0);
}

#[test]
fn multi_selection_opacity_is_common_value_or_one() {
    let mut a = rect_tl(0.0, 0.0, 10.0, 10.0);
    let mut b = rect_tl(20.0, 0.0, 10.0, 10.0);
    a.opacity = 0.3;
    b.opacity = 0.3;
    let (doc, ids) = doc_with(vec![a.clone(), b.clone()]);
    assert_eq!(TransformBox::new(&doc, &ids).opacity(), 0.3);

    b.opacity = 0.6;
    let (doc, ids) = doc_with(vec![a, b]);
    assert_eq!(TransformBox::new(&doc, &ids).opacity(), 1.0);
}

// =============================================================
// Move
// =============================================================

#[test]
fn update_position_moves_elements_and_handles() {
    let (mut doc, ids) = doc_with(vec![rect_tl(0.0, 0.0, 10.0, 10.0), rect_tl(20.0, 0.0, 10.0, 10.0)]);
    let mut tbox = TransformBox::new(&doc, &ids);
    let start = tbox.position();
    tbox.update_position(&mut doc, start + pt(7.0, -3.0));
    assert_eq!(doc.get(&ids[0]).unwrap().position, pt(12.0, 2.0));
    assert_eq!(doc.get(&ids[1]).unwrap().position, pt(32.0, 2.0));
    assert_eq!(tbox.handles().unwrap().get(Handle::Center), tbox.position());
    assert_eq!(tbox.bounding_box().unwrap().center(), tbox.position());
}

#[test]
fn update_position_resets_custom_anchor() {
    let (mut doc, ids) = doc_with(vec![rect_tl(0.0, 0.0, 10.0, 10.0)]);
    let mut tbox = TransformBox::new(&doc, &ids);
    tbox.set_anchor_point(pt(100.0, 100.0));
    assert!(tbox.has_custom_anchor());
    tbox.update_position(&mut doc, pt(20.0, 20.0));
    assert!(!tbox.has_custom_anchor());
    assert_eq!(tbox.anchor_point(), pt(20.0, 20.0));
}

#[test]
fn moving_a_group_moves_children_and_keeps_group_position_in_step() {
    let group = Element::group(vec![rect_tl(0.0, 0.0, 10.0, 10.0), rect_tl(30.0, 30.0, 10.0, 10.0)]);
    let child_starts: Vec<Point> = group.children.iter().map(|c| c.position).collect();
    let (mut doc, ids) = doc_with(vec![group]);
    let mut tbox = TransformBox::new(&doc, &ids);
    let delta = pt(15.0, 25.0);
    let touched = tbox.update_position(&mut doc, tbox.position() + delta);
    assert_eq!(touched.len(), 3);

    let group = doc.get(&ids[0]).unwrap();
    for (child, start) in group.children.iter().zip(child_starts) {
        assert_eq!(child.position, start + delta);
    }
    assert_eq!(group.position, tbox.position());
}

// =============================================================
// Rotate
// =============================================================

#[test]
fn rotation_deltas_accumulate_on_elements() {
    let mut a = rect_tl(0.0, 0.0, 10.0, 10.0);
    let mut b = rect_tl(40.0, 0.0, 10.0, 10.0);
    a.rotation = 10.0;
    b.rotation = 70.0;
    let (mut doc, ids) = doc_with(vec![a, b]);
    let mut tbox = TransformBox::new(&doc, &ids);
    let anchor = Some(tbox.position());

    tbox.update_rotation(&mut doc, 30.0, anchor);
    let after_first = tbox.rotation();
    tbox.update_rotation(&mut doc, 50.0, anchor);

    assert_eq!(tbox.rotation(), 50.0);
    assert!((doc.get(&ids[0]).unwrap().rotation - (10.0 + 30.0 + (50.0 - after_first))).abs() < EPSILON);
    assert!((doc.get(&ids[1]).unwrap().rotation - (70.0 + 30.0 + (50.0 - after_first))).abs() < EPSILON);
}

#[test]
fn rotation_about_box_center_keeps_position() {
    let (mut doc, ids) = doc_with(vec![rect_tl(0.0, 0.0, 10.0, 10.0), rect_tl(20.0, 0.0, 10.0, 10.0)]);
    let mut tbox = TransformBox::new(&doc, &ids);
    let center = tbox.position();
    tbox.update_rotation(&mut doc, 180.0, None);
    assert!(tbox.position().approx_eq(center, EPSILON));
    // The two elements swap places.
    assert!(doc.get(&ids[0]).unwrap().position.approx_eq(pt(25.0, 5.0), EPSILON));
    assert!(doc.get(&ids[1]).unwrap().position.approx_eq(pt(5.0, 5.0), EPSILON));
}

#[test]
fn rotation_about_custom_anchor_moves_box_and_keeps_anchor() {
    let (mut doc, ids) = doc_with(vec![rect_tl(0.0, 0.0, 10.0, 10.0)]);
    let mut tbox = TransformBox::new(&doc, &ids);
    tbox.set_anchor_point(pt(5.0, 25.0));
    tbox.update_rotation(&mut doc, 180.0, Some(tbox.anchor_point()));
    assert!(tbox.position().approx_eq(pt(5.0, 45.0), EPSILON));
    assert_eq!(tbox.anchor_point(), pt(5.0, 25.0));
    assert!(doc.get(&ids[0]).unwrap().position.approx_eq(pt(5.0, 45.0), EPSILON));
}

// =============================================================
// Scale
// =============================================================

fn assert_scaled_about(anchor_of: impl Fn(&TransformBox) -> Point) {
    let elements = vec![rect_tl(0.0, 0.0, 10.0, 10.0), rect_tl(30.0, 50.0, 10.0, 20.0)];
    let starts: Vec<(Point, Point)> = elements.iter().map(|e| (e.position, e.scale)).collect();
    let (mut doc, ids) = doc_with(elements);
    let mut tbox = TransformBox::new(&doc, &ids);
    let anchor = anchor_of(&tbox);
    let size = tbox.size();

    tbox.update_scale(&mut doc, pt(2.0, 2.0), Some(anchor));

    for (id, (p, s)) in ids.iter().zip(starts) {
        let e = doc.get(id).unwrap();
        assert!(e.position.approx_eq(anchor + (p - anchor) * 2.0, EPSILON));
        assert_eq!(e.scale, s * 2.0);
    }
    assert_eq!(tbox.size(), Size::new(size.width * 2.0, size.height * 2.0));
    assert_eq!(tbox.scale(), pt(2.0, 2.0));
}

#[test]
fn scale_about_box_center() {
    assert_scaled_about(TransformBox::position);
}

#[test]
fn scale_about_box_corner() {
    assert_scaled_about(|tbox| tbox.handles().unwrap().get(Handle::Nw));
}

#[test]
fn scale_keeps_box_consistent_with_elements() {
    let (mut doc, ids) = doc_with(vec![rect_tl(0.0, 0.0, 10.0, 10.0), rect_tl(30.0, 30.0, 10.0, 10.0)]);
    let mut tbox = TransformBox::new(&doc, &ids);
    let nw = tbox.handles().unwrap().get(Handle::Nw);
    tbox.update_scale(&mut doc, pt(3.0, 0.5), Some(nw));
    // A fresh box around the scaled elements matches the updated one.
    let rebuilt = TransformBox::new(&doc, &ids);
    assert!(rebuilt.position().approx_eq(tbox.position(), EPSILON));
    assert!((rebuilt.size().width - tbox.size().width).abs() < EPSILON);
    assert!((rebuilt.size().height - tbox.size().height).abs() < EPSILON);
}

#[test]
fn scale_on_rotated_single_selection_follows_its_axes() {
    let mut e = rect_tl(0.0, 0.0, 20.0, 10.0);
    e.rotation = 90.0;
    let (mut doc, ids) = doc_with(vec![e]);
    let mut tbox = TransformBox::new(&doc, &ids);
    // Anchor at the west edge midpoint; doubling x doubles the width in place.
    let west = tbox.handles().unwrap().get(Handle::W);
    tbox.update_scale(&mut doc, pt(2.0, 1.0), Some(west));
    let rebuilt = TransformBox::new(&doc, &ids);
    assert_eq!(rebuilt.size(), Size::new(40.0, 10.0));
    assert!(tbox.handles().unwrap().get(Handle::W).approx_eq(west, EPSILON));
    assert!(rebuilt.handles().unwrap().get(Handle::W).approx_eq(west, EPSILON));
}

// =============================================================
// Opacity
// =============================================================

#[test]
fn update_opacity_sets_every_element() {
    let group = Element::group(vec![rect_tl(0.0, 0.0, 10.0, 10.0)]);
    let (mut doc, ids) = doc_with(vec![group, rect_tl(30.0, 0.0, 10.0, 10.0)]);
    let mut tbox = TransformBox::new(&doc, &ids);
    let touched = tbox.update_opacity(&mut doc, 0.2);
    assert_eq!(touched.len(), 3);
    assert_eq!(tbox.opacity(), 0.2);
    assert_eq!(doc.get(&ids[0]).unwrap().children[0].opacity, 0.2);
    assert_eq!(doc.get(&ids[1]).unwrap().opacity, 0.2);
}
