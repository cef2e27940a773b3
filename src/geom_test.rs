#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// Point arithmetic
// =============================================================

#[test]
fn point_add_and_sub() {
    assert_eq!(pt(1.0, 2.0) + pt(3.0, 4.0), pt(4.0, 6.0));
    assert_eq!(pt(1.0, 2.0) - pt(3.0, 5.0), pt(-2.0, -3.0));
}

#[test]
fn point_scalar_mul_and_div() {
    assert_eq!(pt(2.0, -3.0) * 2.0, pt(4.0, -6.0));
    assert_eq!(pt(2.0, -3.0) / 2.0, pt(1.0, -1.5));
}

#[test]
fn point_componentwise_mul() {
    assert_eq!(pt(2.0, 3.0) * pt(4.0, 0.5), pt(8.0, 1.5));
}

#[test]
fn point_neg() {
    assert_eq!(-pt(1.0, -2.0), pt(-1.0, 2.0));
}

#[test]
fn point_add_assign() {
    let mut p = pt(1.0, 1.0);
    p += pt(2.0, 3.0);
    assert_eq!(p, pt(3.0, 4.0));
}

#[test]
fn point_midpoint() {
    assert_eq!(pt(0.0, 0.0).midpoint(pt(10.0, 4.0)), pt(5.0, 2.0));
}

#[test]
fn point_length_and_distance() {
    assert!(approx_eq(pt(3.0, 4.0).length(), 5.0));
    assert!(approx_eq(pt(1.0, 1.0).distance(pt(4.0, 5.0)), 5.0));
}

#[test]
fn point_angle_deg_is_clockwise_on_y_down() {
    assert!(approx_eq(pt(1.0, 0.0).angle_deg(), 0.0));
    assert!(approx_eq(pt(0.0, 1.0).angle_deg(), 90.0));
    assert!(approx_eq(pt(-1.0, 0.0).angle_deg(), 180.0));
}

#[test]
fn point_min_max() {
    let a = pt(1.0, 5.0);
    let b = pt(3.0, 2.0);
    assert_eq!(a.min(b), pt(1.0, 2.0));
    assert_eq!(a.max(b), pt(3.0, 5.0));
}

// =============================================================
// Rotation
// =============================================================

#[test]
fn rotate_zero_is_identity() {
    let p = pt(12.5, -3.0);
    assert_eq!(rotate_point(p, pt(7.0, 7.0), 0.0), p);
}

#[test]
fn rotate_quarter_turn_about_origin() {
    let r = rotate_point(pt(10.0, 0.0), Point::ZERO, 90.0);
    assert!(r.approx_eq(pt(0.0, 10.0), EPSILON));
}

#[test]
fn rotate_about_pivot() {
    let r = pt(20.0, 10.0).rotate_about(pt(10.0, 10.0), 180.0);
    assert!(r.approx_eq(pt(0.0, 10.0), EPSILON));
}

#[test]
fn rotate_there_and_back() {
    let p = pt(3.0, 8.0);
    let pivot = pt(-2.0, 1.0);
    let back = p.rotate_about(pivot, 37.0).rotate_about(pivot, -37.0);
    assert!(back.approx_eq(p, EPSILON));
}

#[test]
fn rotate_vector_preserves_length() {
    let v = rotate_vector(pt(3.0, 4.0), 123.0);
    assert!(approx_eq(v.length(), 5.0));
}

#[test]
fn normalize_wraps_into_range() {
    assert!(approx_eq(normalize_deg(370.0), 10.0));
    assert!(approx_eq(normalize_deg(-90.0), 270.0));
    assert!(approx_eq(normalize_deg(360.0), 0.0));
}

#[test]
fn snap_angle_rounds_to_step() {
    assert!(approx_eq(snap_angle(22.0, 15.0), 15.0));
    assert!(approx_eq(snap_angle(23.0, 15.0), 30.0));
    assert!(approx_eq(snap_angle(-8.0, 15.0), -15.0));
    assert!(approx_eq(snap_angle(22.0, 0.0), 22.0));
}

// =============================================================
// Size
// =============================================================

#[test]
fn size_new_folds_negative() {
    assert_eq!(Size::new(-4.0, 3.0), Size::new(4.0, 3.0));
}

#[test]
fn size_scaled_uses_magnitude() {
    let s = Size::new(10.0, 20.0).scaled(pt(2.0, -0.5));
    assert_eq!(s, Size::new(20.0, 10.0));
}

#[test]
fn size_half() {
    assert_eq!(Size::new(10.0, 6.0).half(), pt(5.0, 3.0));
}

#[test]
fn size_degenerate() {
    assert!(Size::ZERO.is_degenerate());
    assert!(Size::new(5.0, 0.0).is_degenerate());
    assert!(!Size::new(5.0, 1.0).is_degenerate());
}
