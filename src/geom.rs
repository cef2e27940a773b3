//! 2D geometry primitives.
//!
//! Canvas space is y-down, so a positive rotation in degrees turns clockwise on
//! screen. Everything here is a pure value type or a pure function.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::consts::GEOMETRY_EPSILON;

/// A point (or vector) in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// A point with both components set to `v`.
    #[must_use]
    pub fn splat(v: f64) -> Self {
        Self { x: v, y: v }
    }

    /// Halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Euclidean length when treated as a vector.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Direction of the vector in degrees, measured clockwise from +x.
    #[must_use]
    pub fn angle_deg(self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Rotate this point about `pivot` by `degrees` (clockwise on a y-down canvas).
    #[must_use]
    pub fn rotate_about(self, pivot: Self, degrees: f64) -> Self {
        rotate_point(self, pivot, degrees)
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Whether both components are within `eps` of `other`'s.
    #[must_use]
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Component-wise product, used for per-axis scale factors.
impl Mul<Point> for Point {
    type Output = Self;
    fn mul(self, rhs: Point) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Div<f64> for Point {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

/// Unrotated extents of a box. Both dimensions are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    /// Build a size; negative inputs are folded to their magnitude.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width: width.abs(), height: height.abs() }
    }

    /// This size multiplied per axis by the magnitude of `factor`.
    #[must_use]
    pub fn scaled(self, factor: Point) -> Self {
        Self::new(self.width * factor.x, self.height * factor.y)
    }

    /// Half extents as a vector.
    #[must_use]
    pub fn half(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    /// Whether either dimension is (numerically) zero.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.width <= GEOMETRY_EPSILON || self.height <= GEOMETRY_EPSILON
    }
}

/// Rotate `point` about `pivot` by `degrees`. A zero angle returns `point` unchanged.
#[must_use]
pub fn rotate_point(point: Point, pivot: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return point;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - pivot;
    Point::new(pivot.x + d.x * cos - d.y * sin, pivot.y + d.x * sin + d.y * cos)
}

/// Rotate a free vector (no pivot) by `degrees`.
#[must_use]
pub fn rotate_vector(v: Point, degrees: f64) -> Point {
    rotate_point(v, Point::ZERO, degrees)
}

/// Wrap an angle into `[0, 360)`.
#[must_use]
pub fn normalize_deg(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Round `degrees` to the nearest multiple of `step`. A non-positive step is a no-op.
#[must_use]
pub fn snap_angle(degrees: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return degrees;
    }
    (degrees / step).round() * step
}
