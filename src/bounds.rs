//! Rotation-aware bounding boxes.
//!
//! A [`BoundingBox`] is a center, an unrotated size, and a rotation in degrees.
//! The four corners are derived eagerly: `new` and `update` both recompute all of
//! them, so a box value is never out of date with respect to its own inputs.
//! Owners that mutate geometry rebuild their box in the same call.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use crate::geom::{Point, Size, rotate_point};

/// An oriented rectangle with cached corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    center: Point,
    size: Size,
    rotation: f64,
    top_left: Point,
    top_right: Point,
    bottom_right: Point,
    bottom_left: Point,
}

impl BoundingBox {
    /// Build a box and compute its corners.
    #[must_use]
    pub fn new(center: Point, size: Size, rotation: f64) -> Self {
        let mut bbox = Self {
            center,
            size,
            rotation,
            top_left: center,
            top_right: center,
            bottom_right: center,
            bottom_left: center,
        };
        bbox.update(center, size, rotation);
        bbox
    }

    /// Axis-aligned box spanning two opposite corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.midpoint(max), Size::new(max.x - min.x, max.y - min.y), 0.0)
    }

    /// Recompute every corner from `center`, `size` and `rotation`.
    ///
    /// Corners start at `center ± size / 2` and are then rotated about `center`
    /// when `rotation` is non-zero.
    pub fn update(&mut self, center: Point, size: Size, rotation: f64) {
        self.center = center;
        self.size = size;
        self.rotation = rotation;

        let half = size.half();
        let corners = [
            Point::new(center.x - half.x, center.y - half.y),
            Point::new(center.x + half.x, center.y - half.y),
            Point::new(center.x + half.x, center.y + half.y),
            Point::new(center.x - half.x, center.y + half.y),
        ]
        .map(|c| rotate_point(c, center, rotation));

        [self.top_left, self.top_right, self.bottom_right, self.bottom_left] = corners;
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn top_left(&self) -> Point {
        self.top_left
    }

    #[must_use]
    pub fn top_right(&self) -> Point {
        self.top_right
    }

    #[must_use]
    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    #[must_use]
    pub fn bottom_left(&self) -> Point {
        self.bottom_left
    }

    /// Corners in clockwise order starting at the top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    /// Whether `point` lies inside the box (edges inclusive).
    ///
    /// The point and the box's extreme corners are both de-rotated by
    /// `-rotation` about the center, then compared axis-aligned.
    #[must_use]
    pub fn is_point_inside(&self, point: Point) -> bool {
        let p = self.derotate(point);
        let (min, max) = self.derotated_extent();
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    /// Whether the box's de-rotated extreme corners both fall inside the
    /// axis-aligned rectangle spanned by `p1` and `p2`.
    #[must_use]
    pub fn is_within_bounds(&self, p1: Point, p2: Point) -> bool {
        let lo = p1.min(p2);
        let hi = p1.max(p2);
        let (min, max) = self.derotated_extent();
        let inside = |p: Point| p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y;
        inside(min) && inside(max)
    }

    /// Axis-aligned `(min, max)` of the rotated corners.
    #[must_use]
    pub fn aabb(&self) -> (Point, Point) {
        let corners = self.corners();
        let min = corners.iter().fold(corners[0], |acc, c| acc.min(*c));
        let max = corners.iter().fold(corners[0], |acc, c| acc.max(*c));
        (min, max)
    }

    /// The axis-aligned envelope (rotation 0) around every rotated corner of `boxes`.
    ///
    /// Returns `None` for an empty iterator.
    pub fn envelope<'a, I>(boxes: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        let mut extent: Option<(Point, Point)> = None;
        for bbox in boxes {
            let (lo, hi) = bbox.aabb();
            extent = Some(match extent {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }
        extent.map(|(min, max)| Self::from_corners(min, max))
    }

    /// Map a canvas point into the box's unrotated frame (about its center).
    #[must_use]
    pub fn derotate(&self, point: Point) -> Point {
        rotate_point(point, self.center, -self.rotation)
    }

    fn derotated_extent(&self) -> (Point, Point) {
        let tl = self.derotate(self.top_left);
        let br = self.derotate(self.bottom_right);
        (tl.min(br), tl.max(br))
    }
}
