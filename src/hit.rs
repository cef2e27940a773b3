//! Hit-testing: transform handles, elements under the pointer, marquee selection.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::bounds::BoundingBox;
use crate::doc::{DocStore, ElementId};
use crate::geom::Point;

/// One of the nine named points on a transform box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Center,
}

/// Which axes a handle drags when scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axes {
    Both,
    X,
    Y,
    /// The center handle: scaling from it does nothing.
    Fixed,
}

impl Handle {
    /// Clockwise from the top-left corner, center last.
    pub const ALL: [Self; 9] = [Self::Nw, Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Center];

    /// The geometrically opposite handle. The center is its own opposite.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Nw => Self::Se,
            Self::N => Self::S,
            Self::Ne => Self::Sw,
            Self::E => Self::W,
            Self::Se => Self::Nw,
            Self::S => Self::N,
            Self::Sw => Self::Ne,
            Self::W => Self::E,
            Self::Center => Self::Center,
        }
    }

    /// Corners scale both axes, edges one, the center none.
    #[must_use]
    pub fn axes(self) -> Axes {
        match self {
            Self::Nw | Self::Ne | Self::Se | Self::Sw => Axes::Both,
            Self::E | Self::W => Axes::X,
            Self::N | Self::S => Axes::Y,
            Self::Center => Axes::Fixed,
        }
    }

    #[must_use]
    pub fn is_corner(self) -> bool {
        self.axes() == Axes::Both
    }

    fn index(self) -> usize {
        match self {
            Self::Nw => 0,
            Self::N => 1,
            Self::Ne => 2,
            Self::E => 3,
            Self::Se => 4,
            Self::S => 5,
            Self::Sw => 6,
            Self::W => 7,
            Self::Center => 8,
        }
    }
}

/// Handle positions derived from a bounding box. Regenerated, never patched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handles {
    points: [Point; 9],
}

impl Handles {
    #[must_use]
    pub fn from_box(bbox: &BoundingBox) -> Self {
        let [tl, tr, br, bl] = bbox.corners();
        Self {
            points: [
                tl,
                tl.midpoint(tr),
                tr,
                tr.midpoint(br),
                br,
                br.midpoint(bl),
                bl,
                bl.midpoint(tl),
                bbox.center(),
            ],
        }
    }

    #[must_use]
    pub fn get(&self, handle: Handle) -> Point {
        self.points[handle.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, Point)> + '_ {
        Handle::ALL.into_iter().map(|h| (h, self.get(h)))
    }

    /// The handle closest to `point` within `radius` (canvas units), if any.
    #[must_use]
    pub fn nearest(&self, point: Point, radius: f64) -> Option<Handle> {
        self.iter()
            .map(|(h, p)| (h, p.distance(point)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| h)
    }
}

/// The topmost top-level element whose shape contains `world`.
#[must_use]
pub fn element_at(doc: &DocStore, world: Point) -> Option<ElementId> {
    doc.sorted_elements()
        .into_iter()
        .rev()
        .find(|e| e.contains_point(world))
        .map(|e| e.id)
}

/// Top-level elements whose de-rotated box lies inside the rectangle spanned
/// by `p1` and `p2`, in draw order.
#[must_use]
pub fn marquee_select(doc: &DocStore, p1: Point, p2: Point) -> Vec<ElementId> {
    doc.sorted_elements()
        .into_iter()
        .filter(|e| e.bounding_box().is_within_bounds(p1, p2))
        .map(|e| e.id)
        .collect()
}
