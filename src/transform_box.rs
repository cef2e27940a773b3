//! The interactive manipulation box around the current selection.
//!
//! A [`TransformBox`] caches an aggregate position/size/rotation for the
//! selected elements and applies move, rotate, scale and opacity changes to
//! every one of them (recursing into groups). A single selection follows the
//! element's rotation; a multi-selection is the axis-aligned envelope of all
//! rotated corners and starts at rotation 0.
//!
//! Every mutator applies to the elements first, then updates the cached
//! state, then rebuilds the bounding box and the nine handles from scratch.
//! An empty selection yields a box with no bounding box and no handles, and
//! all mutators on it are no-ops.

#[cfg(test)]
#[path = "transform_box_test.rs"]
mod transform_box_test;

use tracing::debug;

use crate::bounds::BoundingBox;
use crate::doc::{DocStore, Element, ElementId};
use crate::geom::{Point, Size, rotate_point, rotate_vector};
use crate::hit::Handles;

#[derive(Debug, Clone, PartialEq)]
pub struct TransformBox {
    selection: Vec<ElementId>,
    position: Point,
    size: Size,
    scale: Point,
    rotation: f64,
    opacity: f64,
    anchor_point: Point,
    custom_anchor: bool,
    bounding_box: Option<BoundingBox>,
    handles: Option<Handles>,
}

impl TransformBox {
    /// A box with nothing selected.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            selection: Vec::new(),
            position: Point::ZERO,
            size: Size::ZERO,
            scale: Point::ONE,
            rotation: 0.0,
            opacity: 1.0,
            anchor_point: Point::ZERO,
            custom_anchor: false,
            bounding_box: None,
            handles: None,
        }
    }

    /// Build a box around the top-level elements named by `ids`.
    /// Ids missing from `doc` (and repeats) are dropped.
    #[must_use]
    pub fn new(doc: &DocStore, ids: &[ElementId]) -> Self {
        let mut selected: Vec<&Element> = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(element) = doc.get(id) {
                if !selected.iter().any(|e| e.id == *id) {
                    selected.push(element);
                }
            }
        }

        let mut tbox = Self::empty();
        tbox.selection = selected.iter().map(|e| e.id).collect();
        match selected.as_slice() {
            [] => return tbox,
            [one] => {
                let bbox = one.bounding_box();
                tbox.position = one.position;
                tbox.size = bbox.size();
                tbox.rotation = one.rotation;
                tbox.opacity = one.opacity;
            }
            many => {
                let boxes: Vec<BoundingBox> = many.iter().map(|e| e.bounding_box()).collect();
                if let Some(envelope) = BoundingBox::envelope(&boxes) {
                    tbox.position = envelope.center();
                    tbox.size = envelope.size();
                }
                let first = many[0].opacity;
                tbox.opacity = if many.iter().all(|e| e.opacity == first) { first } else { 1.0 };
            }
        }
        tbox.anchor_point = tbox.position;
        tbox.refresh();
        debug!(count = tbox.selection.len(), "transform box built");
        tbox
    }

    // --- queries ---

    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn scale(&self) -> Point {
        self.scale
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Pivot for rotate and scale.
    #[must_use]
    pub fn anchor_point(&self) -> Point {
        self.anchor_point
    }

    /// Whether the anchor was placed by the user rather than tracking the center.
    #[must_use]
    pub fn has_custom_anchor(&self) -> bool {
        self.custom_anchor
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    #[must_use]
    pub fn handles(&self) -> Option<&Handles> {
        self.handles.as_ref()
    }

    // --- anchor ---

    /// Pin the pivot at `point` until the anchor is reset or the box moves.
    pub fn set_anchor_point(&mut self, point: Point) {
        self.anchor_point = point;
        self.custom_anchor = true;
    }

    /// Let the pivot track the box center again.
    pub fn reset_anchor(&mut self) {
        self.anchor_point = self.position;
        self.custom_anchor = false;
    }

    // --- operations ---

    /// Move the box to `new_position`, translating every selected element by
    /// the same delta. The anchor is reset to the new position.
    pub fn update_position(&mut self, doc: &mut DocStore, new_position: Point) -> Vec<ElementId> {
        if self.is_empty() {
            return Vec::new();
        }
        let delta = new_position - self.position;
        let touched = self.apply(doc, |e| e.translate(delta));
        self.position = new_position;
        self.reset_anchor();
        self.refresh();
        touched
    }

    /// Rotate to the absolute angle `new_angle` about `anchor` (the box
    /// position when `None`). Elements receive the delta: their positions are
    /// rotated about the anchor and their own rotations composed with it.
    pub fn update_rotation(&mut self, doc: &mut DocStore, new_angle: f64, anchor: Option<Point>) -> Vec<ElementId> {
        if self.is_empty() {
            return Vec::new();
        }
        let anchor = anchor.unwrap_or(self.position);
        let delta = new_angle - self.rotation;
        let touched = self.apply(doc, |e| e.rotate_about(anchor, delta));
        self.position = rotate_point(self.position, anchor, delta);
        self.rotation = new_angle;
        self.refresh();
        touched
    }

    /// Scale by the per-axis factor `delta` about `anchor` (the box position
    /// when `None`). Axes are the box's own, so at rotation 0 each element
    /// moves to `anchor + (position - anchor) * delta`.
    pub fn update_scale(&mut self, doc: &mut DocStore, delta: Point, anchor: Option<Point>) -> Vec<ElementId> {
        if self.is_empty() {
            return Vec::new();
        }
        let anchor = anchor.unwrap_or(self.position);
        let frame = self.rotation;
        let touched = self.apply(doc, |e| e.scale_about(anchor, delta, frame));
        let local = rotate_vector(self.position - anchor, -frame);
        self.position = anchor + rotate_vector(local * delta, frame);
        self.size = self.size.scaled(delta);
        self.scale = self.scale * delta;
        self.refresh();
        touched
    }

    /// Set every selected element's opacity, and the box's, to `opacity`.
    pub fn update_opacity(&mut self, doc: &mut DocStore, opacity: f64) -> Vec<ElementId> {
        if self.is_empty() {
            return Vec::new();
        }
        let touched = self.apply(doc, |e| e.set_opacity(opacity));
        self.opacity = opacity;
        touched
    }

    /// Run `f` on each selected element; returns every id touched, descendants included.
    fn apply<F>(&self, doc: &mut DocStore, f: F) -> Vec<ElementId>
    where
        F: Fn(&mut Element),
    {
        let mut touched = Vec::new();
        for id in &self.selection {
            if let Some(element) = doc.get_mut(id) {
                f(element);
                element.collect_ids(&mut touched);
            }
        }
        touched
    }

    /// Rebuild the bounding box and handles from the cached geometry.
    fn refresh(&mut self) {
        if !self.custom_anchor {
            self.anchor_point = self.position;
        }
        let bbox = BoundingBox::new(self.position, self.size, self.rotation);
        self.handles = Some(Handles::from_box(&bbox));
        self.bounding_box = Some(bbox);
    }
}

impl Default for TransformBox {
    fn default() -> Self {
        Self::empty()
    }
}
