//! Document model: scene elements, their transform state, and the in-memory store.
//!
//! An [`Element`] carries the transform state the engine manipulates
//! (`position` is the center, `size` is unscaled and unrotated, `scale` is a
//! per-axis factor, `rotation` is clockwise degrees) plus its filter list.
//! Groups own child elements; their own geometry is a synthetic envelope of
//! the children that is carried along rigidly by every transform.
//!
//! Elements arrive as JSON ([`ElementRecord`]) and are rebuilt with a
//! [`FilterRegistry`] so each filter map becomes a typed [`Filter`].

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::bounds::BoundingBox;
use crate::error::DocError;
use crate::filter::{Filter, FilterRegistry};
use crate::geom::{Point, Size, rotate_point, rotate_vector};

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// Default fill when an element's props carry none.
pub const DEFAULT_FILL: &str = "#D94B4B";

/// The kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Rectangle filling its bounding box.
    Rect,
    /// Ellipse inscribed within its bounding box.
    Ellipse,
    /// Container whose children are drawn and transformed together.
    Group,
}

/// The transform-relevant state of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTransform {
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
    pub scale: Point,
    pub opacity: f64,
}

/// Pre-drag transform state keyed by element id, children included.
pub type TransformSnapshot = HashMap<ElementId, ElementTransform>;

/// A scene element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Center in canvas coordinates.
    pub position: Point,
    /// Unscaled, unrotated extents.
    pub size: Size,
    /// Clockwise rotation in degrees about `position`.
    pub rotation: f64,
    /// Per-axis scale factor applied to `size`.
    pub scale: Point,
    pub opacity: f64,
    /// Stacking order; lower values are drawn beneath higher values.
    pub z_index: i64,
    /// Open-ended per-kind properties (fill, etc.).
    pub props: serde_json::Value,
    pub filters: Vec<Filter>,
    pub children: Vec<Element>,
}

impl Element {
    /// A fresh element with identity rotation/scale and full opacity.
    #[must_use]
    pub fn new(kind: ElementKind, position: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            size,
            rotation: 0.0,
            scale: Point::ONE,
            opacity: 1.0,
            z_index: 0,
            props: serde_json::json!({}),
            filters: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A group fitted around `children`.
    #[must_use]
    pub fn group(children: Vec<Element>) -> Self {
        let mut group = Self::new(ElementKind::Group, Point::ZERO, Size::ZERO);
        group.children = children;
        group.refit();
        group
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind == ElementKind::Group
    }

    /// The element's scaled, rotated box, computed from current state.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.position, self.size.scaled(self.scale), self.rotation)
    }

    /// Whether `point` (canvas space) hits the element's shape.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        let bbox = self.bounding_box();
        match self.kind {
            ElementKind::Rect => bbox.is_point_inside(point),
            ElementKind::Ellipse => {
                let half = bbox.size().half();
                if half.x <= 0.0 || half.y <= 0.0 {
                    return false;
                }
                let local = bbox.derotate(point) - bbox.center();
                let nx = local.x / half.x;
                let ny = local.y / half.y;
                nx * nx + ny * ny <= 1.0
            }
            ElementKind::Group => self.children.iter().any(|c| c.contains_point(point)),
        }
    }

    /// Reset a group's synthetic geometry to the axis-aligned envelope of its
    /// children. No-op for leaves and empty groups.
    pub fn refit(&mut self) {
        if !self.is_group() {
            return;
        }
        let boxes: Vec<BoundingBox> = self.children.iter().map(Element::bounding_box).collect();
        if let Some(envelope) = BoundingBox::envelope(&boxes) {
            self.position = envelope.center();
            self.size = envelope.size();
            self.rotation = 0.0;
            self.scale = Point::ONE;
        }
    }

    // --- transforms (recursive) ---

    pub fn translate(&mut self, delta: Point) {
        self.position += delta;
        for child in &mut self.children {
            child.translate(delta);
        }
    }

    /// Rotate the position about `anchor` and add `delta_deg` to the rotation.
    pub fn rotate_about(&mut self, anchor: Point, delta_deg: f64) {
        self.position = rotate_point(self.position, anchor, delta_deg);
        self.rotation += delta_deg;
        for child in &mut self.children {
            child.rotate_about(anchor, delta_deg);
        }
    }

    /// Multiply the scale by `factor` and move the position away from `anchor`
    /// by the same factor, measured along axes rotated by `frame_rotation`.
    pub fn scale_about(&mut self, anchor: Point, factor: Point, frame_rotation: f64) {
        let local = rotate_vector(self.position - anchor, -frame_rotation);
        self.position = anchor + rotate_vector(local * factor, frame_rotation);
        self.scale = self.scale * factor;
        for child in &mut self.children {
            child.scale_about(anchor, factor, frame_rotation);
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
        for child in &mut self.children {
            child.set_opacity(opacity);
        }
    }

    // --- snapshot / restore ---

    #[must_use]
    pub fn transform(&self) -> ElementTransform {
        ElementTransform {
            position: self.position,
            size: self.size,
            rotation: self.rotation,
            scale: self.scale,
            opacity: self.opacity,
        }
    }

    pub fn set_transform(&mut self, t: ElementTransform) {
        self.position = t.position;
        self.size = t.size;
        self.rotation = t.rotation;
        self.scale = t.scale;
        self.opacity = t.opacity;
    }

    /// Record this element's transform and every descendant's.
    pub fn snapshot_into(&self, out: &mut TransformSnapshot) {
        out.insert(self.id, self.transform());
        for child in &self.children {
            child.snapshot_into(out);
        }
    }

    /// Restore any transforms present in `snapshot`, recursively.
    pub fn restore_from(&mut self, snapshot: &TransformSnapshot) {
        if let Some(t) = snapshot.get(&self.id) {
            self.set_transform(*t);
        }
        for child in &mut self.children {
            child.restore_from(snapshot);
        }
    }

    /// Push this element's id and every descendant's onto `out`.
    pub fn collect_ids(&self, out: &mut Vec<ElementId>) {
        out.push(self.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }

    #[must_use]
    pub fn props(&self) -> Props<'_> {
        Props::new(&self.props)
    }

    // --- wire form ---

    /// Rebuild an element from its wire form.
    ///
    /// Filters the registry cannot resolve are logged and skipped. A group
    /// keeps its recorded position, size, rotation and scale; one recorded
    /// without a size is fitted around its children. A group's recorded
    /// opacity is pushed into its descendants, as [`Element::set_opacity`] does.
    ///
    /// # Errors
    ///
    /// [`DocError::InvalidElement`] for a group without children or a leaf
    /// with children.
    pub fn from_record(record: ElementRecord, registry: &FilterRegistry) -> Result<Self, DocError> {
        let is_group = record.kind == ElementKind::Group;
        if is_group && record.children.is_empty() {
            return Err(DocError::InvalidElement(format!("{}: group has no children", record.id)));
        }
        if !is_group && !record.children.is_empty() {
            return Err(DocError::InvalidElement(format!("{}: only groups have children", record.id)));
        }

        let mut filters = Vec::with_capacity(record.filters.len());
        for raw in &record.filters {
            match registry.resolve(raw) {
                Ok(filter) => filters.push(filter),
                Err(err) => warn!(element = %record.id, error = %err, "skipping filter"),
            }
        }

        let children = record
            .children
            .into_iter()
            .map(|child| Element::from_record(child, registry))
            .collect::<Result<Vec<_>, _>>()?;

        let mut element = Self {
            id: record.id,
            kind: record.kind,
            position: record.position,
            size: Size::new(record.size.width, record.size.height),
            rotation: record.rotation,
            scale: record.scale,
            opacity: record.opacity.unwrap_or(1.0),
            z_index: record.z_index,
            props: record.props,
            filters,
            children,
        };
        if is_group {
            if let Some(opacity) = record.opacity {
                element.set_opacity(opacity);
            }
            if element.size.is_degenerate() {
                element.refit();
            }
        }
        Ok(element)
    }

    /// The wire form of this element, filters included.
    #[must_use]
    pub fn to_record(&self) -> ElementRecord {
        ElementRecord {
            id: self.id,
            kind: self.kind,
            position: self.position,
            size: self.size,
            rotation: self.rotation,
            scale: self.scale,
            opacity: Some(self.opacity),
            z_index: self.z_index,
            props: self.props.clone(),
            filters: self.filters.iter().map(Filter::to_record).collect(),
            children: self.children.iter().map(Element::to_record).collect(),
        }
    }
}

/// An element as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: ElementId,
    pub kind: ElementKind,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "unit_scale")]
    pub scale: Point,
    /// Missing means fully opaque; on a group it also leaves the children's
    /// own opacities alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default = "empty_props")]
    pub props: serde_json::Value,
    /// Flat filter maps; see [`Filter::to_record`].
    #[serde(default)]
    pub filters: Vec<serde_json::Value>,
    #[serde(default)]
    pub children: Vec<ElementRecord>,
}

fn unit_scale() -> Point {
    Point::ONE
}

fn empty_props() -> serde_json::Value {
    serde_json::json!({})
}

/// Typed access to common props fields from an `Element.props` JSON value.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Fill color as a hex string. Defaults to [`DEFAULT_FILL`] when absent.
    #[must_use]
    pub fn fill(&self) -> &'a str {
        self.value.get("fill").and_then(|v| v.as_str()).unwrap_or(DEFAULT_FILL)
    }
}

/// In-memory store of top-level elements.
pub struct DocStore {
    elements: HashMap<ElementId, Element>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { elements: HashMap::new() }
    }

    /// Insert or replace an element.
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id, element);
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        self.elements.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Replace all elements.
    pub fn load(&mut self, elements: Vec<Element>) {
        self.elements.clear();
        for element in elements {
            self.elements.insert(element.id, element);
        }
    }

    /// Replace all elements from a JSON array of [`ElementRecord`]s.
    /// Returns the number of top-level elements loaded.
    ///
    /// # Errors
    ///
    /// [`DocError::Json`] for malformed JSON, [`DocError::InvalidElement`] for
    /// structurally invalid elements. The store is untouched on error.
    pub fn load_json(&mut self, raw: &str, registry: &FilterRegistry) -> Result<usize, DocError> {
        let records: Vec<ElementRecord> = serde_json::from_str(raw)?;
        let elements = records
            .into_iter()
            .map(|record| Element::from_record(record, registry))
            .collect::<Result<Vec<_>, _>>()?;
        let count = elements.len();
        self.load(elements);
        Ok(count)
    }

    /// Wire form of every element in draw order.
    #[must_use]
    pub fn to_records(&self) -> Vec<ElementRecord> {
        self.sorted_elements().into_iter().map(Element::to_record).collect()
    }

    /// All elements sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn sorted_elements(&self) -> Vec<&Element> {
        let mut elements: Vec<&Element> = self.elements.values().collect();
        elements.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        elements
    }

    /// Transform state of the listed elements and all their descendants.
    #[must_use]
    pub fn snapshot(&self, ids: &[ElementId]) -> TransformSnapshot {
        let mut out = TransformSnapshot::new();
        for element in ids.iter().filter_map(|id| self.elements.get(id)) {
            element.snapshot_into(&mut out);
        }
        out
    }

    /// Put back every transform recorded in `snapshot`.
    pub fn restore(&mut self, snapshot: &TransformSnapshot) {
        for element in self.elements.values_mut() {
            element.restore_from(snapshot);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}
