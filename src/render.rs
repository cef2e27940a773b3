//! Rendering: draws the scene and the selection overlay onto a [`Surface`].
//!
//! Receives read-only views of document, camera and selection state and
//! produces pixels; it mutates nothing but the target surface and the
//! compositor's working buffers. Surface pixels are screen (device) pixels.
//!
//! Each top-level element goes through [`Compositor::apply_filters`] with a
//! draw callback that paints the element's own shape. A group without filters
//! is transparent to the pipeline: each child is drawn through its own filters.
//! A group with filters hands the compositor a callback that paints all of its
//! descendants plainly.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use tiny_skia::{Path, PathBuilder, Rect, Transform};

use crate::bounds::BoundingBox;
use crate::camera::Camera;
use crate::compositor::Compositor;
use crate::config::EngineConfig;
use crate::consts::HANDLE_HALF_SIZE_PX;
use crate::doc::{DEFAULT_FILL, DocStore, Element, ElementKind};
use crate::error::RenderError;
use crate::geom::Point;
use crate::surface::{Color, Surface};
use crate::transform_box::TransformBox;

/// Selection outline width in screen pixels.
const OUTLINE_WIDTH_PX: f64 = 1.5;

/// Radius of the anchor marker in screen pixels.
const ANCHOR_RADIUS_PX: f64 = 3.5;

/// What the overlay layer needs to know about the current interaction.
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    pub tbox: &'a TransformBox,
    /// Canvas-space corners of an in-progress marquee.
    pub marquee: Option<(Point, Point)>,
}

/// Draw the full scene: background, elements in z-order, then the overlay.
///
/// # Errors
///
/// [`RenderError::SizeMismatch`] if `target` and `compositor` disagree on size
/// and some element carries filters.
pub fn draw(
    target: &mut Surface,
    compositor: &mut Compositor,
    doc: &DocStore,
    camera: &Camera,
    overlay: Overlay<'_>,
    config: &EngineConfig,
) -> Result<(), RenderError> {
    target.clear();
    target.fill(config.background());

    for element in doc.sorted_elements() {
        draw_element(target, compositor, element, camera)?;
    }

    draw_selection(target, overlay.tbox, camera, config);
    if let Some((a, b)) = overlay.marquee {
        draw_marquee(target, camera.world_to_screen(a), camera.world_to_screen(b), config.outline());
    }
    Ok(())
}

/// Draw one element (and, for groups, its subtree) through its filter chain.
///
/// # Errors
///
/// Propagates [`RenderError`] from the compositor.
pub fn draw_element(
    target: &mut Surface,
    compositor: &mut Compositor,
    element: &Element,
    camera: &Camera,
) -> Result<(), RenderError> {
    if element.is_group() && element.filters.is_empty() {
        for child in &element.children {
            draw_element(target, compositor, child, camera)?;
        }
        return Ok(());
    }
    compositor.apply_filters(target, &element.filters, &|s: &mut Surface| paint(s, element, camera))
}

/// Paint the element's own shape, descendants included, with no filters.
fn paint(target: &mut Surface, element: &Element, camera: &Camera) {
    if element.is_group() {
        for child in &element.children {
            paint(target, child, camera);
        }
        return;
    }

    let Some(path) = shape_path(element) else {
        return;
    };
    target.save();
    target.set_global_alpha(target.global_alpha() * element.opacity);
    target.fill_path(&path, element_transform(element, camera), fill_color(element));
    target.restore();
}

/// The element's scaled, unrotated outline centered on the origin.
#[allow(clippy::cast_possible_truncation)]
fn shape_path(element: &Element) -> Option<Path> {
    let size = element.size.scaled(element.scale);
    let (w, h) = (size.width.abs() as f32, size.height.abs() as f32);
    let rect = Rect::from_xywh(-w / 2.0, -h / 2.0, w, h)?;
    match element.kind {
        ElementKind::Rect => Some(PathBuilder::from_rect(rect)),
        ElementKind::Ellipse => PathBuilder::from_oval(rect),
        ElementKind::Group => None,
    }
}

/// Element-local to screen: rotate clockwise, move to the element's
/// position, then apply the camera.
#[allow(clippy::cast_possible_truncation)]
fn element_transform(element: &Element, camera: &Camera) -> Transform {
    let (sin, cos) = element.rotation.to_radians().sin_cos();
    let z = camera.zoom;
    let origin = camera.world_to_screen(element.position);
    Transform::from_row(
        (z * cos) as f32,
        (z * sin) as f32,
        (-z * sin) as f32,
        (z * cos) as f32,
        origin.x as f32,
        origin.y as f32,
    )
}

fn fill_color(element: &Element) -> Color {
    Color::from_hex(element.props().fill())
        .or_else(|| Color::from_hex(DEFAULT_FILL))
        .unwrap_or(Color::BLACK)
}

// =============================================================
// Overlay
// =============================================================

fn draw_selection(target: &mut Surface, tbox: &TransformBox, camera: &Camera, config: &EngineConfig) {
    let (Some(bbox), Some(handles)) = (tbox.bounding_box(), tbox.handles()) else {
        return;
    };
    let outline = config.outline();
    draw_outline(target, bbox, camera, outline);

    let fill = config.handle_fill();
    for (_, point) in handles.iter() {
        let c = camera.world_to_screen(point);
        let h = HANDLE_HALF_SIZE_PX;
        target.fill_rect(c.x - h - 1.0, c.y - h - 1.0, 2.0 * (h + 1.0), 2.0 * (h + 1.0), outline);
        target.fill_rect(c.x - h, c.y - h, 2.0 * h, 2.0 * h, fill);
    }

    let anchor = camera.world_to_screen(tbox.anchor_point());
    if let Some(marker) = circle(anchor, ANCHOR_RADIUS_PX) {
        target.fill_path(&marker, Transform::identity(), outline);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn circle(center: Point, radius: f64) -> Option<Path> {
    PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
}

fn draw_outline(target: &mut Surface, bbox: &BoundingBox, camera: &Camera, color: Color) {
    let corners = bbox.corners().map(|p| camera.world_to_screen(p));
    stroke_polygon(target, &corners, color);
}

fn draw_marquee(target: &mut Surface, a: Point, b: Point, color: Color) {
    let (min, max) = (a.min(b), a.max(b));
    stroke_polygon(target, &[min, Point::new(max.x, min.y), max, Point::new(min.x, max.y)], color);
}

/// Stroke the closed polygon through `points` (screen pixels).
#[allow(clippy::cast_possible_truncation)]
fn stroke_polygon(target: &mut Surface, points: &[Point], color: Color) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();
    if let Some(path) = pb.finish() {
        target.stroke_path(&path, OUTLINE_WIDTH_PX, color);
    }
}
