//! Pointer behaviour of the Grab, Rotate and Scale tools.
//!
//! A drag starts from a snapshot of the selected elements and of the
//! [`TransformBox`]. Every pointer-move restores that snapshot and applies the
//! total transform since the press, so the result depends only on where the
//! pointer is now, never on the path it took. Release keeps the result; cancel
//! restores the snapshot.
//!
//! Rotate and scale read the pointer in the box's own frame: positions are
//! de-rotated about the box center by `-rotation` before any delta is taken.

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;

use tracing::debug;

use crate::config::EngineConfig;
use crate::consts::GEOMETRY_EPSILON;
use crate::doc::{DocStore, ElementId};
use crate::geom::{Point, normalize_deg, rotate_point, snap_angle};
use crate::hit::{Axes, Handle, marquee_select};
use crate::input::{Drag, DragOp, DragSnapshot, Modifiers, Tool};
use crate::transform_box::TransformBox;

/// Alt-press: pin the pivot at `world` without starting a drag.
pub fn place_anchor(tbox: &mut TransformBox, world: Point) {
    if tbox.is_empty() {
        return;
    }
    tbox.set_anchor_point(world);
    debug!(x = world.x, y = world.y, "anchor placed");
}

/// Start a drag for `tool` at canvas point `world`.
///
/// Returns `None` when nothing is selected. `handle_radius` is the handle hit
/// radius already converted to canvas units.
#[must_use]
pub fn begin_drag(tool: Tool, doc: &DocStore, tbox: &TransformBox, world: Point, handle_radius: f64) -> Option<Drag> {
    let handles = tbox.handles()?;
    let op = match tool {
        Tool::Grab => DragOp::Grab { start_position: tbox.position() },
        Tool::Rotate => DragOp::Rotate { anchor: tbox.anchor_point(), start_rotation: tbox.rotation() },
        Tool::Scale => {
            let handle = handles.nearest(world, handle_radius);
            let anchor = match handle {
                _ if tbox.has_custom_anchor() => tbox.anchor_point(),
                Some(h) => handles.get(h.opposite()),
                None => tbox.anchor_point(),
            };
            let axes = handle.map_or(Axes::Both, Handle::axes);
            DragOp::Scale { anchor, handle, axes }
        }
    };
    debug!(?tool, ?op, "drag started");
    Some(Drag {
        op,
        start_world: world,
        snapshot: DragSnapshot { elements: doc.snapshot(tbox.selection()), tbox: tbox.clone() },
        moved: false,
    })
}

/// Replay the drag from its snapshot with the pointer now at `world`.
/// Returns every element id the drag touches.
pub fn drag_to(
    drag: &mut Drag,
    doc: &mut DocStore,
    tbox: &mut TransformBox,
    world: Point,
    modifiers: Modifiers,
    config: &EngineConfig,
) -> Vec<ElementId> {
    restore(drag, doc, tbox);
    let start = &drag.snapshot.tbox;
    let touched = match drag.op {
        DragOp::Grab { start_position } => tbox.update_position(doc, start_position + (world - drag.start_world)),
        DragOp::Rotate { anchor, start_rotation } => {
            let mut angle = start_rotation + sweep(anchor, drag.start_world, world);
            if modifiers.ctrl {
                angle = snap_angle(angle, config.rotate_increment_deg);
            }
            tbox.update_rotation(doc, angle, Some(anchor))
        }
        DragOp::Scale { anchor, axes, .. } => {
            if axes == Axes::Fixed {
                return Vec::new();
            }
            let frame = Frame { center: start.position(), rotation: start.rotation() };
            let factor = scale_factor(
                axes,
                frame.local(anchor),
                frame.local(drag.start_world),
                frame.local(world),
                modifiers.shift,
                config.min_scale_factor,
            );
            tbox.update_scale(doc, factor, Some(anchor))
        }
    };
    drag.moved = true;
    touched
}

/// End the drag, keeping its result. Returns the ids it changed, or nothing
/// if the pointer never moved.
#[must_use]
pub fn finish_drag(drag: &Drag, doc: &DocStore) -> Vec<ElementId> {
    debug!(moved = drag.moved, "drag finished");
    if !drag.moved {
        return Vec::new();
    }
    let mut ids = Vec::new();
    for id in drag.snapshot.tbox.selection() {
        if let Some(element) = doc.get(id) {
            element.collect_ids(&mut ids);
        }
    }
    ids
}

/// Abort the drag, putting elements and box back exactly as they were at press.
pub fn cancel_drag(drag: &Drag, doc: &mut DocStore, tbox: &mut TransformBox) {
    restore(drag, doc, tbox);
    debug!("drag cancelled");
}

/// The selection a marquee from `start` to `end` produces. An additive
/// marquee keeps `current` and appends newly enclosed ids.
#[must_use]
pub fn marquee_selection(doc: &DocStore, start: Point, end: Point, additive: bool, current: &[ElementId]) -> Vec<ElementId> {
    let enclosed = marquee_select(doc, start, end);
    if !additive {
        return enclosed;
    }
    let mut selection = current.to_vec();
    for id in enclosed {
        if !selection.contains(&id) {
            selection.push(id);
        }
    }
    selection
}

fn restore(drag: &Drag, doc: &mut DocStore, tbox: &mut TransformBox) {
    doc.restore(&drag.snapshot.elements);
    tbox.clone_from(&drag.snapshot.tbox);
}

/// Signed angle in degrees swept about `anchor` from `from` to `to`, the
/// short way round: always in `(-180, 180]`.
fn sweep(anchor: Point, from: Point, to: Point) -> f64 {
    let (a, b) = (from - anchor, to - anchor);
    if a.length() < GEOMETRY_EPSILON || b.length() < GEOMETRY_EPSILON {
        return 0.0;
    }
    let delta = normalize_deg(b.angle_deg() - a.angle_deg());
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// The box's unrotated frame: center plus rotation.
struct Frame {
    center: Point,
    rotation: f64,
}

impl Frame {
    fn local(&self, world: Point) -> Point {
        rotate_point(world, self.center, -self.rotation)
    }
}

/// Per-axis scale factor for a pointer that moved from `start` to `current`,
/// all three points in the box frame.
///
/// An axis whose start offset from the anchor is ~0 has no defined ratio; it
/// copies the other axis when that one is defined, otherwise stays at 1.
/// `uniform` uses the ratio of distances on both axes. Each factor keeps its
/// sign but its magnitude never drops below `min`.
#[must_use]
pub fn scale_factor(axes: Axes, anchor: Point, start: Point, current: Point, uniform: bool, min: f64) -> Point {
    let from = start - anchor;
    let to = current - anchor;

    let factor = if uniform {
        let d = from.length();
        let f = if d < GEOMETRY_EPSILON { 1.0 } else { to.length() / d };
        Point::splat(f)
    } else {
        let ratio = |num: f64, den: f64| if den.abs() < GEOMETRY_EPSILON { None } else { Some(num / den) };
        let (fx, fy) = (ratio(to.x, from.x), ratio(to.y, from.y));
        let (fx, fy) = match (fx, fy) {
            (Some(x), Some(y)) => (x, y),
            (Some(x), None) => (x, x),
            (None, Some(y)) => (y, y),
            (None, None) => (1.0, 1.0),
        };
        match axes {
            Axes::X => Point::new(fx, 1.0),
            Axes::Y => Point::new(1.0, fy),
            Axes::Both => Point::new(fx, fy),
            Axes::Fixed => Point::ONE,
        }
    };

    Point::new(clamp_magnitude(factor.x, min), clamp_magnitude(factor.y, min))
}

fn clamp_magnitude(f: f64, min: f64) -> f64 {
    if f.abs() < min { min.copysign(f) } else { f }
}
