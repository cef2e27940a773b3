//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture tracked between pointer-down and
//! pointer-up. A drag carries a snapshot of everything it may touch, so each
//! pointer-move can replay the whole gesture from its start and Escape can
//! put things back exactly.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::{ElementId, TransformSnapshot};
use crate::geom::Point;
use crate::hit::{Axes, Handle};
use crate::transform_box::TransformBox;

/// Which transform tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Move the selection; also selects and marquee-selects (default).
    #[default]
    Grab,
    /// Rotate the selection about its anchor.
    Rotate,
    /// Scale the selection from a handle.
    Scale,
}

impl Tool {
    /// CSS cursor shown while the tool is idle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Grab => "default",
            Self::Rotate => "crosshair",
            Self::Scale => "nwse-resize",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift: uniform scale, additive selection.
    pub shift: bool,
    /// Ctrl: snap rotation.
    pub ctrl: bool,
    /// Alt / Option: place the anchor instead of dragging.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    /// Selected top-level elements, in selection order.
    pub selection: Vec<ElementId>,
}

/// Pre-drag state of everything a drag can change.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSnapshot {
    pub elements: TransformSnapshot,
    pub tbox: TransformBox,
}

/// What a drag does with the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOp {
    Grab {
        /// Box position at drag start.
        start_position: Point,
    },
    Rotate {
        anchor: Point,
        /// Box rotation at drag start, degrees.
        start_rotation: f64,
    },
    Scale {
        anchor: Point,
        /// The handle under the pointer at press, if any.
        handle: Option<Handle>,
        axes: Axes,
    },
}

/// An active transform drag.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub op: DragOp,
    /// Canvas-space pointer position at press.
    pub start_world: Point,
    pub snapshot: DragSnapshot,
    /// Set once a pointer-move has applied a transform.
    pub moved: bool,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A transform drag is in progress.
    Dragging(Drag),
    /// A rubber-band selection is being drawn.
    Marquee {
        start: Point,
        current: Point,
        /// Shift was held at press: add to the selection instead of replacing it.
        additive: bool,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
