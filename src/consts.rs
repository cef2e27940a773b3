//! Shared numeric constants for the engine.

// ── Geometry ────────────────────────────────────────────────────

/// Tolerance below which a length or ratio denominator is treated as zero.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for transform handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Half the side length of a drawn handle square, in screen pixels.
pub const HANDLE_HALF_SIZE_PX: f64 = 4.0;

// ── Tools ───────────────────────────────────────────────────────

/// Snap step for the rotate tool while ctrl is held.
pub const ROTATE_INCREMENT_DEG: f64 = 15.0;

/// Smallest per-axis factor the scale tool will produce.
pub const MIN_SCALE_FACTOR: f64 = 0.001;

// ── Surfaces ────────────────────────────────────────────────────

/// Default surface width in device pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Default surface height in device pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Upper bound for blur and glow radii, in pixels.
pub const MAX_FILTER_RADIUS: f64 = 64.0;
