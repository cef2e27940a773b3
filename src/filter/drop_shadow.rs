//! Offset, blurred copy of the element's silhouette drawn beneath it.

use serde_json::{Map, Value};

use super::{Applies, DrawFn, Filter, FilterCommon, FilterKind, Record, clamp_radius, cut_silhouette};
use crate::blend::CompositeOp;
use crate::surface::{Color, Surface};

/// A drop shadow: `(offset_x, offset_y)` in pixels, Gaussian `blur`, shadow `color`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropShadow {
    offset_x: f64,
    offset_y: f64,
    blur: f64,
    color: Color,
}

impl Default for DropShadow {
    fn default() -> Self {
        Self { offset_x: 4.0, offset_y: 4.0, blur: 4.0, color: Color::BLACK }
    }
}

impl DropShadow {
    pub const ID: &'static str = "drop-shadow";
    pub const LABEL: &'static str = "Drop Shadow";

    #[must_use]
    pub fn default_common() -> FilterCommon {
        FilterCommon::new(Self::LABEL, Applies::Before, 0, 0.5, CompositeOp::SourceOver)
    }

    #[must_use]
    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    #[must_use]
    pub fn blur(&self) -> f64 {
        self.blur
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Non-finite components are ignored.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        if x.is_finite() {
            self.offset_x = x;
        }
        if y.is_finite() {
            self.offset_y = y;
        }
    }

    pub fn set_blur(&mut self, blur: f64) {
        if let Some(blur) = clamp_radius(blur) {
            self.blur = blur;
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub(super) fn render(&self, target: &mut Surface, draw: &DrawFn<'_>) {
        draw(target);
        target.shift(round_px(self.offset_x), round_px(self.offset_y));
        target.tint(self.color);
        target.blur(self.blur);
        cut_silhouette(target, draw);
    }

    pub(super) fn write(&self, map: &mut Map<String, Value>) {
        map.insert("offsetX".into(), Value::from(self.offset_x));
        map.insert("offsetY".into(), Value::from(self.offset_y));
        map.insert("blur".into(), Value::from(self.blur));
        map.insert("color".into(), Value::from(self.color.to_hex()));
    }
}

pub(super) fn parse(record: &Record<'_>) -> Filter {
    let mut shadow = DropShadow::default();
    shadow.set_offset(
        record.f64("offsetX").unwrap_or(shadow.offset_x),
        record.f64("offsetY").unwrap_or(shadow.offset_y),
    );
    if let Some(blur) = record.f64("blur") {
        shadow.set_blur(blur);
    }
    if let Some(color) = record.color("color") {
        shadow.set_color(color);
    }
    let common = DropShadow::default_common().read(record);
    Filter::with_common(FilterKind::DropShadow(shadow), common)
}

/// Whole-pixel offset; `as` saturates far-off values.
#[allow(clippy::cast_possible_truncation)]
fn round_px(v: f64) -> i32 {
    v.round() as i32
}
