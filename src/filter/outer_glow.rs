//! A colored halo around the element's silhouette.

use serde_json::{Map, Value};

use super::{Applies, DrawFn, Filter, FilterCommon, FilterKind, Record, clamp_radius, cut_silhouette};
use crate::blend::CompositeOp;
use crate::surface::{Color, Surface};

#[derive(Debug, Clone, PartialEq)]
pub struct OuterGlow {
    size: f64,
    blur: f64,
    color: Color,
}

impl Default for OuterGlow {
    fn default() -> Self {
        Self { size: 6.0, blur: 4.0, color: Color::rgba(0xFF, 0xD8, 0x4A, 255) }
    }
}

impl OuterGlow {
    pub const ID: &'static str = "outer-glow";
    pub const LABEL: &'static str = "Outer Glow";

    #[must_use]
    pub fn default_common() -> FilterCommon {
        FilterCommon::new(Self::LABEL, Applies::Before, 1, 0.8, CompositeOp::Screen)
    }

    /// How far the silhouette is grown before blurring, in pixels.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[must_use]
    pub fn blur(&self) -> f64 {
        self.blur
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_size(&mut self, size: f64) {
        if let Some(size) = clamp_radius(size) {
            self.size = size;
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
        target.dilate(self.size);
        target.tint(self.color);
        target.blur(self.blur);
        cut_silhouette(target, draw);
    }

    pub(super) fn write(&self, map: &mut Map<String, Value>) {
        map.insert("size".into(), Value::from(self.size));
        map.insert("blur".into(), Value::from(self.blur));
        map.insert("color".into(), Value::from(self.color.to_hex()));
    }
}

pub(super) fn parse(record: &Record<'_>) -> Filter {
    let mut glow = OuterGlow::default();
    if let Some(size) = record.f64("size") {
        glow.set_size(size);
    }
    if let Some(blur) = record.f64("blur") {
        glow.set_blur(blur);
    }
    if let Some(color) = record.color("color") {
        glow.set_color(color);
    }
    let common = OuterGlow::default_common().read(record);
    Filter::with_common(FilterKind::OuterGlow(glow), common)
}
