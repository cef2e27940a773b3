//! Brightness, contrast, saturation and hue adjustment of the element's pixels.

use serde_json::{Map, Value};

use super::{Applies, DrawFn, Filter, FilterCommon, FilterKind, Record};
use crate::blend::CompositeOp;
use crate::geom::normalize_deg;
use crate::surface::Surface;

/// Rec. 709 luma weights.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Adjustments applied in order: brightness, contrast, saturation, hue.
///
/// `brightness`, `contrast` and `saturation` live in `[-1, 1]` with 0 as the
/// identity; `hue` is a rotation in degrees.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorCorrection {
    brightness: f64,
    contrast: f64,
    saturation: f64,
    hue: f64,
}

impl ColorCorrection {
    pub const ID: &'static str = "color-correction";
    pub const LABEL: &'static str = "Color Correction";

    #[must_use]
    pub fn default_common() -> FilterCommon {
        FilterCommon::new(Self::LABEL, Applies::After, 0, 1.0, CompositeOp::SourceOver)
    }

    #[must_use]
    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    #[must_use]
    pub fn contrast(&self) -> f64 {
        self.contrast
    }

    #[must_use]
    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    #[must_use]
    pub fn hue(&self) -> f64 {
        self.hue
    }

    pub fn set_brightness(&mut self, v: f64) {
        if let Some(v) = unit(v) {
            self.brightness = v;
        }
    }

    pub fn set_contrast(&mut self, v: f64) {
        if let Some(v) = unit(v) {
            self.contrast = v;
        }
    }

    pub fn set_saturation(&mut self, v: f64) {
        if let Some(v) = unit(v) {
            self.saturation = v;
        }
    }

    /// Stored wrapped into `[0, 360)`.
    pub fn set_hue(&mut self, degrees: f64) {
        if degrees.is_finite() {
            self.hue = normalize_deg(degrees);
        }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.brightness == 0.0 && self.contrast == 0.0 && self.saturation == 0.0 && self.hue == 0.0
    }

    pub(super) fn render(&self, target: &mut Surface, draw: &DrawFn<'_>) {
        draw(target);
        if self.is_identity() {
            return;
        }
        let adjust = self.adjuster();
        target.map_colors(adjust);
    }

    pub(super) fn write(&self, map: &mut Map<String, Value>) {
        map.insert("brightness".into(), Value::from(self.brightness));
        map.insert("contrast".into(), Value::from(self.contrast));
        map.insert("saturation".into(), Value::from(self.saturation));
        map.insert("hue".into(), Value::from(self.hue));
    }

    /// The per-pixel straight-alpha RGB transform.
    #[allow(clippy::cast_possible_truncation)]
    fn adjuster(&self) -> impl Fn([f32; 3]) -> [f32; 3] + use<> {
        let brightness = self.brightness as f32;
        let contrast = 1.0 + self.contrast as f32;
        let saturation = 1.0 + self.saturation as f32;
        let hue = hue_matrix(self.hue);
        move |rgb: [f32; 3]| {
            let rgb = rgb.map(|c| (c + brightness - 0.5) * contrast + 0.5);
            let luma = rgb[0] * LUMA[0] + rgb[1] * LUMA[1] + rgb[2] * LUMA[2];
            let rgb = rgb.map(|c| luma + (c - luma) * saturation);
            [
                hue[0][0] * rgb[0] + hue[0][1] * rgb[1] + hue[0][2] * rgb[2],
                hue[1][0] * rgb[0] + hue[1][1] * rgb[1] + hue[1][2] * rgb[2],
                hue[2][0] * rgb[0] + hue[2][1] * rgb[1] + hue[2][2] * rgb[2],
            ]
        }
    }
}

/// The CSS `hue-rotate()` matrix.
#[allow(clippy::cast_possible_truncation)]
fn hue_matrix(degrees: f64) -> [[f32; 3]; 3] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (s, c) = (sin as f32, cos as f32);
    [
        [0.213 + c * 0.787 - s * 0.213, 0.715 - c * 0.715 - s * 0.715, 0.072 - c * 0.072 + s * 0.928],
        [0.213 - c * 0.213 + s * 0.143, 0.715 + c * 0.285 + s * 0.140, 0.072 - c * 0.072 - s * 0.283],
        [0.213 - c * 0.213 - s * 0.787, 0.715 - c * 0.715 + s * 0.715, 0.072 + c * 0.928 + s * 0.072],
    ]
}

fn unit(v: f64) -> Option<f64> {
    v.is_finite().then(|| v.clamp(-1.0, 1.0))
}

pub(super) fn parse(record: &Record<'_>) -> Filter {
    let mut cc = ColorCorrection::default();
    if let Some(v) = record.f64("brightness") {
        cc.set_brightness(v);
    }
    if let Some(v) = record.f64("contrast") {
        cc.set_contrast(v);
    }
    if let Some(v) = record.f64("saturation") {
        cc.set_saturation(v);
    }
    if let Some(v) = record.f64("hue") {
        cc.set_hue(v);
    }
    let common = ColorCorrection::default_common().read(record);
    Filter::with_common(FilterKind::ColorCorrection(cc), common)
}
