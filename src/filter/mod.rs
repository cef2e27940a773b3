//! Per-element visual filters.
//!
//! A [`Filter`] pairs the parameters every filter shares ([`FilterCommon`]:
//! label, before/after placement, priority, global alpha, composite op) with a
//! closed set of effect kinds ([`FilterKind`]). Filters persist as flat JSON
//! maps keyed by `id`; [`FilterRegistry`] turns such a map back into a filter,
//! filling missing keys with per-kind defaults and ignoring unknown keys.
//!
//! Rendering contract: [`Filter::render`] receives a cleared target surface
//! and the element's draw callback, and leaves only the filter's own output in
//! the target. The compositor decides how that output is layered.


mod color_correction;
mod composite;
mod drop_shadow;
mod outer_glow;
mod registry;

pub use color_correction::ColorCorrection;
pub use composite::CompositeFilter;
pub use drop_shadow::DropShadow;
pub use outer_glow::OuterGlow;
pub use registry::{FilterParser, FilterRegistry};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::blend::CompositeOp;
use crate::surface::{Color, Surface};

/// The element draw callback handed to filters and the compositor.
pub type DrawFn<'a> = dyn Fn(&mut Surface) + 'a;

// =============================================================
// Common parameters
// =============================================================

/// Whether a filter renders beneath the element or over its finished pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applies {
    Before,
    After,
}

impl Applies {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "before" => Some(Self::Before),
            "after" => Some(Self::After),
            _ => None,
        }
    }
}

/// Parameters shared by every filter kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCommon {
    pub label: String,
    pub applies: Applies,
    /// Lower priorities composite first within their `applies` group.
    pub priority: i64,
    global_alpha: f64,
    pub composite: CompositeOp,
}

impl FilterCommon {
    #[must_use]
    pub fn new(label: &str, applies: Applies, priority: i64, global_alpha: f64, composite: CompositeOp) -> Self {
        let mut common = Self { label: label.to_owned(), applies, priority, global_alpha: 1.0, composite };
        common.set_global_alpha(global_alpha);
        common
    }

    #[must_use]
    pub fn global_alpha(&self) -> f64 {
        self.global_alpha
    }

    /// Clamp to `[0, 1]`. Non-finite values are ignored.
    pub fn set_global_alpha(&mut self, alpha: f64) {
        if alpha.is_finite() {
            self.global_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    /// Overlay whatever common keys `record` carries onto `self`.
    fn read(mut self, record: &Record<'_>) -> Self {
        if let Some(label) = record.str("label") {
            self.label = label.to_owned();
        }
        if let Some(applies) = record.str("applies").and_then(Applies::parse) {
            self.applies = applies;
        }
        if let Some(priority) = record.i64("priority") {
            self.priority = priority;
        }
        if let Some(alpha) = record.f64("globalAlpha") {
            self.set_global_alpha(alpha);
        }
        if let Some(op) = record.str("composite").and_then(CompositeOp::parse) {
            self.composite = op;
        }
        self
    }

    fn write(&self, map: &mut Map<String, Value>) {
        map.insert("label".into(), Value::from(self.label.clone()));
        map.insert("applies".into(), Value::from(self.applies.as_str()));
        map.insert("priority".into(), Value::from(self.priority));
        map.insert("globalAlpha".into(), Value::from(self.global_alpha));
        map.insert("composite".into(), Value::from(self.composite.as_str()));
    }
}

// =============================================================
// Record accessor
// =============================================================

/// Typed, lenient access to a persisted filter map.
///
/// Keys with the wrong JSON type read as absent, so they fall back to defaults.
pub struct Record<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Record<'a> {
    #[must_use]
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// The filter id, when present and a string.
    #[must_use]
    pub fn id(&self) -> Option<&'a str> {
        self.str("id")
    }

    #[must_use]
    pub fn str(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn f64(&self, key: &str) -> Option<f64> {
        self.map.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
    }

    /// An integer; a finite fractional number is rounded to the nearest one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn i64(&self, key: &str) -> Option<i64> {
        let value = self.map.get(key)?;
        value.as_i64().or_else(|| value.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i64))
    }

    #[must_use]
    pub fn color(&self, key: &str) -> Option<Color> {
        self.str(key).and_then(Color::from_hex)
    }
}

// =============================================================
// Filter
// =============================================================

/// The closed set of filter effects.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    ColorCorrection(ColorCorrection),
    DropShadow(DropShadow),
    OuterGlow(OuterGlow),
    Composite(CompositeFilter),
}

impl FilterKind {
    /// Persisted id of this kind.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::ColorCorrection(_) => ColorCorrection::ID,
            Self::DropShadow(_) => DropShadow::ID,
            Self::OuterGlow(_) => OuterGlow::ID,
            Self::Composite(_) => CompositeFilter::ID,
        }
    }

    /// Common parameters a freshly created filter of this kind starts with.
    #[must_use]
    pub fn default_common(&self) -> FilterCommon {
        match self {
            Self::ColorCorrection(_) => ColorCorrection::default_common(),
            Self::DropShadow(_) => DropShadow::default_common(),
            Self::OuterGlow(_) => OuterGlow::default_common(),
            Self::Composite(_) => CompositeFilter::default_common(),
        }
    }
}

/// One entry in an element's filter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    common: FilterCommon,
    kind: FilterKind,
}

impl Filter {
    /// A filter with its kind's default common parameters.
    #[must_use]
    pub fn new(kind: FilterKind) -> Self {
        Self { common: kind.default_common(), kind }
    }

    #[must_use]
    pub fn with_common(kind: FilterKind, common: FilterCommon) -> Self {
        Self { common, kind }
    }

    #[must_use]
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    #[must_use]
    pub fn common(&self) -> &FilterCommon {
        &self.common
    }

    pub fn common_mut(&mut self) -> &mut FilterCommon {
        &mut self.common
    }

    #[must_use]
    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut FilterKind {
        &mut self.kind
    }

    #[must_use]
    pub fn applies(&self) -> Applies {
        self.common.applies
    }

    #[must_use]
    pub fn priority(&self) -> i64 {
        self.common.priority
    }

    /// Render this filter's output into `target`, which the caller has cleared.
    pub fn render(&self, target: &mut Surface, draw: &DrawFn<'_>) {
        match &self.kind {
            FilterKind::ColorCorrection(cc) => cc.render(target, draw),
            FilterKind::DropShadow(shadow) => shadow.render(target, draw),
            FilterKind::OuterGlow(glow) => glow.render(target, draw),
            FilterKind::Composite(_) => CompositeFilter::render(target, draw),
        }
    }

    /// The full flat map this filter persists as.
    #[must_use]
    pub fn to_record(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), Value::from(self.id()));
        self.common.write(&mut map);
        match &self.kind {
            FilterKind::ColorCorrection(cc) => cc.write(&mut map),
            FilterKind::DropShadow(shadow) => shadow.write(&mut map),
            FilterKind::OuterGlow(glow) => glow.write(&mut map),
            FilterKind::Composite(_) => {}
        }
        Value::Object(map)
    }
}

/// Draw the element's silhouette onto `target` with destination-out, leaving
/// only what the filter produced outside the element.
fn cut_silhouette(target: &mut Surface, draw: &DrawFn<'_>) {
    target.save();
    target.set_composite(CompositeOp::DestinationOut);
    draw(target);
    target.restore();
}

/// Clamp a radius parameter to `[0, MAX_FILTER_RADIUS]`; non-finite input yields `None`.
fn clamp_radius(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, crate::consts::MAX_FILTER_RADIUS))
}
