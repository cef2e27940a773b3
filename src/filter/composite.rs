//! Re-lays the element with the filter's own alpha and composite op.

use super::{Applies, DrawFn, Filter, FilterCommon, FilterKind, Record};
use crate::blend::CompositeOp;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeFilter;

impl CompositeFilter {
    pub const ID: &'static str = "composite";
    pub const LABEL: &'static str = "Composite";

    #[must_use]
    pub fn default_common() -> FilterCommon {
        FilterCommon::new(Self::LABEL, Applies::After, 10, 1.0, CompositeOp::SourceOver)
    }

    pub(super) fn render(target: &mut Surface, draw: &DrawFn<'_>) {
        draw(target);
    }
}

pub(super) fn parse(record: &Record<'_>) -> Filter {
    let common = CompositeFilter::default_common().read(record);
    Filter::with_common(FilterKind::Composite(CompositeFilter), common)
}
