//! Layered filter compositing.
//!
//! The [`Compositor`] owns three working surfaces sized to the canvas:
//!
//! | Surface | Holds |
//! |---------|-------|
//! | `copy` | The destination as it was before the element drew |
//! | `effects` | The accumulating result |
//! | `scratch` | One filter's output at a time |
//!
//! None of them carry content between calls; every [`Compositor::apply_filters`]
//! clears and repopulates them. Filters must not call back into the compositor.

#[cfg(test)]
#[path = "compositor_test.rs"]
mod compositor_test;

use tracing::info;

use crate::blend::CompositeOp;
use crate::error::RenderError;
use crate::filter::{Applies, DrawFn, Filter};
use crate::surface::Surface;

#[derive(Debug, Clone)]
pub struct Compositor {
    copy: Surface,
    effects: Surface,
    scratch: Surface,
}

impl Compositor {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { copy: Surface::new(width, height), effects: Surface::new(width, height), scratch: Surface::new(width, height) }
    }

    /// Match the working surfaces to a new canvas size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.size() == (width, height) {
            return;
        }
        self.copy.resize(width, height);
        self.effects.resize(width, height);
        self.scratch.resize(width, height);
        info!(width, height, "compositor resized");
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.effects.size()
    }

    /// Draw an element onto `dest` through its filter chain.
    ///
    /// `draw` paints the element's own pixels onto whatever surface it is
    /// given. With no filters it is called once on `dest` and nothing else
    /// happens. Otherwise "before" filters are layered beneath the element and
    /// "after" filters replace the element's silhouette with their output,
    /// each group in ascending priority (ties keep list order).
    ///
    /// # Errors
    ///
    /// [`RenderError::SizeMismatch`] when filters are present and `dest` is
    /// not the compositor's size. `dest` is untouched in that case.
    pub fn apply_filters(&mut self, dest: &mut Surface, filters: &[Filter], draw: &DrawFn<'_>) -> Result<(), RenderError> {
        if filters.is_empty() {
            draw(dest);
            return Ok(());
        }
        if dest.size() != self.size() {
            return Err(RenderError::SizeMismatch { expected: self.size(), actual: dest.size() });
        }

        let before = ordered(filters, Applies::Before);
        let after = ordered(filters, Applies::After);

        self.copy.clear();
        self.effects.clear();
        self.scratch.clear();
        self.copy.draw_surface(dest, 0, 0);
        self.effects.draw_surface(dest, 0, 0);

        for filter in &before {
            self.render_scratch(filter, draw);
            layer(&mut self.effects, &self.scratch, filter.common().global_alpha(), filter.common().composite);
        }

        if after.is_empty() {
            draw(&mut self.effects);
        }
        for filter in &after {
            self.render_scratch(filter, draw);
            // Swap the element's raw pixels for the pre-element backdrop.
            self.effects.save();
            self.effects.set_composite(CompositeOp::DestinationOut);
            draw(&mut self.effects);
            self.effects.set_composite(CompositeOp::DestinationOver);
            self.effects.draw_surface(&self.copy, 0, 0);
            self.effects.restore();
            layer(&mut self.effects, &self.scratch, filter.common().global_alpha(), filter.common().composite);
        }

        layer(dest, &self.effects, 1.0, CompositeOp::Copy);
        Ok(())
    }

    fn render_scratch(&mut self, filter: &Filter, draw: &DrawFn<'_>) {
        self.scratch.clear();
        filter.render(&mut self.scratch, draw);
    }
}

/// Filters placed at `applies`, stably sorted by priority.
fn ordered(filters: &[Filter], applies: Applies) -> Vec<&Filter> {
    let mut out: Vec<&Filter> = filters.iter().filter(|f| f.applies() == applies).collect();
    out.sort_by_key(|f| f.priority());
    out
}

/// Draw `src` over all of `dest` with a one-off alpha and composite op.
fn layer(dest: &mut Surface, src: &Surface, alpha: f64, op: CompositeOp) {
    dest.save();
    dest.set_global_alpha(alpha);
    dest.set_composite(op);
    dest.draw_surface(src, 0, 0);
    dest.restore();
}
