//! Engine: document, selection, tools and rendering behind one event API.
//!
//! [`EngineCore`] holds every piece of state and all input handling; it needs
//! no browser and is what the tests drive. [`Engine`] adds the canvas element
//! and blits the rendered surface into it.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::debug;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::camera::Camera;
use crate::compositor::Compositor;
use crate::config::EngineConfig;
use crate::doc::{DocStore, Element, ElementId};
use crate::error::{DocError, RenderError};
use crate::filter::FilterRegistry;
use crate::geom::Point;
use crate::hit::element_at;
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState};
use crate::render::{self, Overlay};
use crate::surface::Surface;
use crate::tools;
use crate::transform_box::TransformBox;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Elements moved mid-gesture; not yet final.
    TransformChanged { ids: Vec<ElementId> },
    /// A gesture or direct edit finished and its result stands.
    TransformCommitted { ids: Vec<ElementId> },
    SelectionChanged { ids: Vec<ElementId> },
    ElementsDeleted { ids: Vec<ElementId> },
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
pub struct EngineCore {
    pub doc: DocStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    tbox: TransformBox,
    compositor: Compositor,
    registry: FilterRegistry,
    config: EngineConfig,
    surface: Surface,
    cursor: &'static str,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine sized and styled by `config`, with the built-in filters.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let (w, h) = (config.canvas_width, config.canvas_height);
        Self {
            doc: DocStore::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            tbox: TransformBox::empty(),
            compositor: Compositor::new(w, h),
            registry: FilterRegistry::with_builtins(),
            config,
            surface: Surface::new(w, h),
            cursor: Tool::default().cursor(),
        }
    }

    // --- Data inputs ---

    /// Replace the document with elements parsed from JSON. Selection and any
    /// gesture in progress are dropped.
    ///
    /// # Errors
    ///
    /// [`DocError`] if the JSON is malformed or an element is invalid; the
    /// document is left as it was.
    pub fn load_elements_json(&mut self, raw: &str) -> Result<usize, DocError> {
        let count = self.doc.load_json(raw, &self.registry)?;
        self.input = InputState::Idle;
        self.ui.selection.clear();
        self.tbox = TransformBox::empty();
        Ok(count)
    }

    /// Add one element to the document, replacing any element with its id.
    ///
    /// Replacing a selected element abandons the current gesture and rebuilds
    /// the box around the new geometry.
    pub fn insert(&mut self, element: Element) -> Vec<Action> {
        if !self.ui.selection.contains(&element.id) {
            self.doc.insert(element);
            return Vec::new();
        }
        let mut actions = self.cancel_gesture();
        self.doc.insert(element);
        let selection = self.ui.selection.clone();
        actions.extend(self.set_selection(&selection));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Filter parsers used when loading documents.
    pub fn registry_mut(&mut self) -> &mut FilterRegistry {
        &mut self.registry
    }

    // --- Selection / tool ---

    /// Select exactly `ids` (unknown ids are dropped) and rebuild the box.
    pub fn select(&mut self, ids: &[ElementId]) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        actions.extend(self.set_selection(ids));
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        self.select(&[])
    }

    /// Switch tools. The box, and so a custom anchor, survives the switch.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.ui.tool = tool;
        actions.extend(self.set_cursor(tool.cursor()));
        actions
    }

    /// Resize the drawing surface. CSS size times `dpr` gives device pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let device = |css: f64| {
            let px = (css * dpr).round();
            if px.is_finite() && px >= 1.0 { px.min(f64::from(u32::MAX)) as u32 } else { 1 }
        };
        let (w, h) = (device(width_css), device(height_css));
        if self.surface.size() != (w, h) {
            self.surface.resize(w, h);
            self.compositor.resize(w, h);
        }
        vec![Action::RenderNeeded]
    }

    /// Set the opacity of everything selected.
    pub fn set_opacity(&mut self, opacity: f64) -> Vec<Action> {
        if !opacity.is_finite() || self.tbox.is_empty() {
            return Vec::new();
        }
        let ids = self.tbox.update_opacity(&mut self.doc, opacity.clamp(0.0, 1.0));
        vec![Action::TransformCommitted { ids }, Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);

        if modifiers.alt {
            if self.tbox.is_empty() {
                return Vec::new();
            }
            tools::place_anchor(&mut self.tbox, world);
            return vec![Action::RenderNeeded];
        }

        let mut actions = Vec::new();
        if self.ui.tool == Tool::Grab {
            match element_at(&self.doc, world) {
                Some(id) if self.ui.selection.contains(&id) => {
                    if modifiers.shift {
                        let rest: Vec<ElementId> = self.ui.selection.iter().copied().filter(|s| *s != id).collect();
                        actions.extend(self.set_selection(&rest));
                        actions.push(Action::RenderNeeded);
                        return actions;
                    }
                }
                Some(id) => {
                    let mut ids = if modifiers.shift { self.ui.selection.clone() } else { Vec::new() };
                    ids.push(id);
                    actions.extend(self.set_selection(&ids));
                }
                None if self.grab_hits_box(world) => {}
                None => {
                    if !modifiers.shift && !self.ui.selection.is_empty() {
                        actions.extend(self.set_selection(&[]));
                    }
                    self.input = InputState::Marquee { start: world, current: world, additive: modifiers.shift };
                    debug!("marquee started");
                    actions.push(Action::RenderNeeded);
                    return actions;
                }
            }
        }

        let radius = self.camera.screen_dist_to_world(self.config.handle_radius_px);
        if let Some(drag) = tools::begin_drag(self.ui.tool, &self.doc, &self.tbox, world, radius) {
            self.input = InputState::Dragging(drag);
            actions.extend(self.set_cursor(if self.ui.tool == Tool::Grab { "grabbing" } else { self.ui.tool.cursor() }));
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match &mut self.input {
            InputState::Dragging(drag) => {
                let ids = tools::drag_to(drag, &mut self.doc, &mut self.tbox, world, modifiers, &self.config);
                if ids.is_empty() {
                    Vec::new()
                } else {
                    vec![Action::TransformChanged { ids }, Action::RenderNeeded]
                }
            }
            InputState::Marquee { current, .. } => {
                *current = world;
                vec![Action::RenderNeeded]
            }
            InputState::Idle => {
                let cursor = if self.ui.tool == Tool::Grab && self.grab_hits_box(world) {
                    "move"
                } else {
                    self.ui.tool.cursor()
                };
                self.set_cursor(cursor)
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::Dragging(drag) => {
                let ids = tools::finish_drag(&drag, &self.doc);
                if !ids.is_empty() {
                    actions.push(Action::TransformCommitted { ids });
                }
                let cursor = if self.ui.tool == Tool::Grab { "move" } else { self.ui.tool.cursor() };
                actions.extend(self.set_cursor(cursor));
                actions.push(Action::RenderNeeded);
            }
            InputState::Marquee { start, additive, .. } => {
                let ids = tools::marquee_selection(&self.doc, start, world, additive, &self.ui.selection);
                debug!(count = ids.len(), "marquee finished");
                actions.extend(self.set_selection(&ids));
                actions.push(Action::RenderNeeded);
            }
            InputState::Idle => {}
        }
        actions
    }

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is("Escape") {
            if self.input.is_idle() {
                if self.ui.selection.is_empty() {
                    return Vec::new();
                }
                return self.clear_selection();
            }
            let mut actions = self.cancel_gesture();
            actions.push(Action::RenderNeeded);
            return actions;
        }
        if (key.is("Delete") || key.is("Backspace")) && self.input.is_idle() && !self.ui.selection.is_empty() {
            let ids = std::mem::take(&mut self.ui.selection);
            for id in &ids {
                self.doc.remove(id);
            }
            self.tbox = TransformBox::empty();
            debug!(count = ids.len(), "elements deleted");
            return vec![
                Action::ElementsDeleted { ids },
                Action::SelectionChanged { ids: Vec::new() },
                Action::RenderNeeded,
            ];
        }
        Vec::new()
    }

    // --- Render ---

    /// Redraw the scene into the engine's surface.
    ///
    /// # Errors
    ///
    /// Propagates [`RenderError`] from the compositor.
    pub fn render(&mut self) -> Result<(), RenderError> {
        let marquee = match self.input {
            InputState::Marquee { start, current, .. } => Some((start, current)),
            _ => None,
        };
        let overlay = Overlay { tbox: &self.tbox, marquee };
        render::draw(&mut self.surface, &mut self.compositor, &self.doc, &self.camera, overlay, &self.config)
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        &self.ui.selection
    }

    #[must_use]
    pub fn transform_box(&self) -> &TransformBox {
        &self.tbox
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn cursor(&self) -> &'static str {
        self.cursor
    }

    // --- internals ---

    fn grab_hits_box(&self, world: Point) -> bool {
        self.tbox.bounding_box().is_some_and(|b| b.is_point_inside(world))
    }

    fn set_selection(&mut self, ids: &[ElementId]) -> Vec<Action> {
        self.tbox = TransformBox::new(&self.doc, ids);
        self.ui.selection = self.tbox.selection().to_vec();
        vec![Action::SelectionChanged { ids: self.ui.selection.clone() }]
    }

    /// Abandon whatever gesture is in progress, restoring a drag's snapshot.
    fn cancel_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Dragging(drag) => {
                tools::cancel_drag(&drag, &mut self.doc, &mut self.tbox);
                let ids = tools::finish_drag(&drag, &self.doc);
                if ids.is_empty() { Vec::new() } else { vec![Action::TransformChanged { ids }] }
            }
            InputState::Marquee { .. } => {
                debug!("marquee cancelled");
                Vec::new()
            }
            InputState::Idle => Vec::new(),
        }
    }

    fn set_cursor(&mut self, cursor: &'static str) -> Vec<Action> {
        if self.cursor == cursor {
            return Vec::new();
        }
        self.cursor = cursor;
        vec![Action::SetCursor(cursor.to_owned())]
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine bound to `canvas`, sized from the canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let config = EngineConfig {
            canvas_width: canvas.width().max(1),
            canvas_height: canvas.height().max(1),
            ..EngineConfig::default()
        };
        Self { canvas, core: EngineCore::with_config(config) }
    }

    /// Create an engine from a JSON config. The canvas element is resized to match.
    ///
    /// # Errors
    ///
    /// Returns the config error as a `JsValue` string.
    pub fn with_config_json(canvas: HtmlCanvasElement, raw: &str) -> Result<Self, JsValue> {
        let config = EngineConfig::from_json(raw).map_err(|e| JsValue::from_str(&e.to_string()))?;
        canvas.set_width(config.canvas_width);
        canvas.set_height(config.canvas_height);
        Ok(Self { canvas, core: EngineCore::with_config(config) })
    }

    // --- Delegated inputs ---

    /// # Errors
    ///
    /// Returns the load error as a `JsValue` string.
    pub fn load_elements_json(&mut self, raw: &str) -> Result<usize, JsValue> {
        self.core.load_elements_json(raw).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn select(&mut self, ids: &[ElementId]) -> Vec<Action> {
        self.core.select(ids)
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        self.core.clear_selection()
    }

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.core.set_tool(tool)
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Vec<Action> {
        self.core.set_opacity(opacity)
    }

    /// Resize the core surface and the canvas backing store together.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_viewport(width_css, height_css, dpr);
        let (w, h) = self.core.surface().size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        actions
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Render ---

    /// Render the scene and copy it into the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if rendering fails or any `Canvas2D` call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.core.render().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        let surface = self.core.surface();
        let bytes = surface.to_rgba8();
        let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(bytes.as_slice()), surface.width(), surface.height())?;
        ctx.put_image_data(&image, 0.0, 0.0)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.core.element(id)
    }
}
