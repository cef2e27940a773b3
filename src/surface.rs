//! CPU raster surfaces.
//!
//! A [`Surface`] wraps a `tiny_skia::Pixmap` (premultiplied RGBA8) with a
//! Canvas2D-like draw state: a global alpha and a composite operation, pushed
//! and popped with `save`/`restore`. Fills, strokes and surface-to-surface
//! blits all go through tiny-skia with the state's blend mode, and touch only
//! the pixels the shape covers.
//!
//! The filter effects (tint, blur, dilation, color mapping) work on the
//! pixmap's pixels directly, with float intermediates.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use tiny_skia::{
    BlendMode, FillRule, FilterQuality, Paint, Path, Pixmap, PixmapPaint, PremultipliedColorU8, Rect, Stroke, Transform,
};

use crate::blend::CompositeOp;

/// Premultiplied channels in `[0, 1]`.
type Channels = [f32; 4];

const CLEAR: Channels = [0.0; 4];

// =============================================================
// Color
// =============================================================

/// A straight-alpha 8-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| hex_byte(digits.get(i..i + 2)?);
        match digits.len() {
            6 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    #[must_use]
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Straight color of a stored pixel.
    #[must_use]
    pub fn from_pixel(px: PremultipliedColorU8) -> Self {
        let c = px.demultiply();
        Self::rgba(c.red(), c.green(), c.blue(), c.alpha())
    }

    fn to_skia(self, opacity: f32) -> tiny_skia::Color {
        let mut c = tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a);
        c.apply_opacity(opacity);
        c
    }

    fn premultiplied(self) -> Channels {
        let a = f32::from(self.a) / 255.0;
        [
            f32::from(self.r) / 255.0 * a,
            f32::from(self.g) / 255.0 * a,
            f32::from(self.b) / 255.0 * a,
            a,
        ]
    }
}

#[allow(clippy::cast_possible_truncation)]
fn hex_byte(pair: &str) -> Option<u8> {
    let mut chars = pair.chars();
    let hi = chars.next()?.to_digit(16)?;
    let lo = chars.next()?.to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn channels(px: PremultipliedColorU8) -> Channels {
    [px.red(), px.green(), px.blue(), px.alpha()].map(|c| f32::from(c) / 255.0)
}

/// Quantize premultiplied channels, keeping every color channel at or below alpha.
fn quantize(ch: Channels) -> PremultipliedColorU8 {
    let a = to_byte(ch[3]);
    let c = |v: f32| to_byte(v).min(a);
    PremultipliedColorU8::from_rgba(c(ch[0]), c(ch[1]), c(ch[2]), a).unwrap_or(PremultipliedColorU8::TRANSPARENT)
}

// =============================================================
// Surface
// =============================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawState {
    alpha: f32,
    op: CompositeOp,
}

impl Default for DrawState {
    fn default() -> Self {
        Self { alpha: 1.0, op: CompositeOp::SourceOver }
    }
}

/// A premultiplied RGBA raster with a Canvas2D-style draw state.
///
/// A zero-sized surface has no pixmap: draws do nothing and reads return
/// nothing.
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Option<Pixmap>,
    width: u32,
    height: u32,
    state: DrawState,
    saved: Vec<DrawState>,
}

impl Surface {
    /// A transparent surface of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { pixmap: Pixmap::new(width, height), width, height, state: DrawState::default(), saved: Vec::new() }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reallocate to a new size. Contents and draw state are reset.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Make every pixel transparent and reset the draw state.
    pub fn clear(&mut self) {
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
        self.state = DrawState::default();
        self.saved.clear();
    }

    // --- draw state ---

    pub fn save(&mut self) {
        self.saved.push(self.state);
    }

    /// Pop the last saved state. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    /// Set the global alpha, clamped to `[0, 1]`. Non-finite input is ignored.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_global_alpha(&mut self, alpha: f64) {
        if alpha.is_finite() {
            self.state.alpha = alpha.clamp(0.0, 1.0) as f32;
        }
    }

    #[must_use]
    pub fn global_alpha(&self) -> f64 {
        f64::from(self.state.alpha)
    }

    pub fn set_composite(&mut self, op: CompositeOp) {
        self.state.op = op;
    }

    #[must_use]
    pub fn composite(&self) -> CompositeOp {
        self.state.op
    }

    // --- pixel access ---

    /// Premultiplied pixel at `(x, y)`, or `None` when out of range.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremultipliedColorU8> {
        self.pixmap.as_ref()?.pixel(x, y)
    }

    /// Straight-alpha color at `(x, y)`.
    #[must_use]
    pub fn color_at(&self, x: u32, y: u32) -> Option<Color> {
        self.pixel(x, y).map(Color::from_pixel)
    }

    #[must_use]
    pub fn pixels(&self) -> &[PremultipliedColorU8] {
        match &self.pixmap {
            Some(pixmap) => pixmap.pixels(),
            None => &[],
        }
    }

    /// Straight-alpha RGBA bytes in row-major order, ready for `ImageData`.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let pixels = self.pixels();
        let mut out = Vec::with_capacity(pixels.len() * 4);
        for px in pixels {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    // --- drawing ---

    /// Fill an axis-aligned rectangle given in pixel units, without
    /// anti-aliasing.
    #[allow(clippy::cast_possible_truncation)]
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) else {
            return;
        };
        let paint = self.paint(color, false);
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    /// Fill the whole surface with `color` under the current draw state.
    pub fn fill(&mut self, color: Color) {
        self.fill_rect(0.0, 0.0, f64::from(self.width), f64::from(self.height), color);
    }

    /// Fill `path`, mapped to pixels by `transform`, anti-aliased.
    pub fn fill_path(&mut self, path: &Path, transform: Transform, color: Color) {
        let paint = self.paint(color, true);
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill_path(path, &paint, FillRule::Winding, transform, None);
        }
    }

    /// Stroke `path` (already in pixel units) with a crisp line of `width`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn stroke_path(&mut self, path: &Path, width: f64, color: Color) {
        let paint = self.paint(color, false);
        let stroke = Stroke { width: width as f32, ..Stroke::default() };
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Composite `src` onto this surface, offset by `(dx, dy)` pixels, using
    /// the current global alpha and composite operation.
    pub fn draw_surface(&mut self, src: &Surface, dx: i32, dy: i32) {
        let paint = PixmapPaint {
            opacity: self.state.alpha,
            blend_mode: self.state.op.blend_mode(),
            quality: FilterQuality::Nearest,
        };
        if let (Some(dst), Some(src)) = (&mut self.pixmap, &src.pixmap) {
            dst.draw_pixmap(dx, dy, src.as_ref(), &paint, Transform::identity(), None);
        }
    }

    fn paint(&self, color: Color, anti_alias: bool) -> Paint<'static> {
        let mut paint = Paint { blend_mode: self.state.op.blend_mode(), anti_alias, ..Paint::default() };
        paint.set_color(color.to_skia(self.state.alpha));
        paint
    }

    // --- whole-surface effects ---

    /// Move the contents by `(dx, dy)` pixels; vacated pixels become transparent.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        let Some(pixmap) = &mut self.pixmap else {
            return;
        };
        let copy = pixmap.clone();
        pixmap.fill(tiny_skia::Color::TRANSPARENT);
        let paint = PixmapPaint { blend_mode: BlendMode::Source, quality: FilterQuality::Nearest, ..PixmapPaint::default() };
        pixmap.draw_pixmap(dx, dy, copy.as_ref(), &paint, Transform::identity(), None);
    }

    /// Replace every pixel's color with `color`, keeping coverage: the result
    /// alpha is `pixel alpha × color alpha`.
    pub fn tint(&mut self, color: Color) {
        let c = color.premultiplied();
        let Some(pixmap) = &mut self.pixmap else {
            return;
        };
        for px in pixmap.pixels_mut() {
            let coverage = f32::from(px.alpha()) / 255.0;
            *px = quantize(c.map(|v| v * coverage));
        }
    }

    /// Gaussian blur with standard deviation `radius / 2`, matching Canvas2D
    /// `shadowBlur`. Pixels beyond the edge are transparent.
    pub fn blur(&mut self, radius: f64) {
        let kernel = gaussian_kernel(radius);
        if kernel.len() <= 1 {
            return;
        }
        let (w, h) = self.size();
        self.map_channels(|src| {
            let tmp = convolve(src, w, h, &kernel, true);
            convolve(&tmp, w, h, &kernel, false)
        });
    }

    /// Grow coverage by `radius` pixels (square structuring element, channel max).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn dilate(&mut self, radius: f64) {
        if !radius.is_finite() || radius < 0.5 {
            return;
        }
        let r = radius.round() as i64;
        let (w, h) = self.size();
        self.map_channels(|src| {
            let tmp = max_filter(src, w, h, r, true);
            max_filter(&tmp, w, h, r, false)
        });
    }

    /// Apply `f` to every pixel's straight-alpha RGB; alpha is kept.
    pub fn map_colors<F>(&mut self, f: F)
    where
        F: Fn([f32; 3]) -> [f32; 3],
    {
        let Some(pixmap) = &mut self.pixmap else {
            return;
        };
        for px in pixmap.pixels_mut() {
            let [r, g, b, a] = channels(*px);
            if a <= 0.0 {
                continue;
            }
            let [r, g, b] = f([r / a, g / a, b / a]);
            *px = quantize([r.clamp(0.0, 1.0) * a, g.clamp(0.0, 1.0) * a, b.clamp(0.0, 1.0) * a, a]);
        }
    }

    /// Run a whole-image pass over float channels and store the result.
    fn map_channels<F>(&mut self, pass: F)
    where
        F: FnOnce(&[Channels]) -> Vec<Channels>,
    {
        let Some(pixmap) = &mut self.pixmap else {
            return;
        };
        let src: Vec<Channels> = pixmap.pixels().iter().copied().map(channels).collect();
        for (px, ch) in pixmap.pixels_mut().iter_mut().zip(pass(&src)) {
            *px = quantize(ch);
        }
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn convolve(src: &[Channels], width: u32, height: u32, kernel: &[f32], horizontal: bool) -> Vec<Channels> {
    let (w, h) = (i64::from(width), i64::from(height));
    let r = (kernel.len() / 2) as i64;
    let mut out = vec![CLEAR; src.len()];
    for y in 0..h {
        for x in 0..w {
            let mut acc = CLEAR;
            for (k, weight) in kernel.iter().enumerate() {
                let d = k as i64 - r;
                let (sx, sy) = if horizontal { (x + d, y) } else { (x, y + d) };
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                let px = src[(sy * w + sx) as usize];
                for (a, c) in acc.iter_mut().zip(px) {
                    *a += weight * c;
                }
            }
            out[(y * w + x) as usize] = acc;
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn max_filter(src: &[Channels], width: u32, height: u32, r: i64, horizontal: bool) -> Vec<Channels> {
    let (w, h) = (i64::from(width), i64::from(height));
    let mut out = vec![CLEAR; src.len()];
    for y in 0..h {
        for x in 0..w {
            let mut acc = CLEAR;
            for d in -r..=r {
                let (sx, sy) = if horizontal { (x + d, y) } else { (x, y + d) };
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                let px = src[(sy * w + sx) as usize];
                for (a, c) in acc.iter_mut().zip(px) {
                    *a = a.max(c);
                }
            }
            out[(y * w + x) as usize] = acc;
        }
    }
    out
}

/// Normalized 1D Gaussian weights for a blur of `radius` (sigma = radius / 2).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn gaussian_kernel(radius: f64) -> Vec<f32> {
    if !radius.is_finite() || radius <= 0.0 {
        return vec![1.0];
    }
    let sigma = radius / 2.0;
    let half = (sigma * 3.0).ceil() as usize;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (0..=2 * half)
        .map(|i| {
            let x = i as f64 - half as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / sum) as f32).collect()
}
