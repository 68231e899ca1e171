//! Rendering module
//!
//! Everything draws through [`DrawSurface`], a small immediate-mode 2D
//! surface. The browser backs it with a canvas 2D context; tests and the
//! native demo record commands instead.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod lines;
pub mod recording;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use lines::{LineRenderer, LineStyle, RedrawTrigger, render_connections};
pub use recording::{DrawCommand, RecordingSurface};
pub use scene::draw_field;

use glam::Vec2;

/// Linear RGBA color, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0])
    }

    pub const fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, alpha])
    }

    /// CSS `rgba()` string for canvas fill/stroke styles
    pub fn to_css(self) -> String {
        let [r, g, b, a] = self.0;
        format!(
            "rgba({},{},{},{})",
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
            a.clamp(0.0, 1.0)
        )
    }
}

/// Palette
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(0x1a, 0x1a, 0x2e);
    pub const CORRECT: Color = Color::rgb(0x28, 0xa7, 0x45);
    pub const WRONG: Color = Color::rgb(0xdc, 0x35, 0x45);
    /// Dashed preview line
    pub const LIVE: Color = Color::rgb(0x76, 0x4b, 0xa2);
    pub const TARGET: Color = Color::rgb(0x4e, 0xcd, 0xc4);
    pub const TARGET_TEXT: Color = Color::rgb(0x1a, 0x1a, 0x2e);
    pub const PROJECTILE: Color = Color::rgb(0xff, 0xe6, 0x6d);
    pub const TURRET: Color = Color::rgb(0xff, 0x6b, 0x6b);
    pub const HUD_TEXT: Color = Color::rgb(0xff, 0xff, 0xff);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
    /// Dash and gap length; `None` for a solid line
    pub dash: Option<(f32, f32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f32,
    pub bold: bool,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn css_font(&self) -> String {
        format!(
            "{}{}px sans-serif",
            if self.bold { "bold " } else { "" },
            self.size
        )
    }
}

/// Cubic Bézier curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCurve {
    pub start: Vec2,
    pub c1: Vec2,
    pub c2: Vec2,
    pub end: Vec2,
}

impl CubicCurve {
    /// Horizontal S-curve: control points sit at one and two thirds of the
    /// horizontal span, level with the start and end respectively
    pub fn s_curve(start: Vec2, end: Vec2) -> Self {
        let span = end.x - start.x;
        Self {
            start,
            c1: Vec2::new(start.x + span / 3.0, start.y),
            c2: Vec2::new(start.x + span * 2.0 / 3.0, end.y),
            end,
        }
    }
}

/// Immediate-mode 2D drawing target
pub trait DrawSurface {
    /// Drawable size in surface pixels
    fn size(&self) -> Vec2;

    /// Erase everything drawn so far
    fn clear(&mut self);

    fn stroke_cubic(&mut self, curve: &CubicCurve, style: &StrokeStyle);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);

    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    fn fill_text(&mut self, text: &str, pos: Vec2, style: &TextStyle);
}
