//! Canvas 2D backed draw surface (browser only)

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Color, CubicCurve, DrawSurface, StrokeStyle, TextAlign, TextStyle};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to the element's CSS size
    pub fn fit_to_client(&self) {
        let w = self.canvas.client_width().max(0) as u32;
        let h = self.canvas.client_height().max(0) as u32;
        if self.canvas.width() != w {
            self.canvas.set_width(w);
        }
        if self.canvas.height() != h {
            self.canvas.set_height(h);
        }
    }

    fn set_dash(&self, dash: Option<(f32, f32)>) {
        let segments = js_sys::Array::new();
        if let Some((on, off)) = dash {
            segments.push(&JsValue::from_f64(f64::from(on)));
            segments.push(&JsValue::from_f64(f64::from(off)));
        }
        if let Err(e) = self.ctx.set_line_dash(&segments) {
            log::warn!("set_line_dash failed: {:?}", e);
        }
    }
}

impl DrawSurface for CanvasSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(size.x), f64::from(size.y));
    }

    fn stroke_cubic(&mut self, curve: &CubicCurve, style: &StrokeStyle) {
        self.ctx.set_stroke_style_str(&style.color.to_css());
        self.ctx.set_line_width(f64::from(style.width));
        self.set_dash(style.dash);
        self.ctx.begin_path();
        self.ctx
            .move_to(f64::from(curve.start.x), f64::from(curve.start.y));
        self.ctx.bezier_curve_to(
            f64::from(curve.c1.x),
            f64::from(curve.c1.y),
            f64::from(curve.c2.x),
            f64::from(curve.c2.y),
            f64::from(curve.end.x),
            f64::from(curve.end.y),
        );
        self.ctx.stroke();
        self.set_dash(None);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        if self
            .ctx
            .arc(
                f64::from(center.x),
                f64::from(center.y),
                f64::from(radius),
                0.0,
                std::f64::consts::TAU,
            )
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(
            f64::from(min.x),
            f64::from(min.y),
            f64::from(size.x),
            f64::from(size.y),
        );
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        self.ctx.move_to(f64::from(first.x), f64::from(first.y));
        for p in rest {
            self.ctx.line_to(f64::from(p.x), f64::from(p.y));
        }
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, style: &TextStyle) {
        self.ctx.set_fill_style_str(&style.color.to_css());
        self.ctx.set_font(&style.css_font());
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.ctx.set_text_baseline("middle");
        let _ = self
            .ctx
            .fill_text(text, f64::from(pos.x), f64::from(pos.y));
    }
}
