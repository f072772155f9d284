//! Canvas2D surface.
//!
//! Implements [`Surface`] over a `CanvasRenderingContext2d`. The canvas
//! backing store is expected to be `size * pixel_ratio` device pixels.

use kurbo::{Affine, BezPath, PathEl, Point, Rect, Size};
use std::f64::consts::TAU;
use tocmap_core::{FontSpec, TextMeasure};
use tocmap_render::{Color, Surface, TextStyle};
use web_sys::CanvasRenderingContext2d;

pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    size: Size,
    pixel_ratio: f64,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d, size: Size, pixel_ratio: f64) -> Self {
        Self {
            ctx,
            size,
            pixel_ratio,
        }
    }

    fn trace_path(&self, path: &BezPath) {
        self.ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => self.ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => self.ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathEl::ClosePath => self.ctx.close_path(),
            }
        }
    }

    fn trace_circles(&self, centers: &[Point], radius: f64) {
        self.ctx.begin_path();
        for c in centers {
            self.ctx.move_to(c.x + radius, c.y);
            let _ = self.ctx.arc(c.x, c.y, radius, 0.0, TAU);
        }
    }
}

impl TextMeasure for CanvasSurface<'_> {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        self.ctx.set_font(&font.css());
        self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
    }
}

impl Surface for CanvasSurface<'_> {
    fn size(&self) -> Size {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn clear(&mut self, color: Color) {
        self.ctx.save();
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(
            0.0,
            0.0,
            self.size.width * self.pixel_ratio,
            self.size.height * self.pixel_ratio,
        );
        self.ctx.restore();
    }

    fn set_transform(&mut self, affine: Affine) {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        let _ = self.ctx.set_transform(a, b, c, d, e, f);
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        self.trace_path(path);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }

    fn fill_circles(&mut self, centers: &[Point], radius: f64, color: Color) {
        if centers.is_empty() {
            return;
        }
        self.trace_circles(centers, radius);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn stroke_circles(&mut self, centers: &[Point], radius: f64, color: Color, width: f64) {
        if centers.is_empty() {
            return;
        }
        self.trace_circles(centers, radius);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }

    fn fill_rects(&mut self, rects: &[Rect], color: Color) {
        self.ctx.begin_path();
        for r in rects {
            self.ctx.rect(r.x0, r.y0, r.width(), r.height());
        }
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn draw_text(&mut self, text: &str, anchor: Point, style: &TextStyle<'_>) {
        self.ctx.set_font(&style.font.css());
        self.ctx.set_text_align("left");
        self.ctx.set_text_baseline("middle");
        if style.halo_width > 0.0 {
            self.ctx.set_line_join("round");
            self.ctx.set_line_width(style.halo_width);
            self.ctx.set_stroke_style_str(&style.halo.to_css());
            let _ = self.ctx.stroke_text(text, anchor.x, anchor.y);
        }
        self.ctx.set_fill_style_str(&style.fill.to_css());
        let _ = self.ctx.fill_text(text, anchor.x, anchor.y);
    }
}
