//! In-memory [`Surface`] that records draw calls instead of rasterizing.
//!
//! Lets native code and tests inspect exactly what a repaint would draw.

use crate::paint::{Surface, TextStyle};
use crate::theme::Color;
use kurbo::{Affine, BezPath, Point, Rect, Size};
use tocmap_core::{ApproxMeasure, FontSpec, TextMeasure};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Color),
    SetTransform(Affine),
    StrokePath { path: BezPath, color: Color, width: f64 },
    FillCircles { centers: Vec<Point>, radius: f64, color: Color },
    StrokeCircles { centers: Vec<Point>, radius: f64, color: Color, width: f64 },
    FillRects { rects: Vec<Rect>, color: Color },
    Text { text: String, anchor: Point },
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size,
    pixel_ratio: f64,
    measure: ApproxMeasure,
    pub commands: Vec<DrawCmd>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            pixel_ratio: 1.0,
            measure: ApproxMeasure::default(),
            commands: Vec::new(),
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = Size::new(width, height);
    }

    /// Drop recorded commands, keeping size and ratio.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Every text run drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every placeholder bar drawn, in order.
    pub fn bars(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::FillRects { rects, .. } => Some(rects.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Every transform set, in order.
    pub fn transforms(&self) -> Vec<Affine> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::SetTransform(a) => Some(*a),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasure for RecordingSurface {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        self.measure.measure(text, font)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCmd::Clear(color));
    }

    fn set_transform(&mut self, affine: Affine) {
        self.commands.push(DrawCmd::SetTransform(affine));
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        self.commands.push(DrawCmd::StrokePath {
            path: path.clone(),
            color,
            width,
        });
    }

    fn fill_circles(&mut self, centers: &[Point], radius: f64, color: Color) {
        if centers.is_empty() {
            return;
        }
        self.commands.push(DrawCmd::FillCircles {
            centers: centers.to_vec(),
            radius,
            color,
        });
    }

    fn stroke_circles(&mut self, centers: &[Point], radius: f64, color: Color, width: f64) {
        if centers.is_empty() {
            return;
        }
        self.commands.push(DrawCmd::StrokeCircles {
            centers: centers.to_vec(),
            radius,
            color,
            width,
        });
    }

    fn fill_rects(&mut self, rects: &[Rect], color: Color) {
        self.commands.push(DrawCmd::FillRects {
            rects: rects.to_vec(),
            color,
        });
    }

    fn draw_text(&mut self, text: &str, anchor: Point, _style: &TextStyle<'_>) {
        self.commands.push(DrawCmd::Text {
            text: text.to_string(),
            anchor,
        });
    }
}
