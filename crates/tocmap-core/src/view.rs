//! Pan/zoom view transform.
//!
//! `screen = data * k + (tx, ty)`. The device pixel ratio is not part of the
//! transform; the renderer applies it once when setting up the surface.

use crate::config::ViewConfig;
use kurbo::{Affine, Point, Vec2};

/// Allowed range for the zoom factor `k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleExtent {
    pub min: f64,
    pub max: f64,
}

impl ScaleExtent {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Total for any bounds: never panics, and a NaN `k` maps to `min`.
    pub fn clamp(&self, k: f64) -> f64 {
        k.max(self.min).min(self.max)
    }
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self::from(&ViewConfig::default())
    }
}

impl From<&ViewConfig> for ScaleExtent {
    fn from(view: &ViewConfig) -> Self {
        Self::new(view.k_min, view.k_max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub tx: f64,
    pub ty: f64,
    pub k: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    pub fn new(tx: f64, ty: f64, k: f64) -> Self {
        Self { tx, ty, k }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.tx, self.ty)
    }

    /// Data space → screen space.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.tx, p.y * self.k + self.ty)
    }

    /// Screen space → data space.
    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.tx) / self.k, (p.y - self.ty) / self.k)
    }

    /// Translate then scale, as an affine for the drawing surface.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translation()) * Affine::scale(self.k)
    }

    /// Copy with `k` forced into `extent`. Translation is left alone.
    pub fn clamp(self, extent: ScaleExtent) -> Self {
        Self {
            k: extent.clamp(self.k),
            ..self
        }
    }

    /// Shift by a screen-space delta.
    pub fn pan(self, delta: Vec2) -> Self {
        Self {
            tx: self.tx + delta.x,
            ty: self.ty + delta.y,
            k: self.k,
        }
    }

    /// Multiply `k` by `factor`, keeping the data point under `anchor` fixed.
    pub fn zoom_about(self, anchor: Point, factor: f64, extent: ScaleExtent) -> Self {
        self.scale_about(anchor, self.k * factor, extent)
    }

    /// Set `k` (clamped), keeping the data point under `anchor` fixed.
    pub fn scale_about(self, anchor: Point, k: f64, extent: ScaleExtent) -> Self {
        let data = self.invert(anchor);
        let k = extent.clamp(k);
        Self {
            tx: anchor.x - data.x * k,
            ty: anchor.y - data.y * k,
            k,
        }
    }
}
