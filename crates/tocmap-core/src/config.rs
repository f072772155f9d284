//! Explorer configuration.
//!
//! Every section deserializes with defaults, so hosts can pass partial JSON
//! (`{"view": {"initial_scale": 0.5}}`) and leave the rest alone.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("view scale extent must satisfy 0 < k_min <= k_max, got [{min}, {max}]")]
    ScaleExtent { min: f64, max: f64 },
    #[error("{field} must be a finite number {bound}, got {value}")]
    OutOfRange {
        field: &'static str,
        bound: &'static str,
        value: f64,
    },
}

// ─── Font ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub family: String,
    /// Size in data-space units (equal to CSS px at `k = 1`).
    pub size: f64,
    /// Below this on-screen size text is drawn as skeleton bars.
    pub min_legible: f64,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "'Roboto Slab', serif".into(),
            size: 12.0,
            min_legible: 8.0,
        }
    }
}

impl FontSpec {
    /// CSS font shorthand, e.g. `12px 'Roboto Slab', serif`.
    pub fn css(&self) -> String {
        format!("{}px {}", self.size, self.family)
    }
}

// ─── Easing ──────────────────────────────────────────────────────────────

/// Easing curve applied to normalized transition progress.
///
/// Every curve is monotonic with `f(0) = 0` and `f(1) = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadIn,
    #[default]
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
}

impl Easing {
    /// Map `t` in [0, 1] to eased progress. Input outside the range is clamped.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
        }
    }
}

// ─── Sections ────────────────────────────────────────────────────────────

/// Box metrics used to size nodes for the tree layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    /// Width budget for wrapped content; also the constant node width.
    pub line_width: f64,
    /// Height of a closed node (title row only).
    pub closed_height: f64,
    /// Vertical advance per content line of an open node.
    pub line_height: f64,
    /// Extra depth-axis spacing added after each node's width.
    pub level_gap: f64,
    /// Breadth-axis spacing between sibling boxes.
    pub sibling_gap: f64,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            line_width: 200.0,
            closed_height: 22.0,
            line_height: 22.0,
            level_gap: 100.0,
            sibling_gap: 0.0,
        }
    }
}

/// Pan/zoom limits and level-of-detail thresholds. Pixel values are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub k_min: f64,
    pub k_max: f64,
    pub initial_scale: f64,
    /// Hover/click pick radius on screen.
    pub hit_radius_px: f64,
    /// Margin added around the surface when computing the visible rectangle.
    pub cull_padding_px: f64,
    /// Nodes shorter than this on screen get no text.
    pub min_node_px: f64,
    /// Wheel zoom: `k *= 2 ^ (-delta_y * wheel_sensitivity)`.
    pub wheel_sensitivity: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            k_min: 0.001,
            k_max: 10.0,
            initial_scale: 0.1,
            hit_radius_px: 5.0,
            cull_padding_px: 20.0,
            min_node_px: 2.0,
            wheel_sensitivity: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub duration_ms: u32,
    /// Used instead of `duration_ms` when the gesture carries the alt modifier.
    pub slow_duration_ms: u32,
    pub easing: Easing,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 250,
            slow_duration_ms: 2500,
            easing: Easing::QuadOut,
        }
    }
}

/// Top-level explorer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub node: NodeMetrics,
    pub font: FontSpec,
    pub view: ViewConfig,
    pub transition: TransitionConfig,
    /// Branches shallower than this start open (root = depth 0).
    pub initial_open_depth: u32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            node: NodeMetrics::default(),
            font: FontSpec::default(),
            view: ViewConfig::default(),
            transition: TransitionConfig::default(),
            initial_open_depth: 1,
        }
    }
}

impl ExplorerConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the numeric ranges every consumer relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let view = &self.view;
        let extent_ok = view.k_min.is_finite() && view.k_max.is_finite() && view.k_min > 0.0 && view.k_min <= view.k_max;
        if !extent_ok {
            return Err(ConfigError::ScaleExtent {
                min: view.k_min,
                max: view.k_max,
            });
        }

        let positive = [
            ("view.initial_scale", view.initial_scale),
            ("node.line_width", self.node.line_width),
            ("node.closed_height", self.node.closed_height),
            ("node.line_height", self.node.line_height),
            ("font.size", self.font.size),
        ];
        let non_negative = [
            ("view.hit_radius_px", view.hit_radius_px),
            ("view.cull_padding_px", view.cull_padding_px),
            ("view.min_node_px", view.min_node_px),
            ("node.level_gap", self.node.level_gap),
            ("node.sibling_gap", self.node.sibling_gap),
            ("font.min_legible", self.font.min_legible),
        ];
        let out_of_range = |field, bound, value| ConfigError::OutOfRange { field, bound, value };
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(out_of_range(field, "> 0", value));
            }
        }
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(out_of_range(field, ">= 0", value));
            }
        }
        if !view.wheel_sensitivity.is_finite() {
            return Err(out_of_range("view.wheel_sensitivity", "of either sign", view.wheel_sensitivity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
    ];

    #[test]
    fn easing_endpoints() {
        for e in ALL {
            assert!(e.apply(0.0).abs() < 1e-12, "{e:?}(0) != 0");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}(1) != 1");
        }
    }

    #[test]
    fn easing_is_monotonic() {
        for e in ALL {
            let mut prev = e.apply(0.0);
            for i in 1..=200 {
                let v = e.apply(i as f64 / 200.0);
                assert!(v >= prev - 1e-12, "{e:?} decreased at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn easing_clamps_input() {
        assert_eq!(Easing::QuadOut.apply(-3.0), 0.0);
        assert_eq!(Easing::CubicIn.apply(7.0), 1.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ExplorerConfig::from_json(
            r#"{"view": {"initial_scale": 0.5}, "transition": {"easing": "cubic_in_out"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.view.initial_scale, 0.5);
        assert_eq!(cfg.view.k_max, 10.0);
        assert_eq!(cfg.transition.easing, Easing::CubicInOut);
        assert_eq!(cfg.transition.duration_ms, 250);
        assert_eq!(cfg.node, NodeMetrics::default());
    }

    #[test]
    fn inverted_scale_extent_is_rejected() {
        let err = ExplorerConfig::from_json(r#"{"view": {"k_min": 5.0, "k_max": 1.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ScaleExtent { min, max } if min == 5.0 && max == 1.0));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let err = ExplorerConfig::from_json(r#"{"view": {"k_min": 0.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ScaleExtent { .. }));

        let err = ExplorerConfig::from_json(r#"{"view": {"initial_scale": 0.0}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "view.initial_scale",
                ..
            }
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut cfg = ExplorerConfig::default();
        cfg.view.k_max = f64::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::ScaleExtent { .. })));

        let mut cfg = ExplorerConfig::default();
        cfg.view.k_max = f64::INFINITY;
        assert!(matches!(cfg.validate(), Err(ConfigError::ScaleExtent { .. })));

        let mut cfg = ExplorerConfig::default();
        cfg.node.level_gap = -1.0;
        assert_eq!(
            cfg.validate().unwrap_err().to_string(),
            "node.level_gap must be a finite number >= 0, got -1"
        );
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = ExplorerConfig::from_json("{view:").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(ExplorerConfig::default().validate().is_ok());
    }

    #[test]
    fn font_css_shorthand() {
        let font = FontSpec {
            family: "serif".into(),
            size: 14.0,
            ..FontSpec::default()
        };
        assert_eq!(font.css(), "14px serif");
    }
}
