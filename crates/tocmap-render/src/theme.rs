//! Colors and the renderer's palette.

use serde::{Deserialize, Serialize};

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(v: f32) -> Self {
        Self::rgba(v, v, v, 1.0)
    }

    pub const BLACK: Color = Color::gray(0.0);
    pub const WHITE: Color = Color::gray(1.0);

    /// Parse `#RGB` or `#RRGGBB`, with an optional alpha digit pair (`#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.strip_prefix('#').unwrap_or(hex).as_bytes();
        let pair = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };
        match bytes.len() {
            3 => {
                let digit = |i: usize| -> Option<f32> { Some((hex_val(bytes[i])? * 17) as f32 / 255.0) };
                Some(Self::rgba(digit(0)?, digit(1)?, digit(2)?, 1.0))
            }
            6 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, 1.0)),
            8 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// CSS color string accepted by canvas `fillStyle`/`strokeStyle`.
    pub fn to_css(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.a >= 1.0 {
            format!("rgb({}, {}, {})", channel(self.r), channel(self.g), channel(self.b))
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                channel(self.r),
                channel(self.g),
                channel(self.b),
                self.a.clamp(0.0, 1.0)
            )
        }
    }
}

/// Palette used by [`crate::render`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: Color,
    pub link: Color,
    pub link_width: f64,
    /// Marker fill for nodes with children.
    pub branch_marker: Color,
    pub leaf_marker: Color,
    /// Ring stroked around every marker.
    pub marker_ring: Color,
    pub hover_marker: Color,
    pub text: Color,
    /// Outline stroked under glyphs so text stays legible over links.
    pub halo: Color,
    pub halo_width: f64,
    pub placeholder: Color,
    pub pointer: Color,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: Color::WHITE,
            link: Color::rgba(0.0, 0.0, 0.0, 0.5),
            link_width: 0.5,
            branch_marker: Color::gray(0.2),
            leaf_marker: Color::gray(0.6),
            marker_ring: Color::WHITE,
            hover_marker: Color::rgba(1.0, 0.0, 0.0, 1.0),
            text: Color::BLACK,
            halo: Color::WHITE,
            halo_width: 3.0,
            placeholder: Color::gray(0.8),
            pointer: Color::rgba(1.0, 0.0, 0.0, 1.0),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::rgba(0.11, 0.11, 0.12, 1.0),
            link: Color::rgba(1.0, 1.0, 1.0, 0.35),
            link_width: 0.5,
            branch_marker: Color::gray(0.9),
            leaf_marker: Color::gray(0.55),
            marker_ring: Color::rgba(0.11, 0.11, 0.12, 1.0),
            hover_marker: Color::rgba(1.0, 0.27, 0.23, 1.0),
            text: Color::gray(0.95),
            halo: Color::rgba(0.11, 0.11, 0.12, 1.0),
            halo_width: 3.0,
            placeholder: Color::gray(0.35),
            pointer: Color::rgba(1.0, 0.27, 0.23, 1.0),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
