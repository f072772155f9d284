//! Input abstraction layer.
//!
//! Normalizes pointer, wheel and drag gestures into a unified `InputEvent`
//! consumed by [`crate::Explorer::handle`]. Coordinates are CSS pixels
//! relative to the surface's top-left corner.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved (mouse move, touch move).
    PointerMove { x: f64, y: f64 },

    /// Discrete toggle request (click, tap).
    Click {
        x: f64,
        y: f64,
        /// Alt/Option held: play the transition in slow motion.
        alt: bool,
    },

    /// Wheel or pinch zoom anchored at the pointer. Positive `delta_y` zooms out.
    Wheel { x: f64, y: f64, delta_y: f64 },

    /// Pan by a screen-space delta.
    Drag { dx: f64, dy: f64 },

    ExpandAll { alt: bool },

    CollapseAll { alt: bool },
}

impl InputEvent {
    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn click(x: f64, y: f64, alt: bool) -> Self {
        Self::Click { x, y, alt }
    }

    pub fn wheel(x: f64, y: f64, delta_y: f64) -> Self {
        Self::Wheel { x, y, delta_y }
    }

    pub fn drag(dx: f64, dy: f64) -> Self {
        Self::Drag { dx, dy }
    }
}

