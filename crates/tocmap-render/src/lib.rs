pub mod hit;
pub mod paint;
pub mod recording;
pub mod theme;

pub use hit::{Entry, SpatialIndex};
pub use paint::{
    Frame, MARKER_RADIUS, RenderOptions, RenderStats, Surface, TextStyle, label_box, render,
    visible_rect,
};
pub use recording::{DrawCmd, RecordingSurface};
pub use theme::{Color, Theme};
