pub mod config;
pub mod document;
pub mod id;
pub mod layout;
pub mod model;
pub mod text;
pub mod view;

pub use config::{ConfigError, Easing, ExplorerConfig, FontSpec, NodeMetrics, TransitionConfig, ViewConfig};
pub use document::{Document, LoadError, Section};
pub use id::NodeId;
pub use layout::{GeometryLayout, LayoutAdapter, TidyLayout, Viewport};
pub use model::*;
pub use text::{ApproxMeasure, TextMeasure, wrap_text};
pub use view::{ScaleExtent, ViewTransform};

// Re-export petgraph and kurbo types so downstream crates don't need a direct dependency
pub use kurbo;
pub use petgraph::graph::NodeIndex;
