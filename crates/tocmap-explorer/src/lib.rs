pub mod animation;
pub mod controller;
pub mod input;
pub mod session;

pub use animation::{TickOutcome, Track, Transition, Tween};
pub use controller::Controller;
pub use input::InputEvent;
pub use session::{Cursor, Explorer, FrameStatus, InteractionContext};
pub use tocmap_core::Easing;
