//! WASM bridge for tocmap: exposes the explorer to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host owns the canvas and
//! the animation frame loop; every method here is called from that loop or
//! from DOM event handlers on the same thread.

mod render2d;

use kurbo::Size;
use render2d::CanvasSurface;
use serde::Serialize;
use std::time::Duration;
use tocmap_core::{Document, ExplorerConfig, TextMeasure, Viewport};
use tocmap_explorer::{Cursor, Explorer, FrameStatus, InputEvent};
use tocmap_render::Theme;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

#[derive(Serialize)]
#[serde(untagged)]
enum Reply {
    Loaded { ok: bool, sections: usize, malformed: usize },
    Failed { ok: bool, error: String },
}

impl Reply {
    fn failed(error: impl ToString) -> String {
        Self::Failed {
            ok: false,
            error: error.to_string(),
        }
        .to_json()
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"{e}"}}"#))
    }
}

/// Canvas-facing controller holding one explorer session.
#[wasm_bindgen]
pub struct TocCanvas {
    config: ExplorerConfig,
    document: Option<Document>,
    explorer: Option<Explorer>,
    size: Size,
    pixel_ratio: f64,
    dark: bool,
}

#[wasm_bindgen]
impl TocCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        console_error_panic_hook_setup();
        Self {
            config: ExplorerConfig::default(),
            document: None,
            explorer: None,
            size: Size::new(width, height),
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
            dark: false,
        }
    }

    /// Load a document. `ctx` is used to measure text for line wrapping.
    ///
    /// Returns JSON `{"ok":true,"sections":n,"malformed":m}` or
    /// `{"ok":false,"error":"..."}`.
    pub fn load_json(&mut self, ctx: &CanvasRenderingContext2d, json: &str) -> String {
        let document = match Document::from_json(json) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("document rejected: {e}");
                return Reply::failed(e);
            }
        };
        let reply = Reply::Loaded {
            ok: true,
            sections: document.len(),
            malformed: document.malformed,
        };
        let measure = CanvasSurface::new(ctx, self.size, self.pixel_ratio);
        self.explorer = Some(self.build(&document, &measure));
        self.document = Some(document);
        reply.to_json()
    }

    /// Replace the configuration with a (possibly partial) JSON object and
    /// rebuild the loaded document under it, keeping the current view.
    pub fn set_config_json(&mut self, ctx: &CanvasRenderingContext2d, json: &str) -> String {
        let config = match ExplorerConfig::from_json(json) {
            Ok(config) => config,
            Err(e) => return Reply::failed(e),
        };
        self.config = config;
        if let Some(document) = self.document.as_ref() {
            let measure = CanvasSurface::new(ctx, self.size, self.pixel_ratio);
            let mut explorer = self.build(document, &measure);
            if let Some(old) = self.explorer.as_ref() {
                explorer.set_transform(old.transform());
            }
            self.explorer = Some(explorer);
        }
        r#"{"ok":true}"#.to_string()
    }

    /// Resize the drawing surface. The layout is not recomputed.
    pub fn resize(&mut self, width: f64, height: f64, pixel_ratio: f64) {
        self.size = Size::new(width, height);
        if pixel_ratio > 0.0 {
            self.pixel_ratio = pixel_ratio;
        }
    }

    pub fn set_theme(&mut self, name: &str) {
        self.dark = name == "dark";
        let theme = self.theme();
        if let Some(explorer) = self.explorer.as_mut() {
            explorer.options_mut().theme = theme;
        }
    }

    pub fn set_show_pointer(&mut self, show: bool) {
        if let Some(explorer) = self.explorer.as_mut() {
            explorer.options_mut().show_pointer = show;
        }
    }

    /// Repaint. Returns the render counters as JSON.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> String {
        let Some(explorer) = self.explorer.as_ref() else {
            return "{}".to_string();
        };
        let mut surface = CanvasSurface::new(ctx, self.size, self.pixel_ratio);
        let stats = explorer.render(&mut surface);
        serde_json::to_string(&stats).unwrap_or_default()
    }

    /// Advance the running transition. Returns `true` while another frame
    /// should be requested.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let now = timestamp(now_ms);
        self.explorer
            .as_mut()
            .is_some_and(|ex| ex.frame(now) == FrameStatus::Animating)
    }

    /// Returns `true` when a repaint is needed.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(InputEvent::pointer_move(x, y), 0.0)
    }

    /// Toggle the node under the pointer. Returns `true` when a node was hit.
    pub fn click(&mut self, x: f64, y: f64, alt: bool, now_ms: f64) -> bool {
        self.dispatch(InputEvent::click(x, y, alt), now_ms)
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.dispatch(InputEvent::wheel(x, y, delta_y), 0.0)
    }

    pub fn drag(&mut self, dx: f64, dy: f64) -> bool {
        self.dispatch(InputEvent::drag(dx, dy), 0.0)
    }

    pub fn expand_all(&mut self, alt: bool, now_ms: f64) -> bool {
        self.dispatch(InputEvent::ExpandAll { alt }, now_ms)
    }

    pub fn collapse_all(&mut self, alt: bool, now_ms: f64) -> bool {
        self.dispatch(InputEvent::CollapseAll { alt }, now_ms)
    }

    /// Name of the hovered section, or empty string if none.
    pub fn hovered_name(&self) -> String {
        self.explorer
            .as_ref()
            .and_then(|ex| ex.hovered_node())
            .map(|node| node.name.clone())
            .unwrap_or_default()
    }

    /// CSS cursor for the current hover state.
    pub fn cursor(&self) -> String {
        match self.explorer.as_ref().map(|ex| ex.cursor()) {
            Some(Cursor::Pointer) => "pointer",
            _ => "default",
        }
        .to_string()
    }
}

// ─── Private helpers ─────────────────────────────────────────────────────

impl TocCanvas {
    fn build(&self, document: &Document, measure: &dyn TextMeasure) -> Explorer {
        let viewport = Viewport {
            width: self.size.width,
            height: self.size.height,
        };
        let mut explorer = Explorer::new(document, self.config.clone(), viewport, measure);
        explorer.options_mut().theme = self.theme();
        explorer
    }

    fn theme(&self) -> Theme {
        if self.dark { Theme::dark() } else { Theme::light() }
    }

    fn dispatch(&mut self, event: InputEvent, now_ms: f64) -> bool {
        let now = timestamp(now_ms);
        self.explorer.as_mut().is_some_and(|ex| ex.handle(event, now))
    }
}

/// Host frame clock (milliseconds, e.g. `performance.now()`) as a duration.
fn timestamp(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_default()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("tocmap WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Validate a document without building an explorer. Returns the same JSON
/// shape as [`TocCanvas::load_json`].
#[wasm_bindgen]
pub fn validate(json: &str) -> String {
    match Document::from_json(json) {
        Ok(doc) => Reply::Loaded {
            ok: true,
            sections: doc.len(),
            malformed: doc.malformed,
        }
        .to_json(),
        Err(e) => Reply::failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validate_reports_counts() {
        let reply = validate(r#"{"name": "Root", "children": [{"name": "A"}, 7]}"#);
        assert_eq!(reply, r#"{"ok":true,"sections":3,"malformed":1}"#);
    }

    #[test]
    fn validate_rejects_non_objects() {
        let reply: serde_json::Value = serde_json::from_str(&validate("[1, 2]")).unwrap();
        assert_eq!(reply["ok"], false);
        assert_eq!(reply["error"], "document root must be a section object");
    }

    #[test]
    fn timestamps_tolerate_bad_clocks() {
        assert_eq!(timestamp(1500.0), Duration::from_millis(1500));
        assert_eq!(timestamp(-3.0), Duration::ZERO);
        assert_eq!(timestamp(f64::NAN), Duration::ZERO);
    }
}
