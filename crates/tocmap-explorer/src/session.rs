//! The explorer session: one document, its view, and the frame loop.
//!
//! All mutation happens through `&mut Explorer` on the host's UI thread.
//! Pointer and gesture input write the [`InteractionContext`]; each
//! [`Explorer::frame`] advances the running transition; [`Explorer::render`]
//! reads a consistent snapshot of both.

use crate::animation::{TickOutcome, Track, Transition, Tween};
use crate::controller::Controller;
use crate::input::InputEvent;
use kurbo::{Point, Vec2};
use std::collections::HashMap;
use std::time::Duration;
use tocmap_core::{
    DocNode, Document, ExplorerConfig, GeometryLayout, LayoutAdapter, NodeIndex, ScaleExtent,
    TextMeasure, TidyLayout, TreeStore, ViewTransform, Viewport,
};
use tocmap_render::{Frame, RenderOptions, RenderStats, SpatialIndex, Surface, render};

/// Pan/zoom and hover state. Written by input handlers, read once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionContext {
    pub transform: ViewTransform,
    /// Last pointer position, in data space.
    pub pointer: Option<Point>,
    pub hovered: Option<NodeIndex>,
}

/// What [`Explorer::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// No transition is running; nothing changed.
    Idle,
    /// Positions moved; request another frame.
    Animating,
    /// The transition finished this frame and the index was rebuilt.
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
}

pub struct Explorer<L = TidyLayout> {
    config: ExplorerConfig,
    tree: TreeStore,
    controller: Controller<L>,
    index: SpatialIndex,
    tween: Option<Tween>,
    ctx: InteractionContext,
    extent: ScaleExtent,
    options: RenderOptions,
}

impl Explorer<TidyLayout> {
    pub fn new(doc: &Document, config: ExplorerConfig, viewport: Viewport, measure: &dyn TextMeasure) -> Self {
        let config = checked(config);
        let layout = TidyLayout::from_metrics(&config.node);
        Self::with_layout(doc, config, viewport, measure, layout)
    }
}

impl<L: GeometryLayout> Explorer<L> {
    /// Load `doc`, lay it out, index it, and zoom to the initial scale
    /// around the viewport centre.
    ///
    /// A config that fails [`ExplorerConfig::validate`] is replaced by the
    /// defaults.
    pub fn with_layout(
        doc: &Document,
        config: ExplorerConfig,
        viewport: Viewport,
        measure: &dyn TextMeasure,
        layout: L,
    ) -> Self {
        let config = checked(config);
        let mut tree = TreeStore::from_document(doc, &config, measure);
        let controller = Controller::new(LayoutAdapter::new(layout, viewport));
        controller.adapter().compute_layout(&mut tree);
        controller.adapter().seed_detached(&mut tree);
        let index = SpatialIndex::from_tree(&tree);

        let extent = ScaleExtent::from(&config.view);
        let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        let transform = ViewTransform::identity().scale_about(center, config.view.initial_scale, extent);

        Self {
            config,
            tree,
            controller,
            index,
            tween: None,
            ctx: InteractionContext {
                transform,
                pointer: None,
                hovered: None,
            },
            extent,
            options: RenderOptions::default(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn tree(&self) -> &TreeStore {
        &self.tree
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn context(&self) -> &InteractionContext {
        &self.ctx
    }

    pub fn transform(&self) -> ViewTransform {
        self.ctx.transform
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RenderOptions {
        &mut self.options
    }

    pub fn hovered(&self) -> Option<NodeIndex> {
        self.ctx.hovered
    }

    pub fn hovered_node(&self) -> Option<&DocNode> {
        self.ctx.hovered.map(|idx| self.tree.node(idx))
    }

    pub fn cursor(&self) -> Cursor {
        if self.ctx.hovered.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        }
    }

    pub fn is_animating(&self) -> bool {
        self.tween.as_ref().is_some_and(|t| t.transition.is_running())
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Dispatch one input event. Returns `true` when a repaint is needed.
    pub fn handle(&mut self, event: InputEvent, now: Duration) -> bool {
        match event {
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(x, y)),
            InputEvent::Click { x, y, alt } => self.click(Point::new(x, y), alt, now).is_some(),
            InputEvent::Wheel { x, y, delta_y } => {
                self.wheel(Point::new(x, y), delta_y);
                true
            }
            InputEvent::Drag { dx, dy } => {
                self.drag(Vec2::new(dx, dy));
                true
            }
            InputEvent::ExpandAll { alt } => {
                self.expand_all(alt, now);
                true
            }
            InputEvent::CollapseAll { alt } => {
                self.collapse_all(alt, now);
                true
            }
        }
    }

    /// Track the pointer and update the hovered node. Returns `true` when a
    /// repaint is needed.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let data = self.ctx.transform.invert(screen);
        self.ctx.pointer = Some(data);
        let hovered = self.hit(data);
        let changed = hovered != self.ctx.hovered;
        self.ctx.hovered = hovered;
        changed || self.options.show_pointer
    }

    /// Toggle the node under `screen`, if any. Returns the node hit.
    pub fn click(&mut self, screen: Point, alt: bool, now: Duration) -> Option<NodeIndex> {
        let node = self.hit(self.ctx.transform.invert(screen))?;
        if let Some(tracks) = self.controller.toggle(&mut self.tree, node) {
            self.begin(tracks, alt, now);
        }
        Some(node)
    }

    pub fn expand_all(&mut self, alt: bool, now: Duration) {
        let tracks = self.controller.expand_all(&mut self.tree);
        self.begin(tracks, alt, now);
    }

    pub fn collapse_all(&mut self, alt: bool, now: Duration) {
        let tracks = self.controller.collapse_all(&mut self.tree);
        self.begin(tracks, alt, now);
    }

    /// Replace the view transform; `k` is clamped to the configured extent.
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.ctx.transform = transform.clamp(self.extent);
    }

    /// Zoom about the screen point `anchor`.
    pub fn wheel(&mut self, anchor: Point, delta_y: f64) {
        let factor = 2f64.powf(-delta_y * self.config.view.wheel_sensitivity);
        self.ctx.transform = self.ctx.transform.zoom_about(anchor, factor, self.extent);
    }

    pub fn drag(&mut self, delta: Vec2) {
        self.ctx.transform = self.ctx.transform.pan(delta);
    }

    // ─── Frame loop ──────────────────────────────────────────────────────

    /// Advance the running transition to `now`.
    pub fn frame(&mut self, now: Duration) -> FrameStatus {
        let Some(tween) = self.tween.as_mut() else {
            return FrameStatus::Idle;
        };
        match tween.tick(now, &mut self.tree) {
            TickOutcome::Running => FrameStatus::Animating,
            TickOutcome::Completed => {
                log::debug!("transition complete");
                self.tween = None;
                self.settle();
                FrameStatus::Settled
            }
            TickOutcome::Idle => {
                self.tween = None;
                FrameStatus::Idle
            }
        }
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> RenderStats {
        let exiting: Vec<NodeIndex> = self
            .tween
            .as_ref()
            .map(|tween| tween.exiting().collect())
            .unwrap_or_default();
        render(
            surface,
            &Frame {
                tree: &self.tree,
                exiting: &exiting,
                transform: self.ctx.transform,
                pointer: self.ctx.pointer,
                hovered: self.ctx.hovered,
                config: &self.config,
                options: &self.options,
            },
        )
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Nearest attached node within the hit radius of a data-space point.
    fn hit(&self, data: Point) -> Option<NodeIndex> {
        let radius = self.config.view.hit_radius_px / self.ctx.transform.k;
        self.index
            .find_nearest(data, radius)
            .map(|entry| entry.node)
            // The index lags behind a running collapse.
            .filter(|&node| self.tree.is_attached(node))
    }

    fn begin(&mut self, mut tracks: Vec<Track>, alt: bool, now: Duration) {
        if let Some(tween) = self.tween.as_ref() {
            let carried = self.carry_exiting(tween, &tracks);
            tracks.extend(carried);
        }
        if tracks.is_empty() {
            self.tween = None;
            self.settle();
            return;
        }
        let t = &self.config.transition;
        let ms = if alt { t.slow_duration_ms } else { t.duration_ms };
        let duration = Duration::from_millis(u64::from(ms));
        match self.tween.as_mut() {
            Some(tween) => {
                tween.transition.supersede(now, duration, t.easing);
                tween.tracks = tracks;
            }
            None => {
                log::debug!("transition start: {} tracks over {ms} ms", tracks.len());
                self.tween = Some(Tween::new(Transition::start(now, duration, t.easing), tracks));
            }
        }
    }

    /// Nodes still travelling into a collapsed ancestor when a new
    /// transition cuts in. They keep going from where they are to wherever
    /// that ancestor is now headed.
    fn carry_exiting(&self, tween: &Tween, tracks: &[Track]) -> Vec<Track> {
        let moving: HashMap<NodeIndex, Point> = tracks.iter().map(|t| (t.node, t.to)).collect();
        tween
            .exiting()
            .filter(|&node| !moving.contains_key(&node) && !self.tree.is_attached(node))
            .map(|node| {
                let anchor = self.tree.attached_ancestor(node);
                Track {
                    node,
                    from: self.tree.node(node).pos,
                    to: moving.get(&anchor).copied().unwrap_or(self.tree.node(anchor).pos),
                    exiting: true,
                }
            })
            .collect()
    }

    /// Swap in an index built from settled positions and re-resolve hover.
    fn settle(&mut self) {
        self.index = SpatialIndex::from_tree(&self.tree);
        self.ctx.hovered = self.ctx.pointer.and_then(|p| self.hit(p));
    }
}

fn checked(config: ExplorerConfig) -> ExplorerConfig {
    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            log::warn!("invalid config, using defaults: {e}");
            ExplorerConfig::default()
        }
    }
}
