//! Tree layout.
//!
//! [`GeometryLayout`] is the black-box routine that places a tree of sized
//! boxes. [`TidyLayout`] is the default implementation. [`LayoutAdapter`]
//! feeds it the open/closed view of the [`TreeStore`] and writes the
//! resulting coordinates back, shifted by a global offset.
//!
//! Orientation: `x` grows with depth, `y` spreads siblings.

use crate::config::NodeMetrics;
use crate::model::TreeStore;
use kurbo::{Point, Vec2};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// The canvas (viewport) dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Assigns a position to every node reachable through
/// [`TreeStore::layout_children`], reading each node's current size.
///
/// Implementations must be pure: the same tree state yields bit-identical
/// output.
pub trait GeometryLayout {
    fn layout(&self, tree: &TreeStore, root: NodeIndex) -> HashMap<NodeIndex, Point>;
}

// ─── Tidy layout ─────────────────────────────────────────────────────────

/// Layered layout: each depth step advances `x` by the parent's width plus
/// `level_gap`; each subtree owns a band on the `y` axis and the parent sits
/// at the centre of the band its children occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TidyLayout {
    pub level_gap: f64,
    pub sibling_gap: f64,
}

impl Default for TidyLayout {
    fn default() -> Self {
        Self::from_metrics(&NodeMetrics::default())
    }
}

impl TidyLayout {
    pub fn from_metrics(metrics: &NodeMetrics) -> Self {
        Self {
            level_gap: metrics.level_gap,
            sibling_gap: metrics.sibling_gap,
        }
    }

    /// Breadth each subtree needs, computed bottom-up.
    fn measure_bands(&self, tree: &TreeStore, idx: NodeIndex, bands: &mut HashMap<NodeIndex, f64>) -> f64 {
        let own = tree.node(idx).height() + self.sibling_gap;
        let children: f64 = tree
            .layout_children(idx)
            .into_iter()
            .map(|child| self.measure_bands(tree, child, bands))
            .sum();
        let band = own.max(children);
        bands.insert(idx, band);
        band
    }

    fn place(
        &self,
        tree: &TreeStore,
        idx: NodeIndex,
        at: Point,
        bands: &HashMap<NodeIndex, f64>,
        out: &mut HashMap<NodeIndex, Point>,
    ) {
        out.insert(idx, at);
        let children = tree.layout_children(idx);
        if children.is_empty() {
            return;
        }
        let child_x = at.x + tree.node(idx).width() + self.level_gap;
        let total: f64 = children.iter().map(|c| bands[c]).sum();
        let mut cursor = at.y - total / 2.0;
        for child in children {
            let band = bands[&child];
            self.place(tree, child, Point::new(child_x, cursor + band / 2.0), bands, out);
            cursor += band;
        }
    }
}

impl GeometryLayout for TidyLayout {
    fn layout(&self, tree: &TreeStore, root: NodeIndex) -> HashMap<NodeIndex, Point> {
        let mut bands = HashMap::new();
        self.measure_bands(tree, root, &mut bands);
        let mut out = HashMap::with_capacity(bands.len());
        self.place(tree, root, Point::ZERO, &bands, &mut out);
        out
    }
}

// ─── Adapter ─────────────────────────────────────────────────────────────

/// Runs a [`GeometryLayout`] over the tree and writes coordinates back.
///
/// Only attached nodes are written. Detached nodes keep their last
/// coordinates so a later expand can animate out of them.
#[derive(Debug, Clone)]
pub struct LayoutAdapter<L = TidyLayout> {
    layout: L,
    offset: Vec2,
}

impl<L: GeometryLayout> LayoutAdapter<L> {
    /// The root lands a tenth of the way in and vertically centred.
    pub fn new(layout: L, viewport: Viewport) -> Self {
        Self {
            layout,
            offset: Vec2::new(viewport.width / 10.0, viewport.height / 2.0),
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Recompute every attached node's `pos` from the current state.
    pub fn compute_layout(&self, tree: &mut TreeStore) {
        let positions = self.layout.layout(tree, tree.root());
        log::trace!("layout placed {} nodes", positions.len());
        for (idx, p) in positions {
            tree.node_mut(idx).pos = p + self.offset;
        }
    }

    /// Park every detached node at its nearest attached ancestor.
    ///
    /// Run once after the first layout so that nodes never laid out still
    /// have a sensible origin for their first expand.
    pub fn seed_detached(&self, tree: &mut TreeStore) {
        let detached: Vec<NodeIndex> = tree.indices().filter(|&i| !tree.is_attached(i)).collect();
        for idx in detached {
            let anchor = tree.attached_ancestor(idx);
            let pos = tree.node(anchor).pos;
            let node = tree.node_mut(idx);
            node.pos = pos;
            node.start = pos;
        }
    }
}
