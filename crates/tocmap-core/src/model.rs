//! Tree store: the arena of document nodes and their visual state.
//!
//! Nodes live in a `petgraph` graph whose edges point parent → child. The
//! full child list is always retained; whether it is *attached* to the
//! layout is a view derived from each node's [`NodeState`]. Node count and
//! identity are fixed at load time. Only state and coordinates mutate.

use crate::config::ExplorerConfig;
use crate::document::{Document, Section};
use crate::id::NodeId;
use crate::text::{TextMeasure, wrap_text};
use kurbo::{Point, Size};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Child lists are short in practice; keep them off the heap.
pub type ChildList = SmallVec<[NodeIndex; 8]>;

// ─── Node ────────────────────────────────────────────────────────────────

/// Whether a node's children are attached to the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Closed,
    Open,
}

impl NodeState {
    pub fn is_open(self) -> bool {
        self == NodeState::Open
    }

    pub fn toggled(self) -> Self {
        match self {
            NodeState::Closed => NodeState::Open,
            NodeState::Open => NodeState::Closed,
        }
    }
}

/// One document section plus its layout and animation state.
#[derive(Debug, Clone)]
pub struct DocNode {
    pub id: NodeId,
    pub name: String,
    pub content: String,
    /// Pre-broken content lines, computed once at load.
    pub lines: Vec<String>,
    pub depth: u32,
    pub state: NodeState,
    pub closed_size: Size,
    pub open_size: Size,
    /// Current coordinates (post-layout, post-offset, or mid-transition).
    pub pos: Point,
    /// Snapshot taken immediately before a transition begins.
    pub start: Point,
}

impl DocNode {
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Active box size; height follows the state, width never changes.
    pub fn size(&self) -> Size {
        match self.state {
            NodeState::Closed => self.closed_size,
            NodeState::Open => self.open_size,
        }
    }

    pub fn height(&self) -> f64 {
        self.size().height
    }

    pub fn width(&self) -> f64 {
        self.closed_size.width
    }
}

// ─── Tree Store ──────────────────────────────────────────────────────────

/// Arena of [`DocNode`]s addressed by `NodeIndex`.
#[derive(Debug, Clone)]
pub struct TreeStore {
    graph: DiGraph<DocNode, ()>,
    root: NodeIndex,
    id_index: HashMap<NodeId, NodeIndex>,
}

impl TreeStore {
    /// Build the store from a loaded document, wrapping every node's content.
    ///
    /// The root and every leaf start open; other branches start open when
    /// shallower than `config.initial_open_depth`.
    pub fn from_document(doc: &Document, config: &ExplorerConfig, measure: &dyn TextMeasure) -> Self {
        let mut graph = DiGraph::with_capacity(doc.len(), doc.len().saturating_sub(1));
        let mut id_index = HashMap::with_capacity(doc.len());
        let mut builder = Builder {
            graph: &mut graph,
            id_index: &mut id_index,
            config,
            measure,
        };
        let root = builder.add(&doc.root, 0, None);
        log::debug!("tree store built with {} nodes", graph.node_count());
        Self {
            graph,
            root,
            id_index,
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Always false: a store has at least its root.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, idx: NodeIndex) -> &DocNode {
        &self.graph[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut DocNode {
        &mut self.graph[idx]
    }

    /// Every node index, in document (pre-order) order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Full child list in document order, attached or not.
    pub fn children(&self, idx: NodeIndex) -> ChildList {
        let mut children: ChildList = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Children as seen by the layout: the full list when open, empty when closed.
    pub fn layout_children(&self, idx: NodeIndex) -> ChildList {
        if self.graph[idx].is_open() {
            self.children(idx)
        } else {
            ChildList::new()
        }
    }

    pub fn has_children(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .next()
            .is_some()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    pub fn depth(&self, idx: NodeIndex) -> u32 {
        self.graph[idx].depth
    }

    pub fn find(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Look a node up by its id spelling without interning it.
    pub fn find_str(&self, id: &str) -> Option<NodeIndex> {
        NodeId::get(id).and_then(|id| self.find(id))
    }

    /// A node is attached when every ancestor is open.
    pub fn is_attached(&self, idx: NodeIndex) -> bool {
        let mut cur = idx;
        while let Some(parent) = self.parent(cur) {
            if !self.graph[parent].is_open() {
                return false;
            }
            cur = parent;
        }
        true
    }

    /// Attached nodes in pre-order, root first.
    pub fn attached(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            let children = self.layout_children(idx);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// All descendants of `idx` in pre-order, excluding `idx` itself.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.children(idx).into_iter().rev().collect();
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.children(cur).into_iter().rev());
        }
        out
    }

    /// Nearest ancestor-or-self that is attached.
    pub fn attached_ancestor(&self, idx: NodeIndex) -> NodeIndex {
        let mut best = idx;
        let mut cur = idx;
        while let Some(parent) = self.parent(cur) {
            if !self.graph[parent].is_open() {
                best = parent;
            }
            cur = parent;
        }
        best
    }
}

// ─── Builder ─────────────────────────────────────────────────────────────

struct Builder<'a> {
    graph: &'a mut DiGraph<DocNode, ()>,
    id_index: &'a mut HashMap<NodeId, NodeIndex>,
    config: &'a ExplorerConfig,
    measure: &'a dyn TextMeasure,
}

impl Builder<'_> {
    /// Add `section` and its subtree; node indices follow pre-order so that
    /// sorting children by index yields document order.
    fn add(&mut self, section: &Section, depth: u32, parent: Option<NodeIndex>) -> NodeIndex {
        let metrics = &self.config.node;
        let lines = wrap_text(&section.content, metrics.line_width, self.measure, &self.config.font);
        let closed_size = Size::new(metrics.line_width, metrics.closed_height);
        let open_height = (lines.len() as f64 * metrics.line_height).max(metrics.closed_height);

        let is_leaf = section.children.is_empty();
        let state = if parent.is_none() || is_leaf || depth < self.config.initial_open_depth {
            NodeState::Open
        } else {
            NodeState::Closed
        };

        let idx = self.graph.add_node(DocNode {
            id: section.id,
            name: section.name.clone(),
            content: section.content.clone(),
            lines,
            depth,
            state,
            closed_size,
            open_size: Size::new(metrics.line_width, open_height),
            pos: Point::ZERO,
            start: Point::ZERO,
        });
        self.id_index.insert(section.id, idx);
        if let Some(parent) = parent {
            self.graph.add_edge(parent, idx, ());
        }
        for child in &section.children {
            self.add(child, depth + 1, Some(idx));
        }
        idx
    }
}
