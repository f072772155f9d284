//! Expand/collapse controller.
//!
//! Every state change follows the same sequence: snapshot current positions,
//! mutate [`NodeState`]s, run the layout, then hand back the tracks of every
//! attached node that moved and of every node that left the layout.
//! Positions are restored to the snapshot so the caller's animator starts
//! from what is on screen.

use crate::animation::Track;
use std::collections::HashSet;
use tocmap_core::{GeometryLayout, LayoutAdapter, NodeIndex, NodeState, TidyLayout, TreeStore};

#[derive(Debug, Clone)]
pub struct Controller<L = TidyLayout> {
    adapter: LayoutAdapter<L>,
}

impl<L: GeometryLayout> Controller<L> {
    pub fn new(adapter: LayoutAdapter<L>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &LayoutAdapter<L> {
        &self.adapter
    }

    /// Flip `node` between open and closed.
    ///
    /// Returns `None` for leaves, which have nothing to attach. Only `node`'s
    /// own state changes: descendants keep theirs, so an open grandchild is
    /// open again when its parent reopens.
    pub fn toggle(&self, tree: &mut TreeStore, node: NodeIndex) -> Option<Vec<Track>> {
        if !tree.has_children(node) {
            log::debug!("toggle ignored for leaf {}", tree.node(node).id);
            return None;
        }
        let next = tree.node(node).state.toggled();
        log::debug!("toggle {} -> {next:?}", tree.node(node).id);
        Some(self.transition(tree, |tree| tree.node_mut(node).state = next))
    }

    /// Open every node that has children.
    pub fn expand_all(&self, tree: &mut TreeStore) -> Vec<Track> {
        log::debug!("expand all");
        self.transition(tree, |tree| {
            let branches: Vec<NodeIndex> = tree.indices().filter(|&i| tree.has_children(i)).collect();
            for idx in branches {
                tree.node_mut(idx).state = NodeState::Open;
            }
        })
    }

    /// Close every branch except the root, which stays open.
    pub fn collapse_all(&self, tree: &mut TreeStore) -> Vec<Track> {
        log::debug!("collapse all");
        self.transition(tree, |tree| {
            let root = tree.root();
            let branches: Vec<NodeIndex> = tree
                .indices()
                .filter(|&i| i != root && tree.has_children(i))
                .collect();
            for idx in branches {
                tree.node_mut(idx).state = NodeState::Closed;
            }
            tree.node_mut(root).state = NodeState::Open;
        })
    }

    fn transition(&self, tree: &mut TreeStore, mutate: impl FnOnce(&mut TreeStore)) -> Vec<Track> {
        let all: Vec<NodeIndex> = tree.indices().collect();
        for &idx in &all {
            let node = tree.node_mut(idx);
            node.start = node.pos;
        }
        let before = tree.attached();

        mutate(tree);
        self.adapter.compute_layout(tree);

        let after = tree.attached();
        let attached: HashSet<NodeIndex> = after.iter().copied().collect();
        let mut tracks = Vec::new();

        // Nodes leaving the layout travel into the ancestor that closed over them.
        for idx in before.into_iter().filter(|idx| !attached.contains(idx)) {
            let from = tree.node(idx).start;
            let to = tree.node(tree.attached_ancestor(idx)).pos;
            if from != to {
                tracks.push(Track {
                    node: idx,
                    from,
                    to,
                    exiting: true,
                });
            }
        }

        // Reattached nodes start from the coordinates they kept while detached.
        for idx in after {
            let node = tree.node_mut(idx);
            if node.start != node.pos {
                tracks.push(Track {
                    node: idx,
                    from: node.start,
                    to: node.pos,
                    exiting: false,
                });
                node.pos = node.start;
            }
        }
        log::debug!("transition moves {} nodes", tracks.len());
        tracks
    }
}
