//! Hit testing: nearest node to a data-space point.
//!
//! [`SpatialIndex`] is an implicit 2-d tree over a flat entry array. It is
//! bulk-built in `O(n log n)` and never mutated; after a layout change the
//! caller builds a fresh index and swaps it in.

use kurbo::Point;
use tocmap_core::{NodeId, NodeIndex, TreeStore};

/// Read-only projection of a node's position at build time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub node: NodeIndex,
    pub id: NodeId,
    pub pos: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    fn key(self, p: Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

/// Median-split 2-d tree stored implicitly: the subtree over `entries[lo..hi]`
/// has its splitting entry at `(lo + hi) / 2`, and the split axis alternates
/// with depth starting at `x`.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    entries: Vec<Entry>,
}

impl SpatialIndex {
    pub fn build(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut entries: Vec<Entry> = entries.into_iter().collect();
        Self::partition(&mut entries, Axis::X);
        Self { entries }
    }

    /// Index every node attached to the layout at its current position.
    pub fn from_tree(tree: &TreeStore) -> Self {
        let index = Self::build(tree.attached().into_iter().map(|idx| {
            let node = tree.node(idx);
            Entry {
                node: idx,
                id: node.id,
                pos: node.pos,
            }
        }));
        log::debug!("spatial index rebuilt with {} entries", index.len());
        index
    }

    fn partition(slice: &mut [Entry], axis: Axis) {
        if slice.len() <= 1 {
            return;
        }
        let mid = slice.len() / 2;
        slice.select_nth_unstable_by(mid, |a, b| axis.key(a.pos).total_cmp(&axis.key(b.pos)));
        let (left, right) = slice.split_at_mut(mid);
        Self::partition(left, axis.next());
        Self::partition(&mut right[1..], axis.next());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Closest entry within `radius` of `p` (inclusive), or `None`.
    ///
    /// `p` and `radius` are in data space.
    pub fn find_nearest(&self, p: Point, radius: f64) -> Option<&Entry> {
        if radius.is_nan() || radius < 0.0 {
            return None;
        }
        let mut search = Search {
            target: p,
            best: None,
            best_d2: radius * radius,
        };
        self.search(0, self.entries.len(), Axis::X, &mut search);
        search.best.map(|i| &self.entries[i])
    }

    fn search(&self, lo: usize, hi: usize, axis: Axis, s: &mut Search) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let entry = &self.entries[mid];
        s.offer(mid, entry.pos);

        let diff = axis.key(s.target) - axis.key(entry.pos);
        let (near, far) = if diff < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };
        self.search(near.0, near.1, axis.next(), s);
        if diff * diff <= s.best_d2 {
            self.search(far.0, far.1, axis.next(), s);
        }
    }
}

struct Search {
    target: Point,
    best: Option<usize>,
    best_d2: f64,
}

impl Search {
    fn offer(&mut self, slot: usize, pos: Point) {
        let d2 = (pos - self.target).hypot2();
        // The first hit may sit exactly on the radius; later ones must be strictly closer.
        let better = match self.best {
            None => d2 <= self.best_d2,
            Some(_) => d2 < self.best_d2,
        };
        if better {
            self.best = Some(slot);
            self.best_d2 = d2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entries(points: &[(f64, f64)]) -> Vec<Entry> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Entry {
                node: NodeIndex::new(i),
                id: NodeId::intern(&format!("pt-{i}")),
                pos: Point::new(x, y),
            })
            .collect()
    }

    #[test]
    fn empty_index_finds_nothing() {
        let index = SpatialIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.find_nearest(Point::ZERO, 1e9).is_none());
    }

    #[test]
    fn finds_closest_within_radius() {
        let index = SpatialIndex::build(entries(&[(0.0, 0.0), (10.0, 0.0), (3.0, 4.0)]));
        assert_eq!(index.len(), 3);
        let hit = index.find_nearest(Point::new(2.0, 3.0), 5.0).unwrap();
        assert_eq!(hit.node, NodeIndex::new(2));
    }

    #[test]
    fn radius_is_inclusive_and_exclusive_beyond() {
        let index = SpatialIndex::build(entries(&[(3.0, 4.0)]));
        assert!(index.find_nearest(Point::ZERO, 5.0).is_some());
        assert!(index.find_nearest(Point::ZERO, 4.999).is_none());
    }

    #[test]
    fn negative_or_nan_radius_finds_nothing() {
        let index = SpatialIndex::build(entries(&[(0.0, 0.0)]));
        assert!(index.find_nearest(Point::ZERO, -1.0).is_none());
        assert!(index.find_nearest(Point::ZERO, f64::NAN).is_none());
    }

    #[test]
    fn duplicate_points_resolve_deterministically() {
        let index = SpatialIndex::build(entries(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]));
        let a = index.find_nearest(Point::new(1.0, 1.0), 1.0).unwrap().node;
        let b = index.find_nearest(Point::new(1.0, 1.0), 1.0).unwrap().node;
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn matches_brute_force(
            points in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 0..200),
            queries in prop::collection::vec((-600.0f64..600.0, -600.0f64..600.0), 1..20),
            radius in 0.0f64..150.0,
        ) {
            let index = SpatialIndex::build(entries(&points));
            for (qx, qy) in queries {
                let q = Point::new(qx, qy);
                let brute = points
                    .iter()
                    .map(|&(x, y)| (Point::new(x, y) - q).hypot())
                    .fold(f64::INFINITY, f64::min);
                match index.find_nearest(q, radius) {
                    Some(hit) => {
                        let d = (hit.pos - q).hypot();
                        prop_assert!(d <= radius + 1e-9);
                        prop_assert!((d - brute).abs() < 1e-9, "found {d}, closest is {brute}");
                    }
                    None => prop_assert!(brute > radius - 1e-9, "missed point at {brute} within {radius}"),
                }
            }
        }
    }
}
