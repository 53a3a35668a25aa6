//! Region quadtree used as the per-tick neighbour index.
//!
//! Every node keeps the handles inserted into it. Leaves split into four equal
//! quadrants once they hold more than `capacity` entries, unless they already
//! sit at `max_depth`. A point lying exactly on a dividing line cannot be
//! assigned to a single quadrant and stays at the node that owns the line.

use crate::rect::Rect;
use crate::AgentId;

/// A stored handle together with the point it was inserted at.
///
/// The point is kept so a splitting node can redistribute its entries without
/// looking anything up in the agent arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub id: AgentId,
    pub x: f64,
    pub y: f64,
}

/// Represents a node in the Quadtree. The root is a node at level 0.
#[derive(Debug, Clone)]
pub struct QuadTree {
    bounds: Rect,
    level: u32,
    capacity: usize,
    max_depth: u32,
    stored: Vec<Entry>,
    // Ordered by `Quadrant::index`: top-right, top-left, bottom-left, bottom-right
    children: Option<Box<[QuadTree; 4]>>,
}

impl QuadTree {
    /// Creates an empty root node covering `bounds`.
    pub fn new(bounds: Rect, capacity: usize, max_depth: u32) -> Self {
        Self::with_level(bounds, capacity, max_depth, 0)
    }

    /// Creates an empty node at the given depth.
    pub fn with_level(bounds: Rect, capacity: usize, max_depth: u32, level: u32) -> Self {
        Self {
            bounds,
            level,
            capacity,
            max_depth,
            stored: Vec::with_capacity(capacity + 1),
            children: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Entries held directly by this node, in insertion order.
    pub fn stored(&self) -> &[Entry] {
        &self.stored
    }

    pub fn children(&self) -> Option<&[QuadTree; 4]> {
        self.children.as_deref()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Number of entries in this node and all of its descendants.
    pub fn len(&self) -> usize {
        self.stored.len()
            + self
                .children
                .iter()
                .flat_map(|children| children.iter())
                .map(QuadTree::len)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flat_map(|children| children.iter())
            .map(QuadTree::node_count)
            .sum::<usize>()
    }

    /// Deepest level reached in this subtree.
    pub fn depth(&self) -> u32 {
        self.children
            .iter()
            .flat_map(|children| children.iter())
            .map(QuadTree::depth)
            .max()
            .unwrap_or(self.level)
    }

    /// Empties every node of the subtree but keeps the node structure.
    pub fn clear(&mut self) {
        self.stored.clear();
        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                child.clear();
            }
        }
    }

    /// Drops all children and entries, leaving a single empty node with the
    /// same bounds and level.
    pub fn reset(&mut self) {
        self.stored.clear();
        self.children = None;
    }

    /// Inserts a handle at `(x, y)`.
    pub fn insert(&mut self, id: AgentId, x: f64, y: f64) {
        self.insert_entry(Entry { id, x, y });
    }

    fn insert_entry(&mut self, entry: Entry) {
        if let Some(children) = self.children.as_deref_mut() {
            match self.bounds.quadrant_of(entry.x, entry.y) {
                Some(quadrant) => children[quadrant.index()].insert_entry(entry),
                None => self.stored.push(entry),
            }
            return;
        }

        self.stored.push(entry);
        if self.stored.len() > self.capacity && self.level < self.max_depth {
            self.split();
        }
    }

    /// Turns this leaf into an internal node and pushes down every entry that
    /// falls cleanly into one quadrant. Entries on a dividing line stay here,
    /// in their original order.
    fn split(&mut self) {
        debug_assert!(self.is_leaf(), "split called on an internal node");

        let (capacity, max_depth, level) = (self.capacity, self.max_depth, self.level + 1);
        let [top_right, top_left, bottom_left, bottom_right] = self.bounds.subdivide();
        let mut children = Box::new([
            QuadTree::with_level(top_right, capacity, max_depth, level),
            QuadTree::with_level(top_left, capacity, max_depth, level),
            QuadTree::with_level(bottom_left, capacity, max_depth, level),
            QuadTree::with_level(bottom_right, capacity, max_depth, level),
        ]);

        let pending = std::mem::take(&mut self.stored);
        for entry in pending {
            match self.bounds.quadrant_of(entry.x, entry.y) {
                Some(quadrant) => children[quadrant.index()].insert_entry(entry),
                None => self.stored.push(entry),
            }
        }

        self.children = Some(children);
    }

    /// Appends the candidate neighbours of `(x, y)` to `out`.
    ///
    /// Collects the entries of every node on the path from this node down to
    /// the leaf whose quadrant contains the point. The path stops early when
    /// the point lies on a dividing line. Neighbours just across a quadrant
    /// boundary are not visited, and far-away boundary entries are included,
    /// so callers must filter the result by true distance.
    pub fn retrieve(&self, out: &mut Vec<AgentId>, x: f64, y: f64) {
        out.extend(self.stored.iter().map(|entry| entry.id));

        if let Some(children) = self.children.as_deref() {
            if let Some(quadrant) = self.bounds.quadrant_of(x, y) {
                children[quadrant.index()].retrieve(out, x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Quadrant;

    fn tree(capacity: usize, max_depth: u32) -> QuadTree {
        QuadTree::new(Rect::from_size(100.0, 100.0), capacity, max_depth)
    }

    fn ids(out: &[AgentId]) -> Vec<u32> {
        out.iter().map(|id| id.0).collect()
    }

    #[test]
    fn capacity_entries_do_not_split() {
        let mut qt = tree(4, 3);
        for i in 0..4 {
            qt.insert(AgentId(i), 10.0 + i as f64, 10.0);
        }
        assert!(qt.is_leaf());
        assert_eq!(qt.stored().len(), 4);
    }

    #[test]
    fn one_past_capacity_splits() {
        let mut qt = tree(4, 3);
        qt.insert(AgentId(0), 10.0, 10.0); // top-left
        qt.insert(AgentId(1), 90.0, 10.0); // top-right
        qt.insert(AgentId(2), 10.0, 90.0); // bottom-left
        qt.insert(AgentId(3), 90.0, 90.0); // bottom-right
        qt.insert(AgentId(4), 60.0, 60.0); // bottom-right

        assert!(!qt.is_leaf());
        assert!(qt.stored().is_empty());
        let children = qt.children().unwrap();
        assert_eq!(children[Quadrant::TopRight.index()].stored().len(), 1);
        assert_eq!(children[Quadrant::TopLeft.index()].stored().len(), 1);
        assert_eq!(children[Quadrant::BottomLeft.index()].stored().len(), 1);
        assert_eq!(children[Quadrant::BottomRight.index()].stored().len(), 2);
        assert!(children.iter().all(|c| c.level() == 1));
        assert_eq!(qt.len(), 5);
    }

    #[test]
    fn max_depth_leaf_grows_without_splitting() {
        let mut qt = tree(2, 0);
        for i in 0..20 {
            qt.insert(AgentId(i), 10.0 + i as f64, 30.0);
        }
        assert!(qt.is_leaf());
        assert_eq!(qt.stored().len(), 20);
    }

    #[test]
    fn clustered_points_split_down_to_max_depth() {
        let mut qt = tree(1, 3);
        for i in 0..6 {
            qt.insert(AgentId(i), 1.0 + i as f64 * 0.1, 1.0);
        }
        assert_eq!(qt.depth(), 3);
        assert_eq!(qt.len(), 6);
    }

    #[test]
    fn boundary_points_stay_at_ancestor() {
        let mut qt = tree(2, 3);
        // All on the vertical midline.
        for i in 0..5 {
            qt.insert(AgentId(i), 50.0, 5.0 + i as f64 * 10.0);
        }
        assert!(!qt.is_leaf());
        assert_eq!(ids(&qt.stored().iter().map(|e| e.id).collect::<Vec<_>>()), vec![0, 1, 2, 3, 4]);
        assert_eq!(qt.len(), 5);

        // A later split-free insert still leaves them intact and unduplicated.
        qt.insert(AgentId(5), 20.0, 20.0);
        let mut out = Vec::new();
        qt.retrieve(&mut out, 50.0, 25.0);
        assert_eq!(ids(&out), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn boundary_points_survive_split_with_interior_points() {
        let mut qt = tree(3, 4);
        qt.insert(AgentId(0), 50.0, 10.0);
        qt.insert(AgentId(1), 10.0, 10.0);
        qt.insert(AgentId(2), 30.0, 50.0);
        qt.insert(AgentId(3), 80.0, 80.0);

        assert_eq!(ids(&qt.stored().iter().map(|e| e.id).collect::<Vec<_>>()), vec![0, 2]);

        let mut out = Vec::new();
        qt.retrieve(&mut out, 10.0, 10.0);
        assert_eq!(ids(&out), vec![0, 2, 1]);
    }

    #[test]
    fn retrieve_follows_single_quadrant_chain() {
        let mut qt = tree(1, 3);
        qt.insert(AgentId(0), 10.0, 10.0);
        qt.insert(AgentId(1), 90.0, 90.0);

        let mut out = Vec::new();
        qt.retrieve(&mut out, 10.0, 10.0);
        assert_eq!(ids(&out), vec![0]);

        out.clear();
        qt.retrieve(&mut out, 90.0, 90.0);
        assert_eq!(ids(&out), vec![1]);
    }

    #[test]
    fn retrieve_on_midline_returns_only_ancestor_entries() {
        let mut qt = tree(1, 3);
        qt.insert(AgentId(0), 10.0, 10.0);
        qt.insert(AgentId(1), 90.0, 90.0);
        qt.insert(AgentId(2), 50.0, 50.0);

        let mut out = Vec::new();
        qt.retrieve(&mut out, 50.0, 50.0);
        assert_eq!(ids(&out), vec![2]);
    }

    #[test]
    fn every_point_retrieves_itself() {
        let mut qt = tree(3, 5);
        let mut points = Vec::new();
        for i in 0..200u32 {
            // Deterministic scatter, including some midline coordinates.
            let x = ((i * 37) % 101) as f64 * 0.99;
            let y = ((i * 53) % 97) as f64 * 1.03;
            points.push((AgentId(i), x, y));
            qt.insert(AgentId(i), x, y);
        }
        assert_eq!(qt.len(), points.len());

        let mut out = Vec::new();
        for &(id, x, y) in &points {
            out.clear();
            qt.retrieve(&mut out, x, y);
            assert_eq!(out.iter().filter(|&&found| found == id).count(), 1, "{id} lost at ({x}, {y})");
        }
    }

    #[test]
    fn clear_keeps_structure_reset_drops_it() {
        let mut qt = tree(1, 3);
        qt.insert(AgentId(0), 10.0, 10.0);
        qt.insert(AgentId(1), 90.0, 90.0);
        let nodes = qt.node_count();
        assert!(nodes > 1);

        qt.clear();
        assert!(qt.is_empty());
        assert_eq!(qt.node_count(), nodes);

        qt.reset();
        assert!(qt.is_leaf());
        assert_eq!(qt.node_count(), 1);
        assert_eq!(qt.bounds(), Rect::from_size(100.0, 100.0));
    }

    #[test]
    fn points_outside_bounds_are_kept() {
        let mut qt = tree(1, 2);
        qt.insert(AgentId(0), -5.0, -5.0);
        qt.insert(AgentId(1), 150.0, 20.0);
        assert_eq!(qt.len(), 2);

        let mut out = Vec::new();
        qt.retrieve(&mut out, -5.0, -5.0);
        assert!(out.contains(&AgentId(0)));
    }
}
