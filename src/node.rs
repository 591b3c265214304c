//! Search nodes, the search tree and queue priorities.
//!
//! Nodes live in an arena ([`SearchTree`]) in creation order; a node's
//! parent is an index into the same arena, so the tree is acyclic by
//! construction and is dropped in one piece when the search ends.
//!
//! Two priority keys order the open set. For both, `Ordering::Less` means
//! "expand first".
//! - [`DijkstraKey`]: lower `g`; on equal `g`, greater depth. Among equally
//!   cheap partial alignments the longer one goes first, which decides
//!   which of several optimal alignments is returned.
//! - [`AStarKey`]: lower `f = g + h`; then feasible before infeasible; then
//!   lower `g` (trust the heuristic over the accumulated cost); then lower `h`.

use std::cmp::Ordering;
use std::ops::Index;

use crate::cost::Cost;
use crate::net::{Marking, TransitionId};

/// Index of a node in its [`SearchTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Heuristic data attached to a node by informed search.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeHeuristic {
    pub h: Cost,
    /// Fractional witness of `h`.
    pub x: Vec<f64>,
    /// Whether the relaxation behind `h` was solvable.
    pub feasible: bool,
}

#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Accumulated cost from the search root.
    pub g: Cost,
    pub marking: Marking,
    pub parent: Option<NodeId>,
    /// Transition fired from `parent` to reach this node.
    pub transition: Option<TransitionId>,
    /// Path length from the root.
    pub depth: usize,
    /// Present in informed search only.
    pub heuristic: Option<NodeHeuristic>,
}

impl SearchNode {
    pub fn h(&self) -> Option<Cost> {
        self.heuristic.as_ref().map(|hx| hx.h)
    }

    /// `g + h`, defined only when `h` is.
    pub fn f(&self) -> Option<Cost> {
        self.h().map(|h| self.g.saturating_add(h))
    }

    /// Nodes without heuristic data count as feasible.
    pub fn is_feasible(&self) -> bool {
        self.heuristic.as_ref().map_or(true, |hx| hx.feasible)
    }
}

/// Arena of search nodes for one search run.
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    /// Tree holding only the root: `g = 0`, depth 0, no parent, no transition.
    pub fn with_root(marking: Marking, heuristic: Option<NodeHeuristic>) -> Self {
        Self {
            nodes: vec![SearchNode {
                g: 0,
                marking,
                parent: None,
                transition: None,
                depth: 0,
                heuristic,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append the child reached from `parent` by firing `transition` at `cost`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        transition: TransitionId,
        cost: Cost,
        marking: Marking,
        heuristic: Option<NodeHeuristic>,
    ) -> NodeId {
        let (g, depth) = {
            let p = &self.nodes[parent.0];
            (p.g.saturating_add(cost), p.depth + 1)
        };
        self.nodes.push(SearchNode {
            g,
            marking,
            parent: Some(parent),
            transition: Some(transition),
            depth,
            heuristic,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Transitions from `id` up to the root, nearest first.
    pub fn transitions_to_root(&self, id: NodeId) -> Vec<TransitionId> {
        let mut out = Vec::with_capacity(self.nodes[id.0].depth);
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.0];
            if let Some(t) = node.transition {
                out.push(t);
            }
            cursor = node.parent;
        }
        out
    }

    /// Transitions from the root down to `id`.
    pub fn firing_sequence(&self, id: NodeId) -> Vec<TransitionId> {
        let mut seq = self.transitions_to_root(id);
        seq.reverse();
        seq
    }
}

impl Index<NodeId> for SearchTree {
    type Output = SearchNode;

    fn index(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }
}

/// Open-set priority of a node.
pub trait PriorityKey: Ord + Copy + std::fmt::Debug {
    /// Whether nodes need heuristic estimates.
    const INFORMED: bool;

    fn of(node: &SearchNode) -> Self;

    fn g(&self) -> Cost;

    /// Lower bound on any completion through this node: `g` for uninformed
    /// keys, `f` for informed ones.
    fn bound(&self) -> Cost;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DijkstraKey {
    pub g: Cost,
    pub depth: usize,
}

impl Ord for DijkstraKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.g
            .cmp(&other.g)
            .then_with(|| other.depth.cmp(&self.depth))
    }
}

impl PartialOrd for DijkstraKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PriorityKey for DijkstraKey {
    const INFORMED: bool = false;

    fn of(node: &SearchNode) -> Self {
        Self {
            g: node.g,
            depth: node.depth,
        }
    }

    fn g(&self) -> Cost {
        self.g
    }

    fn bound(&self) -> Cost {
        self.g
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AStarKey {
    pub g: Cost,
    pub h: Cost,
    pub feasible: bool,
}

impl AStarKey {
    #[inline]
    pub fn f(&self) -> Cost {
        self.g.saturating_add(self.h)
    }
}

impl Ord for AStarKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f()
            .cmp(&other.f())
            .then_with(|| other.feasible.cmp(&self.feasible))
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| self.h.cmp(&other.h))
    }
}

impl PartialOrd for AStarKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PriorityKey for AStarKey {
    const INFORMED: bool = true;

    fn of(node: &SearchNode) -> Self {
        Self {
            g: node.g,
            h: node.h().unwrap_or(0),
            feasible: node.is_feasible(),
        }
    }

    fn g(&self) -> Cost {
        self.g
    }

    fn bound(&self) -> Cost {
        self.f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marking(p: usize) -> Marking {
        Marking::from_places(4, &[p])
    }

    #[test]
    fn children_accumulate_cost_and_depth() {
        let mut tree = SearchTree::with_root(marking(0), None);
        let root = tree.root();
        let a = tree.add_child(root, 3, 10, marking(1), None);
        let b = tree.add_child(a, 5, 0, marking(2), None);
        assert_eq!(tree[b].g, 10);
        assert_eq!(tree[b].depth, 2);
        assert_eq!(tree[b].parent, Some(a));
        assert_eq!(tree.firing_sequence(b), vec![3, 5]);
        assert_eq!(tree.transitions_to_root(b), vec![5, 3]);
        assert!(tree.firing_sequence(root).is_empty());
    }

    #[test]
    fn dijkstra_prefers_deeper_on_equal_cost() {
        let shallow = DijkstraKey { g: 10, depth: 1 };
        let deep = DijkstraKey { g: 10, depth: 4 };
        let cheap = DijkstraKey { g: 0, depth: 0 };
        assert_eq!(deep.cmp(&shallow), Ordering::Less);
        assert_eq!(cheap.cmp(&deep), Ordering::Less);
    }

    #[test]
    fn a_star_tie_chain() {
        let key = |g, h, feasible| AStarKey { g, h, feasible };
        // f first
        assert!(key(5, 0, false) < key(0, 6, true));
        // then feasibility
        assert!(key(5, 5, true) < key(5, 5, false));
        assert!(key(9, 1, true) < key(1, 9, false));
        // then lower g
        assert!(key(2, 8, true) < key(8, 2, true));
    }

    #[test]
    fn f_is_only_defined_with_h() {
        let tree = SearchTree::with_root(marking(0), None);
        assert_eq!(tree[tree.root()].f(), None);
        let informed = SearchTree::with_root(
            marking(0),
            Some(NodeHeuristic {
                h: 7,
                x: vec![],
                feasible: true,
            }),
        );
        assert_eq!(informed[informed.root()].f(), Some(7));
    }
}
