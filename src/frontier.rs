//! Open set: a binary heap of node priorities.
//!
//! Entries with equal keys pop in insertion order, so the expansion order
//! is a strict total order and every run is reproducible. The set also
//! tracks the multiset of `g` values it holds, which bidirectional
//! termination reads as the frontier's minimal cost.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::cost::Cost;
use crate::node::{NodeId, PriorityKey};

#[derive(Debug)]
struct Entry<K> {
    key: K,
    seq: u64,
    node: NodeId,
}

impl<K: Ord> Ord for Entry<K> {
    // BinaryHeap pops the greatest entry; invert so the preferred key wins.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<K: Ord> PartialOrd for Entry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> PartialEq for Entry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for Entry<K> {}

#[derive(Debug)]
pub struct OpenSet<K> {
    heap: BinaryHeap<Entry<K>>,
    next_seq: u64,
    g_counts: BTreeMap<Cost, usize>,
}

impl<K: PriorityKey> OpenSet<K> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            g_counts: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, key: K, node: NodeId) {
        *self.g_counts.entry(key.g()).or_insert(0) += 1;
        self.heap.push(Entry {
            key,
            seq: self.next_seq,
            node,
        });
        self.next_seq += 1;
    }

    pub fn pop(&mut self) -> Option<(K, NodeId)> {
        let entry = self.heap.pop()?;
        if let Some(count) = self.g_counts.get_mut(&entry.key.g()) {
            *count -= 1;
            if *count == 0 {
                self.g_counts.remove(&entry.key.g());
            }
        }
        Some((entry.key, entry.node))
    }

    /// Key of the next entry to pop.
    pub fn peek_key(&self) -> Option<K> {
        self.heap.peek().map(|e| e.key)
    }

    /// Smallest `g` among the held entries, stale ones included.
    pub fn min_g(&self) -> Option<Cost> {
        self.g_counts.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<K: PriorityKey> Default for OpenSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
