//! Search frontier: a binary min-heap with stable handles.
//!
//! `std::collections::BinaryHeap` cannot decrease a key in place, so the
//! heap is hand-rolled with an arena-indexed slot table recording where in
//! the heap each enqueued node currently sits. That gives O(1) `contains`
//! and O(log n) `decrease_key` without an auxiliary lookup map.
//!
//! Tie-break rule: entries with equal keys pop in insertion order
//! (first-inserted wins). Each entry carries a monotonic sequence number
//! that survives `decrease_key`, so re-keying a node does not reshuffle it
//! past equal-cost peers. This is the documented determinism contract.

use crate::path::node::NodeIndex;

#[derive(Clone, Copy, Debug)]
struct Entry {
    key: u32,
    seq: u64,
    node: NodeIndex,
}

impl Entry {
    fn rank(&self) -> (u32, u64) {
        (self.key, self.seq)
    }
}

/// Priority frontier over node-arena indices, keyed by accumulated cost.
pub(crate) struct OpenSet {
    heap: Vec<Entry>,
    /// node index -> position in `heap`, `None` while not enqueued.
    slots: Vec<Option<usize>>,
    next_seq: u64,
}

impl OpenSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: Vec::new(),
            slots: vec![None; capacity],
            next_seq: 0,
        }
    }

    /// Empties the frontier and resizes the slot table to the arena size.
    pub fn clear(&mut self, capacity: usize) {
        self.heap.clear();
        self.slots.clear();
        self.slots.resize(capacity, None);
        self.next_seq = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.slots.get(node).is_some_and(|slot| slot.is_some())
    }

    /// Enqueues a node. Pushing a node that is already present is a
    /// programming error; release builds ignore the call rather than
    /// corrupt the slot table.
    pub fn push(&mut self, node: NodeIndex, key: u32) {
        debug_assert!(!self.contains(node), "node {node} already enqueued");
        if self.contains(node) {
            return;
        }
        let entry = Entry {
            key,
            seq: self.next_seq,
            node,
        };
        self.next_seq += 1;
        let at = self.heap.len();
        self.heap.push(entry);
        self.slots[node] = Some(at);
        self.sift_up(at);
    }

    /// Removes and returns the node with the smallest key, oldest first on
    /// ties.
    pub fn pop_min(&mut self) -> Option<(NodeIndex, u32)> {
        let last = self.heap.len().checked_sub(1)?;
        self.heap.swap(0, last);
        let entry = self.heap.pop()?;
        self.slots[entry.node] = None;
        if !self.heap.is_empty() {
            self.slots[self.heap[0].node] = Some(0);
            self.sift_down(0);
        }
        Some((entry.node, entry.key))
    }

    /// Lowers the key of an enqueued node. Calling this for an absent node
    /// or with a larger key is a programming error; release builds ignore
    /// the call.
    pub fn decrease_key(&mut self, node: NodeIndex, key: u32) {
        let Some(Some(at)) = self.slots.get(node).copied() else {
            debug_assert!(false, "decrease_key on absent node {node}");
            return;
        };
        debug_assert!(
            key <= self.heap[at].key,
            "decrease_key must not raise the key"
        );
        if key > self.heap[at].key {
            return;
        }
        self.heap[at].key = key;
        self.sift_up(at);
    }

    fn sift_up(&mut self, mut at: usize) {
        while at > 0 {
            let parent = (at - 1) / 2;
            if self.heap[at].rank() >= self.heap[parent].rank() {
                break;
            }
            self.swap(at, parent);
            at = parent;
        }
    }

    fn sift_down(&mut self, mut at: usize) {
        loop {
            let left = 2 * at + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let mut smallest = left;
            if right < self.heap.len() && self.heap[right].rank() < self.heap[left].rank() {
                smallest = right;
            }
            if self.heap[at].rank() <= self.heap[smallest].rank() {
                break;
            }
            self.swap(at, smallest);
            at = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots[self.heap[a].node] = Some(a);
        self.slots[self.heap[b].node] = Some(b);
    }
}
