//! A Fibonacci heap with decrease-key handles.
//!
//! This is the priority frontier behind the best-first engines: insert and
//! decrease-key run in amortised constant time, extract-min in amortised
//! logarithmic time. Entries live in an index arena rather than in
//! separately allocated nodes; a [`Handle`] names an arena slot plus a
//! generation stamp, so handles stay valid across tree restructurings and
//! become detectably stale once their entry is extracted.

use crate::errors::{Result, SearchError};

const NONE: usize = usize::MAX;

// ln((1 + sqrt 5) / 2), used to bound the consolidation array.
const LN_PHI: f64 = 0.481_211_825_059_603_45;

/// A stable reference to an entry in a [`FibonacciHeap`].
///
/// A handle keeps referring to the same entry while the entry is in the
/// heap. Once the entry has been extracted the handle is stale, and passing
/// it to [`FibonacciHeap::decrease_key`] fails without touching the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle {
    slot: usize,
    stamp: u64,
}

#[derive(Debug)]
struct Slot<T> {
    key: f64,
    value: Option<T>,
    parent: usize,
    child: usize,
    left: usize,
    right: usize,
    degree: u32,
    marked: bool,
    stamp: u64,
    live: bool,
}

/// A min-ordered collection of heap-ordered trees.
#[derive(Debug)]
pub struct FibonacciHeap<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    min: usize,
    len: usize,
}

impl<T> Default for FibonacciHeap<T> {
    fn default() -> Self {
        FibonacciHeap::new()
    }
}

impl<T> FibonacciHeap<T> {
    pub fn new() -> Self {
        FibonacciHeap {
            slots: Vec::new(),
            free: Vec::new(),
            min: NONE,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The smallest key currently in the heap.
    pub fn min_key(&self) -> Option<f64> {
        if self.min == NONE {
            None
        } else {
            Some(self.slots[self.min].key)
        }
    }

    /// Inserts a value with the given key and returns a handle to the new
    /// entry. Keys may be infinite, but never NaN.
    pub fn insert(&mut self, key: f64, value: T) -> Result<Handle> {
        if key.is_nan() {
            return Err(SearchError::NanKey);
        }
        let slot = self.alloc(key, value);
        if self.min == NONE {
            self.min = slot;
        } else {
            self.ring_insert(self.min, slot);
            if key < self.slots[self.min].key {
                self.min = slot;
            }
        }
        self.len += 1;
        Ok(Handle {
            slot,
            stamp: self.slots[slot].stamp,
        })
    }

    /// Removes the entry with the smallest key and returns its key and
    /// value, or `None` when the heap is empty. Ties are broken
    /// arbitrarily. The handle returned for the entry at insertion time
    /// becomes stale.
    pub fn extract_min(&mut self) -> Option<(f64, T)> {
        if self.min == NONE {
            return None;
        }
        let z = self.min;

        // Promote the children of the minimum into the root list.
        let first = self.slots[z].child;
        if first != NONE {
            let mut children = Vec::with_capacity(self.slots[z].degree as usize);
            let mut c = first;
            loop {
                children.push(c);
                c = self.slots[c].right;
                if c == first {
                    break;
                }
            }
            for c in children {
                self.ring_remove(c);
                self.slots[c].parent = NONE;
                self.slots[c].marked = false;
                self.ring_insert(z, c);
            }
            self.slots[z].child = NONE;
            self.slots[z].degree = 0;
        }

        let right = self.slots[z].right;
        self.ring_remove(z);
        if right == z {
            self.min = NONE;
        } else {
            self.min = right;
            self.consolidate();
        }

        self.len -= 1;
        let key = self.slots[z].key;
        let value = self.slots[z].value.take().expect("live slot holds a value");
        self.release(z);
        Some((key, value))
    }

    /// Lowers the key of a live entry.
    ///
    /// Fails with [`SearchError::StaleHandle`] when the handle's entry has
    /// been extracted (or the handle belongs to a recycled slot), and with
    /// [`SearchError::KeyIncrease`] when the new key is greater than the
    /// current one. Neither failure corrupts the heap.
    pub fn decrease_key(&mut self, handle: &Handle, key: f64) -> Result<()> {
        if key.is_nan() {
            return Err(SearchError::NanKey);
        }
        let slot = handle.slot;
        if slot >= self.slots.len()
            || !self.slots[slot].live
            || self.slots[slot].stamp != handle.stamp
        {
            return Err(SearchError::StaleHandle);
        }
        let current = self.slots[slot].key;
        if key > current {
            return Err(SearchError::KeyIncrease {
                current,
                requested: key,
            });
        }
        self.slots[slot].key = key;
        let parent = self.slots[slot].parent;
        if parent != NONE && key < self.slots[parent].key {
            self.cut(slot, parent);
            self.cascading_cut(parent);
        }
        if key < self.slots[self.min].key {
            self.min = slot;
        }
        Ok(())
    }

    fn alloc(&mut self, key: f64, value: T) -> usize {
        match self.free.pop() {
            Some(slot) => {
                let s = &mut self.slots[slot];
                s.key = key;
                s.value = Some(value);
                s.parent = NONE;
                s.child = NONE;
                s.left = slot;
                s.right = slot;
                s.degree = 0;
                s.marked = false;
                s.live = true;
                slot
            }
            None => {
                let slot = self.slots.len();
                self.slots.push(Slot {
                    key,
                    value: Some(value),
                    parent: NONE,
                    child: NONE,
                    left: slot,
                    right: slot,
                    degree: 0,
                    marked: false,
                    stamp: 0,
                    live: true,
                });
                slot
            }
        }
    }

    fn release(&mut self, slot: usize) {
        let s = &mut self.slots[slot];
        s.live = false;
        s.stamp = s.stamp.wrapping_add(1);
        s.parent = NONE;
        s.child = NONE;
        self.free.push(slot);
    }

    // Inserts `node` (a singleton ring) to the right of `anchor`.
    fn ring_insert(&mut self, anchor: usize, node: usize) {
        let next = self.slots[anchor].right;
        self.slots[node].left = anchor;
        self.slots[node].right = next;
        self.slots[anchor].right = node;
        self.slots[next].left = node;
    }

    // Unlinks `node` from its ring, leaving it a singleton.
    fn ring_remove(&mut self, node: usize) {
        let left = self.slots[node].left;
        let right = self.slots[node].right;
        self.slots[left].right = right;
        self.slots[right].left = left;
        self.slots[node].left = node;
        self.slots[node].right = node;
    }

    // Merges roots of equal degree until all root degrees are distinct,
    // then rebuilds the root list and the minimum pointer.
    fn consolidate(&mut self) {
        let mut roots = Vec::new();
        let start = self.min;
        let mut w = start;
        loop {
            roots.push(w);
            w = self.slots[w].right;
            if w == start {
                break;
            }
        }

        let bound = ((self.len.max(1) as f64).ln() / LN_PHI) as usize + 2;
        let mut by_degree: Vec<usize> = vec![NONE; bound];
        for root in roots {
            self.ring_remove(root);
            let mut x = root;
            let mut d = self.slots[x].degree as usize;
            loop {
                while d >= by_degree.len() {
                    by_degree.push(NONE);
                }
                let y = by_degree[d];
                if y == NONE {
                    break;
                }
                let (child, parent) = if self.slots[y].key < self.slots[x].key {
                    (x, y)
                } else {
                    (y, x)
                };
                self.link(child, parent);
                x = parent;
                by_degree[d] = NONE;
                d += 1;
            }
            by_degree[d] = x;
        }

        self.min = NONE;
        for x in by_degree {
            if x == NONE {
                continue;
            }
            if self.min == NONE {
                self.min = x;
            } else {
                self.ring_insert(self.min, x);
                if self.slots[x].key < self.slots[self.min].key {
                    self.min = x;
                }
            }
        }
    }

    // Makes `child` (a singleton root) a child of `parent`.
    fn link(&mut self, child: usize, parent: usize) {
        self.slots[child].parent = parent;
        self.slots[child].marked = false;
        let first = self.slots[parent].child;
        if first == NONE {
            self.slots[parent].child = child;
        } else {
            self.ring_insert(first, child);
        }
        self.slots[parent].degree += 1;
    }

    // Moves `node` out of `parent`'s child list into the root list.
    fn cut(&mut self, node: usize, parent: usize) {
        if self.slots[parent].child == node {
            let next = self.slots[node].right;
            self.slots[parent].child = if next == node { NONE } else { next };
        }
        self.ring_remove(node);
        self.slots[parent].degree -= 1;
        self.slots[node].parent = NONE;
        self.slots[node].marked = false;
        self.ring_insert(self.min, node);
    }

    fn cascading_cut(&mut self, mut node: usize) {
        loop {
            let parent = self.slots[node].parent;
            if parent == NONE {
                break;
            }
            if !self.slots[node].marked {
                self.slots[node].marked = true;
                break;
            }
            self.cut(node, parent);
            node = parent;
        }
    }
}
