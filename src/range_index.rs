//! Interval index over inclusive IPv4 ranges
//!
//! A binary search tree keyed by range start, where every node also records
//! `max_end`, the largest range end anywhere in its subtree. A point query
//! skips any subtree whose `max_end` is below the point, since no range in it
//! can reach that far.
//!
//! ```text
//!               [10, 20] max 40
//!              /               \
//!     [5, 8] max 8        [15, 40] max 40
//! ```
//!
//! Searching for 30 never enters the left subtree (`8 < 30`).
//!
//! The tree is not rebalanced. Inserting ranges in sorted order of start
//! degrades it to a list and queries to O(n); insertion, search, and drop
//! are all iterative so depth is bounded only by memory.

use crate::addr::Range;
use std::fmt;
use std::ops::ControlFlow;
use tracing::trace;

type Link<V> = Option<Box<Node<V>>>;

struct Node<V> {
    range: Range,
    value: V,
    /// Largest `range.end()` in this node's subtree, itself included
    max_end: u32,
    left: Link<V>,
    right: Link<V>,
}

impl<V> Node<V> {
    fn new(range: Range, value: V) -> Self {
        Self {
            range,
            value,
            max_end: range.end(),
            left: None,
            right: None,
        }
    }
}

/// Child worth descending into for `point`, if any
#[inline]
fn candidate<V>(link: &Link<V>, point: u32) -> Option<&Node<V>> {
    link.as_deref().filter(|node| node.max_end >= point)
}

/// Augmented interval tree mapping ranges to values
///
/// Overlapping and duplicate ranges are allowed and kept as separate entries.
/// When several ranges contain a query point, [`search`](Self::search)
/// returns whichever one the in-order traversal reaches first; no
/// "most specific range" rule is applied.
pub struct RangeIndex<V> {
    root: Link<V>,
    len: usize,
}

impl<V> RangeIndex<V> {
    /// Create an empty index
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Add a range with its value
    ///
    /// Descends left when the new start is strictly smaller than the node's
    /// start and right otherwise, so equal starts go right.
    pub fn insert(&mut self, range: Range, value: V) {
        let mut link = &mut self.root;
        let mut depth = 0usize;

        while let Some(node) = link {
            // Every node on the path gains the new range in its subtree
            node.max_end = node.max_end.max(range.end());
            link = if range.start() < node.range.start() {
                &mut node.left
            } else {
                &mut node.right
            };
            depth += 1;
        }

        *link = Some(Box::new(Node::new(range, value)));
        self.len += 1;
        trace!(%range, depth, "range inserted");
    }

    /// Value of the first range containing `point`
    pub fn search(&self, point: u32) -> Option<&V> {
        self.search_entry(point).map(|(_, value)| value)
    }

    /// First range containing `point`, with its value
    pub fn search_entry(&self, point: u32) -> Option<(Range, &V)> {
        let mut found = None;
        self.visit_containing(point, |node| {
            found = Some((node.range, &node.value));
            ControlFlow::Break(())
        });
        found
    }

    /// Every range containing `point`, in traversal order
    ///
    /// The first element, if any, is the one [`search_entry`](Self::search_entry)
    /// returns.
    pub fn search_all(&self, point: u32) -> Vec<(Range, &V)> {
        let mut found = Vec::new();
        self.visit_containing(point, |node| {
            found.push((node.range, &node.value));
            ControlFlow::Continue(())
        });
        found
    }

    /// In-order walk over the nodes whose range contains `point`
    ///
    /// Left subtree first, then the node, then the right subtree. Subtrees
    /// with `max_end < point` are skipped, and so is everything after the
    /// first node that starts beyond `point`.
    fn visit_containing<'a, F>(&'a self, point: u32, mut on_hit: F)
    where
        F: FnMut(&'a Node<V>) -> ControlFlow<()>,
    {
        let mut stack: Vec<&'a Node<V>> = Vec::new();
        let mut cursor = candidate(&self.root, point);

        loop {
            while let Some(node) = cursor {
                stack.push(node);
                cursor = candidate(&node.left, point);
            }

            let Some(node) = stack.pop() else {
                return;
            };

            if node.range.contains(point) && on_hit(node).is_break() {
                return;
            }

            if point < node.range.start() {
                // Pending nodes and right subtrees all start later still
                return;
            }

            cursor = candidate(&node.right, point);
        }
    }

    /// Number of ranges stored
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no ranges
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty)
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(&Node<V>, usize)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            for child in [node.left.as_deref(), node.right.as_deref()]
                .into_iter()
                .flatten()
            {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    /// Iterate over `(range, value)` pairs ordered by range start
    pub fn iter(&self) -> Iter<'_, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self.root.as_deref());
        iter
    }
}

impl<V> Default for RangeIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for RangeIndex<V> {
    fn drop(&mut self) {
        // Unlink children first so a degenerate tree is not dropped recursively
        let mut pending: Vec<Box<Node<V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

impl<V> fmt::Debug for RangeIndex<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeIndex")
            .field("len", &self.len)
            .field("height", &self.height())
            .finish()
    }
}

/// In-order iterator over a [`RangeIndex`]
pub struct Iter<'a, V> {
    stack: Vec<&'a Node<V>>,
}

impl<'a, V> Iter<'a, V> {
    fn push_left_spine(&mut self, mut node: Option<&'a Node<V>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Range, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some((node.range, &node.value))
    }
}
