//! Explicit stack for the iterative tree descent.

use crate::{BspError, NodeId, Real, Result};

/// Capacity of a [`TraversalStack`]. Tree depth must stay below it.
pub const TRAVERSAL_STACK_CAPACITY: usize = 50;

/// A deferred subtree together with the ray interval that crosses it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackEntry {
    /// Node to resume at; `None` marks the bottom of the stack.
    pub node: Option<NodeId>,
    /// Distance at which the ray enters the node.
    pub min_distance: Real,
    /// Distance at which the ray leaves the node.
    pub max_distance: Real,
}

impl StackEntry {
    /// Bottom-of-stack marker.
    pub const SENTINEL: StackEntry = StackEntry {
        node: None,
        min_distance: 0.0,
        max_distance: 0.0,
    };

    /// Creates an entry for `node` over `[min_distance, max_distance]`.
    pub fn new(node: NodeId, min_distance: Real, max_distance: Real) -> Self {
        Self {
            node: Some(node),
            min_distance,
            max_distance,
        }
    }
}

/// Fixed-capacity stack of pending subtrees.
///
/// Lives on the caller's stack frame; every concurrent query needs its own.
/// A traversal resets it on entry, so one instance can be reused for any
/// number of sequential queries.
#[derive(Debug, Clone)]
pub struct TraversalStack {
    entries: [StackEntry; TRAVERSAL_STACK_CAPACITY],
    len: usize,
}

impl TraversalStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self {
            entries: [StackEntry::SENTINEL; TRAVERSAL_STACK_CAPACITY],
            len: 0,
        }
    }

    /// Empties the stack and pushes the bottom-of-stack marker.
    pub fn reset(&mut self) {
        self.entries[0] = StackEntry::SENTINEL;
        self.len = 1;
    }

    /// Pushes an entry, failing if the stack is full.
    pub fn push(&mut self, entry: StackEntry) -> Result<()> {
        let slot = self
            .entries
            .get_mut(self.len)
            .ok_or(BspError::StackOverflow {
                capacity: TRAVERSAL_STACK_CAPACITY,
            })?;
        *slot = entry;
        self.len += 1;
        Ok(())
    }

    /// Pops the top entry.
    pub fn pop(&mut self) -> Option<StackEntry> {
        self.len = self.len.checked_sub(1)?;
        Some(self.entries[self.len])
    }

    /// Number of entries, including the bottom marker.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing (not even the marker) is on the stack.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        TRAVERSAL_STACK_CAPACITY
    }
}

impl Default for TraversalStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_leaves_sentinel() {
        let mut stack = TraversalStack::new();
        assert!(stack.is_empty());

        stack.reset();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.pop(), Some(StackEntry::SENTINEL));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn lifo_order() {
        let mut stack = TraversalStack::new();
        stack.reset();
        stack.push(StackEntry::new(NodeId::new(1), 0.0, 1.0)).unwrap();
        stack.push(StackEntry::new(NodeId::new(2), 1.0, 2.0)).unwrap();

        assert_eq!(stack.pop().unwrap().node, Some(NodeId::new(2)));
        let entry = stack.pop().unwrap();
        assert_eq!(entry.node, Some(NodeId::new(1)));
        assert_eq!(entry.max_distance, 1.0);
        assert_eq!(stack.pop().unwrap().node, None);
    }

    #[test]
    fn overflow_is_reported() {
        let mut stack = TraversalStack::new();
        stack.reset();
        for i in 1..stack.capacity() {
            stack.push(StackEntry::new(NodeId::new(i), 0.0, 1.0)).unwrap();
        }
        assert_eq!(stack.len(), TRAVERSAL_STACK_CAPACITY);

        let err = stack
            .push(StackEntry::new(NodeId::new(99), 0.0, 1.0))
            .unwrap_err();
        assert_eq!(
            err,
            BspError::StackOverflow {
                capacity: TRAVERSAL_STACK_CAPACITY
            }
        );
    }
}
