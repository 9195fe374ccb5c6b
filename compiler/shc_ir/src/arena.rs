//! Paged node arena.
//!
//! Nodes live in fixed-capacity pages. A page is allocated with its full
//! capacity up front and never grows past it, so a node never moves once
//! allocated. Handles are flat indices: page = index / capacity.

use crate::ast::Node;
use std::fmt;

/// Nodes per page.
pub const PAGE_CAPACITY: usize = 512;

/// Handle to a node in a [`NodeArena`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

/// Range into the arena's flattened child-list storage.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct NodeRange {
    pub start: u32,
    pub len: u32,
}

impl NodeRange {
    pub const EMPTY: NodeRange = NodeRange { start: 0, len: 0 };

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for NodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRange({}..{})", self.start, self.start + self.len)
    }
}

/// Owns every node of one compilation unit.
///
/// Cloning produces an independent copy with identical handles, which is
/// how the optimizer builds a per-stage view.
#[derive(Clone, Default)]
pub struct NodeArena {
    pages: Vec<Vec<Node>>,
    len: u32,
    lists: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena::default()
    }

    /// Allocate a node, opening a new page when the current one is full.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let needs_page = self
            .pages
            .last()
            .map_or(true, |page| page.len() == PAGE_CAPACITY);
        if needs_page {
            self.pages.push(Vec::with_capacity(PAGE_CAPACITY));
        }
        let id = NodeId(self.len);
        if let Some(page) = self.pages.last_mut() {
            page.push(node);
        }
        self.len += 1;
        id
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        let index = id.index();
        &self.pages[index / PAGE_CAPACITY][index % PAGE_CAPACITY]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        let index = id.index();
        &mut self.pages[index / PAGE_CAPACITY][index % PAGE_CAPACITY]
    }

    /// Store a child list and return its range.
    pub fn alloc_list(&mut self, ids: impl IntoIterator<Item = NodeId>) -> NodeRange {
        let start = self.lists.len();
        self.lists.extend(ids);
        let len = self.lists.len() - start;
        NodeRange {
            start: u32::try_from(start).unwrap_or(u32::MAX),
            len: u32::try_from(len).unwrap_or(u32::MAX),
        }
    }

    pub fn list(&self, range: NodeRange) -> &[NodeId] {
        let start = range.start as usize;
        &self.lists[start..start + range.len()]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl fmt::Debug for NodeArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeArena")
            .field("nodes", &self.len)
            .field("pages", &self.pages.len())
            .field("list_entries", &self.lists.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Literal, NodeKind};
    use crate::{Span, TypeId};

    fn literal(value: i32) -> Node {
        Node::new(NodeKind::Literal(Literal::Int(value)), Span::DUMMY, 1).with_type(TypeId::INT)
    }

    #[test]
    fn test_alloc_opens_new_pages() {
        let mut arena = NodeArena::new();
        let count = PAGE_CAPACITY * 2 + 3;
        let ids: Vec<NodeId> = (0..count)
            .map(|i| arena.alloc(literal(i32::try_from(i).unwrap_or(0))))
            .collect();
        assert_eq!(arena.page_count(), 3);
        assert_eq!(arena.len(), count);
        assert_eq!(
            arena.get(ids[PAGE_CAPACITY + 1]).kind,
            NodeKind::Literal(Literal::Int(i32::try_from(PAGE_CAPACITY + 1).unwrap_or(0)))
        );
    }

    #[test]
    fn test_node_address_stable_across_pages() {
        let mut arena = NodeArena::new();
        let first = arena.alloc(literal(7));
        let before: *const Node = arena.get(first);
        for i in 0..PAGE_CAPACITY * 3 {
            arena.alloc(literal(i32::try_from(i).unwrap_or(0)));
        }
        let after: *const Node = arena.get(first);
        assert_eq!(before, after);
    }

    #[test]
    fn test_lists() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(literal(1));
        let b = arena.alloc(literal(2));
        let range = arena.alloc_list([a, b]);
        assert_eq!(arena.list(range), &[a, b]);
        assert!(arena.list(NodeRange::EMPTY).is_empty());
    }
}
