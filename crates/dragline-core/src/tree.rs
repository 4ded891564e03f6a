#![forbid(unsafe_code)]

//! The live node-graph contract.
//!
//! [`NodeTree`] is everything the drag controller needs from a DOM-like
//! document: topology reads, bounding boxes, hit testing, and the handful of
//! mutations a drag performs (move a node before a sibling, detach it, clone
//! it, toggle a visual marker).
//!
//! # Invariants
//!
//! Implementations must answer every query from the *current* topology. The
//! controller never caches children, siblings, or rectangles between calls,
//! so hosts are free to mutate the graph between pointer samples.
//!
//! Mutations are infallible by contract: a request that cannot be honored
//! (inserting a node into its own subtree, a reference that is not a child
//! of the parent) must degrade to a no-op or an append, never panic.

use std::fmt::Debug;
use std::hash::Hash;

use bitflags::bitflags;

use crate::geometry::{Point, Rect};

bitflags! {
    /// Transient visual markers the controller toggles during a drag.
    ///
    /// Hosts map these onto whatever styling they have (CSS classes,
    /// terminal styles, ...).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Markers: u8 {
        const NONE         = 0b0000;
        /// The subject while it is being relocated.
        const TRANSIT      = 0b0001;
        /// The tracking clone that follows the pointer. Transparent to hit tests.
        const MIRROR       = 0b0010;
        /// A spilled subject that would be removed on release.
        const HIDE         = 0b0100;
        /// The container hosting the tracking clone (no text selection).
        const UNSELECTABLE = 0b1000;
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A mutable, DOM-like tree of nodes identified by `Self::Node`.
pub trait NodeTree {
    /// Node identity. Cheap to copy, compared by identity.
    type Node: Copy + Eq + Hash + Debug;

    /// The document root. It has no parent and is never a drag subject.
    fn root(&self) -> Self::Node;

    /// Parent of `node`, or `None` for the root and detached nodes.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// First child of `node` in document order.
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// The sibling immediately after `node`.
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Bounding box of `node` in client coordinates.
    fn rect(&self, node: Self::Node) -> Rect;

    /// Topmost node under `point`, ignoring nodes marked [`Markers::MIRROR`].
    fn element_from_point(&self, point: Point) -> Option<Self::Node>;

    /// Move `node` into `parent`, before `reference` (append when `None`).
    ///
    /// Detaches `node` from its current parent first.
    fn insert_before(
        &mut self,
        parent: Self::Node,
        node: Self::Node,
        reference: Option<Self::Node>,
    );

    /// Detach `node` (and its subtree) from its parent.
    fn detach(&mut self, node: Self::Node);

    /// Detach `node` and give up its subtree for good.
    ///
    /// Called for tracking clones and abandoned copies once no event can
    /// name them again. Arena-backed trees reclaim the storage here; the
    /// default only detaches.
    fn discard(&mut self, node: Self::Node) {
        self.detach(node);
    }

    /// Deep-copy `node` and its subtree. The copy starts detached.
    fn deep_clone(&mut self, node: Self::Node) -> Self::Node;

    /// Add (`enabled = true`) or remove `markers` on `node`.
    fn set_markers(&mut self, node: Self::Node, markers: Markers, enabled: bool);

    /// Markers currently set on `node`.
    fn markers(&self, node: Self::Node) -> Markers;

    /// Text-entry element (`input`, `textarea`, `select` in a browser).
    fn is_text_input(&self, _node: Self::Node) -> bool {
        false
    }

    /// Explicit content-editable flag; `None` inherits from the parent.
    fn content_editable(&self, _node: Self::Node) -> Option<bool> {
        None
    }

    /// Children of `node` in document order.
    fn children(&self, node: Self::Node) -> Children<'_, Self>
    where
        Self: Sized,
    {
        Children {
            tree: self,
            next: self.first_child(node),
        }
    }
}

/// Positioning without layout, used by tracking clones.
pub trait PlaceNode: NodeTree {
    /// Put `node` at `rect`. Must not reflow siblings.
    fn place(&mut self, node: Self::Node, rect: Rect);
}

/// Iterator over a node's children, see [`NodeTree::children`].
pub struct Children<'a, T: NodeTree> {
    tree: &'a T,
    next: Option<T::Node>,
}

impl<T: NodeTree> Iterator for Children<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Whether `node` accepts text input: a text-entry element, or a node inside
/// a content-editable region that is not switched off closer to `node`.
pub fn is_input<T: NodeTree>(tree: &T, node: T::Node) -> bool {
    if tree.is_text_input(node) {
        return true;
    }
    let mut current = Some(node);
    while let Some(n) = current {
        match tree.content_editable(n) {
            Some(editable) => return editable,
            None => current = tree.parent(n),
        }
    }
    false
}
