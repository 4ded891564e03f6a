#![forbid(unsafe_code)]

//! Geometry resolver: where would the subject land?
//!
//! Pure functions over a live [`NodeTree`]. They hold no state and re-read
//! topology and rectangles on every call, so hosts may mutate the tree
//! between samples.
//!
//! # Invariants
//!
//! 1. The drop-target walk stops at the **nearest** container ancestor. A
//!    rejected nearest container means "no target"; outer containers are
//!    never tried.
//! 2. A reference, when present, is a child of the resolved container.
//! 3. `reference(..) == None` means "append at the end".

use dragline_core::geometry::{Direction, Point};
use dragline_core::tree::NodeTree;

/// Resolved landing spot for one pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget<N> {
    /// The accepting container.
    pub container: N,
    /// Child of `container` under the pointer (or `container` itself when
    /// the pointer is over its background).
    pub immediate: Option<N>,
    /// Node to insert before; `None` appends.
    pub reference: Option<N>,
}

/// Walk up from `target` to the node whose parent is `container`.
///
/// Returns `container` itself when `target` is the container, and `None`
/// when the walk leaves the tree or ends at the root.
pub fn immediate_child<T: NodeTree>(
    tree: &T,
    container: T::Node,
    target: T::Node,
) -> Option<T::Node> {
    let mut immediate = target;
    while immediate != container && tree.parent(immediate) != Some(container) {
        immediate = tree.parent(immediate)?;
    }
    if immediate == tree.root() {
        return None;
    }
    Some(immediate)
}

/// Insertion reference inside `container` for a pointer at `point`.
///
/// With an `immediate` child under the pointer, compares against that
/// child's midpoint: past it yields the child's next sibling, otherwise the
/// child. Over the container background, yields the first child whose
/// midpoint lies past the pointer, or `None`.
pub fn reference<T: NodeTree>(
    tree: &T,
    container: T::Node,
    immediate: Option<T::Node>,
    point: Point,
    direction: Direction,
) -> Option<T::Node> {
    let at = point.along(direction);
    match immediate {
        Some(child) if child != container => {
            if at > tree.rect(child).midpoint(direction) {
                tree.next_sibling(child)
            } else {
                Some(child)
            }
        }
        _ => tree
            .children(container)
            .find(|child| tree.rect(*child).midpoint(direction) > at),
    }
}

/// First inclusive ancestor of `from` that satisfies `is_container`.
pub fn nearest_container<T: NodeTree>(
    tree: &T,
    from: T::Node,
    mut is_container: impl FnMut(T::Node) -> bool,
) -> Option<T::Node> {
    let mut current = Some(from);
    while let Some(node) = current {
        if is_container(node) {
            return Some(node);
        }
        current = tree.parent(node);
    }
    None
}

/// Resolve the drop target for the node `behind` the pointer.
///
/// `accepted(container, reference)` has the final say on the nearest
/// container; see the module invariants.
pub fn resolve_drop_target<T: NodeTree>(
    tree: &T,
    behind: Option<T::Node>,
    point: Point,
    direction: Direction,
    is_container: impl FnMut(T::Node) -> bool,
    mut accepted: impl FnMut(T::Node, Option<T::Node>) -> bool,
) -> Option<DropTarget<T::Node>> {
    let container = nearest_container(tree, behind?, is_container)?;
    let immediate = behind.and_then(|b| immediate_child(tree, container, b));
    let reference = reference(tree, container, immediate, point, direction);
    accepted(container, reference).then_some(DropTarget {
        container,
        immediate,
        reference,
    })
}
