#![forbid(unsafe_code)]

//! In-memory node tree.
//!
//! [`Document`] is an arena-backed [`NodeTree`] for hosts that do not have
//! a browser DOM underneath them: terminal UIs laying out cards in cells,
//! native widget trees, headless tests and benchmarks.
//!
//! # Node lifetime
//!
//! Detaching a node only unlinks it; the [`NodeId`] stays valid and the
//! node can be inserted again. [`NodeTree::discard`] frees the node and its
//! subtree. Freed slots are reused by later allocations under a new
//! generation, so a stale [`NodeId`] never aliases a newer node: every
//! query on it answers as for an unknown node.
//!
//! # Hit testing
//!
//! [`Document::element_from_point`] descends from the root, at each level
//! picking the *last* child whose rect contains the point (later siblings
//! paint on top). Subtrees marked [`Markers::MIRROR`] are skipped, which is
//! how a tracking clone stays transparent to the pointer. The root always
//! matches, so the result is the root when nothing else is hit.
//!
//! # Failure Modes
//!
//! - **Slot exhaustion**: more than `u32::MAX` simultaneously live nodes.
//!   [`Document::create`] reports [`TreeError::Exhausted`]; the infallible
//!   [`NodeTree::deep_clone`] rolls back and returns its input.

use thiserror::Error;

use crate::geometry::{Direction, Point, Rect};
use crate::tree::{Markers, NodeTree, PlaceNode};

/// Identity of a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot of this node. Slots are reused after a discard.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// How many times the slot had been freed when this node was created.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Errors from the fallible structural API of [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("cannot insert {node:?} into its own subtree at {parent:?}")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("the document root cannot be moved")]
    RootImmovable,

    #[error("no free node slots left")]
    Exhausted,
}

#[derive(Debug, Clone, Default)]
struct NodeData {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Rect,
    markers: Markers,
    text_input: bool,
    content_editable: Option<bool>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only its root.
    #[must_use]
    pub fn new() -> Self {
        let root = NodeData {
            label: "root".to_owned(),
            rect: Rect::new(f64::MIN / 4.0, f64::MIN / 4.0, f64::MAX / 2.0, f64::MAX / 2.0),
            ..NodeData::default()
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                data: Some(root),
            }],
            free: Vec::new(),
            live: 1,
        }
    }

    /// Number of live nodes, attached or not. Discarded nodes do not count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// A document always holds its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of arena slots, free ones included.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Create a detached node.
    pub fn create(&mut self, label: impl Into<String>) -> Result<NodeId, TreeError> {
        self.alloc(NodeData {
            label: label.into(),
            ..NodeData::default()
        })
    }

    /// Create a node with `rect` and append it to `parent`.
    pub fn append(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
        rect: Rect,
    ) -> Result<NodeId, TreeError> {
        self.check(parent)?;
        let id = self.create(label)?;
        self.data_mut(id)?.rect = rect;
        self.try_insert_before(parent, id, None)?;
        Ok(id)
    }

    /// Checked version of [`NodeTree::insert_before`].
    ///
    /// A `reference` that is not a child of `parent` appends.
    pub fn try_insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), TreeError> {
        self.check(parent)?;
        self.check(node)?;
        if let Some(reference) = reference {
            self.check(reference)?;
        }
        if node == self.root() {
            return Err(TreeError::RootImmovable);
        }
        if self.is_inclusive_ancestor(node, parent) {
            return Err(TreeError::Cycle { node, parent });
        }
        if reference == Some(node) {
            return Ok(());
        }

        self.unlink(node);
        let siblings = &mut self.data_mut(parent)?.children;
        let at = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(at, node);
        self.data_mut(node)?.parent = Some(parent);
        Ok(())
    }

    /// Checked version of [`NodeTree::discard`]. Returns how many nodes were
    /// freed.
    pub fn try_discard(&mut self, node: NodeId) -> Result<usize, TreeError> {
        self.check(node)?;
        if node == self.root() {
            return Err(TreeError::RootImmovable);
        }
        self.unlink(node);
        let mut pending = vec![node];
        let mut freed = 0;
        while let Some(current) = pending.pop() {
            let slot = &mut self.slots[current.index()];
            let Some(data) = slot.data.take() else {
                continue;
            };
            pending.extend(data.children);
            freed += 1;
            self.live -= 1;
            // A slot whose generation would wrap is retired instead of reused.
            if let Some(next) = slot.generation.checked_add(1) {
                slot.generation = next;
                self.free.push(current.index);
            }
        }
        Ok(freed)
    }

    /// Human-readable label given at creation.
    pub fn label(&self, node: NodeId) -> Result<&str, TreeError> {
        Ok(&self.data(node)?.label)
    }

    /// Children of `node` as a slice.
    pub fn child_ids(&self, node: NodeId) -> Result<&[NodeId], TreeError> {
        Ok(&self.data(node)?.children)
    }

    /// Set the bounding rect of `node`.
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) -> Result<(), TreeError> {
        self.data_mut(node)?.rect = rect;
        Ok(())
    }

    /// Mark `node` as a text-entry element.
    pub fn set_text_input(&mut self, node: NodeId, text_input: bool) -> Result<(), TreeError> {
        self.data_mut(node)?.text_input = text_input;
        Ok(())
    }

    /// Set or clear (`None`) the content-editable flag of `node`.
    pub fn set_content_editable(
        &mut self,
        node: NodeId,
        editable: Option<bool>,
    ) -> Result<(), TreeError> {
        self.data_mut(node)?.content_editable = editable;
        Ok(())
    }

    /// Whether `node` is live (not discarded, not a foreign id).
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.check(node).is_ok()
    }

    /// Whether `node` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(node) && self.is_inclusive_ancestor(self.root(), node)
    }

    /// Re-stack the children of `container` along `direction`, starting at
    /// the container's origin and keeping each child's size.
    ///
    /// Stands in for the layout pass a browser would run after a move.
    pub fn reflow(&mut self, container: NodeId, direction: Direction) -> Result<(), TreeError> {
        let data = self.data(container)?;
        let origin = data.rect;
        let mut cursor = match direction {
            Direction::Vertical => origin.y,
            Direction::Horizontal => origin.x,
        };
        for child in data.children.clone() {
            let rect = &mut self.data_mut(child)?.rect;
            match direction {
                Direction::Vertical => {
                    *rect = rect.with_origin(origin.x, cursor);
                    cursor += rect.height;
                }
                Direction::Horizontal => {
                    *rect = rect.with_origin(cursor, origin.y);
                    cursor += rect.width;
                }
            }
        }
        Ok(())
    }

    fn alloc(&mut self, data: NodeData) -> Result<NodeId, TreeError> {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.data = Some(data);
                NodeId::new(index, slot.generation)
            }
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| TreeError::Exhausted)?;
                self.slots.push(Slot {
                    generation: 0,
                    data: Some(data),
                });
                NodeId::new(index, 0)
            }
        };
        self.live += 1;
        Ok(id)
    }

    fn get(&self, node: NodeId) -> Option<&NodeData> {
        let slot = self.slots.get(node.index())?;
        if slot.generation == node.generation {
            slot.data.as_ref()
        } else {
            None
        }
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        let slot = self.slots.get_mut(node.index())?;
        if slot.generation == node.generation {
            slot.data.as_mut()
        } else {
            None
        }
    }

    fn data(&self, node: NodeId) -> Result<&NodeData, TreeError> {
        self.get(node).ok_or(TreeError::UnknownNode(node))
    }

    fn data_mut(&mut self, node: NodeId) -> Result<&mut NodeData, TreeError> {
        self.get_mut(node).ok_or(TreeError::UnknownNode(node))
    }

    fn check(&self, node: NodeId) -> Result<(), TreeError> {
        self.data(node).map(|_| ())
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.get(n).and_then(|d| d.parent);
        }
        false
    }

    fn unlink(&mut self, node: NodeId) {
        let Some(parent) = self.get_mut(node).and_then(|d| d.parent.take()) else {
            return;
        };
        if let Some(data) = self.get_mut(parent) {
            data.children.retain(|c| *c != node);
        }
    }

    /// Copy the subtree at `node`. Rolls back on exhaustion.
    fn try_deep_clone(&mut self, node: NodeId) -> Result<NodeId, TreeError> {
        self.check(node)?;
        let mut pending = vec![(node, None::<NodeId>)];
        let mut top = None;
        while let Some((source, parent)) = pending.pop() {
            let data = self.data(source)?;
            let copy = NodeData {
                label: data.label.clone(),
                parent,
                children: Vec::with_capacity(data.children.len()),
                rect: data.rect,
                markers: data.markers,
                text_input: data.text_input,
                content_editable: data.content_editable,
            };
            let source_children = data.children.clone();
            let id = match self.alloc(copy) {
                Ok(id) => id,
                Err(err) => {
                    if let Some(top) = top {
                        self.try_discard(top)?;
                    }
                    return Err(err);
                }
            };
            match parent {
                Some(p) => self.data_mut(p)?.children.push(id),
                None => top = Some(id),
            }
            // Reversed so children pop (and are appended) in document order.
            pending.extend(source_children.into_iter().rev().map(|c| (c, Some(id))));
        }
        top.ok_or(TreeError::UnknownNode(node))
    }
}

impl NodeTree for Document {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        NodeId::new(0, 0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.children.first().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.get(parent)?.children;
        let at = siblings.iter().position(|c| *c == node)?;
        siblings.get(at + 1).copied()
    }

    fn rect(&self, node: NodeId) -> Rect {
        self.get(node).map(|n| n.rect).unwrap_or_default()
    }

    fn element_from_point(&self, point: Point) -> Option<NodeId> {
        let mut current = self.root();
        loop {
            let hit = self.get(current)?.children.iter().rev().copied().find(|c| {
                self.get(*c).is_some_and(|data| {
                    !data.markers.contains(Markers::MIRROR) && data.rect.contains(point)
                })
            });
            match hit {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        let _ = self.try_insert_before(parent, node, reference);
    }

    fn detach(&mut self, node: NodeId) {
        self.unlink(node);
    }

    fn discard(&mut self, node: NodeId) {
        let _ = self.try_discard(node);
    }

    fn deep_clone(&mut self, node: NodeId) -> NodeId {
        self.try_deep_clone(node).unwrap_or(node)
    }

    fn set_markers(&mut self, node: NodeId, markers: Markers, enabled: bool) {
        if let Some(data) = self.get_mut(node) {
            data.markers.set(markers, enabled);
        }
    }

    fn markers(&self, node: NodeId) -> Markers {
        self.get(node).map(|n| n.markers).unwrap_or_default()
    }

    fn is_text_input(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|n| n.text_input)
    }

    fn content_editable(&self, node: NodeId) -> Option<bool> {
        self.get(node)?.content_editable
    }
}

impl PlaceNode for Document {
    fn place(&mut self, node: NodeId, rect: Rect) {
        if let Some(data) = self.get_mut(node) {
            data.rect = rect;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(doc: &mut Document, parent: NodeId, n: usize, y0: f64) -> Vec<NodeId> {
        (0..n)
            .map(|i| {
                doc.append(
                    parent,
                    format!("item{i}"),
                    Rect::new(0.0, y0 + i as f64 * 10.0, 100.0, 10.0),
                )
                .expect("append")
            })
            .collect()
    }

    #[test]
    fn append_and_siblings() {
        let mut doc = Document::new();
        let root = doc.root();
        let c = doc.append(root, "c", Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let items = list(&mut doc, c, 3, 0.0);

        assert_eq!(doc.child_ids(c).unwrap(), items.as_slice());
        assert_eq!(doc.next_sibling(items[0]), Some(items[1]));
        assert_eq!(doc.next_sibling(items[2]), None);
        assert_eq!(doc.parent(items[1]), Some(c));
        assert_eq!(doc.parent(root), None);
        assert_eq!(doc.label(items[2]).unwrap(), "item2");
    }

    #[test]
    fn insert_before_moves_between_parents() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::default()).unwrap();
        let b = doc.append(root, "b", Rect::default()).unwrap();
        let xs = list(&mut doc, a, 2, 0.0);
        let ys = list(&mut doc, b, 2, 0.0);

        doc.insert_before(b, xs[0], Some(ys[1]));
        assert_eq!(doc.child_ids(a).unwrap(), &[xs[1]]);
        assert_eq!(doc.child_ids(b).unwrap(), &[ys[0], xs[0], ys[1]]);
        assert_eq!(doc.parent(xs[0]), Some(b));
    }

    #[test]
    fn foreign_reference_appends() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::default()).unwrap();
        let b = doc.append(root, "b", Rect::default()).unwrap();
        let xs = list(&mut doc, a, 2, 0.0);
        let y = doc.create("y").unwrap();

        doc.insert_before(b, y, Some(xs[1]));
        assert_eq!(doc.child_ids(b).unwrap(), &[y]);
    }

    #[test]
    fn insert_into_own_subtree_is_rejected() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::default()).unwrap();
        let inner = doc.append(a, "inner", Rect::default()).unwrap();

        assert_eq!(
            doc.try_insert_before(inner, a, None),
            Err(TreeError::Cycle {
                node: a,
                parent: inner
            })
        );
        doc.insert_before(inner, a, None);
        assert_eq!(doc.parent(a), Some(root));
        assert_eq!(doc.try_insert_before(a, root, None), Err(TreeError::RootImmovable));
    }

    #[test]
    fn unknown_nodes_are_reported() {
        let mut doc = Document::new();
        let ghost = NodeId::new(99, 0);
        assert_eq!(doc.label(ghost), Err(TreeError::UnknownNode(ghost)));
        assert!(doc.set_rect(ghost, Rect::default()).is_err());
        assert_eq!(doc.parent(ghost), None);
        doc.detach(ghost);
    }

    #[test]
    fn detach_unlinks_subtree() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::default()).unwrap();
        let xs = list(&mut doc, a, 2, 0.0);

        doc.detach(a);
        assert_eq!(doc.parent(a), None);
        assert!(!doc.is_attached(xs[0]));
        assert_eq!(doc.parent(xs[0]), Some(a));
        assert!(doc.child_ids(root).unwrap().is_empty());
    }

    #[test]
    fn deep_clone_copies_subtree_detached() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        let xs = list(&mut doc, a, 3, 0.0);
        doc.set_markers(a, Markers::TRANSIT, true);

        let copy = doc.deep_clone(a);
        assert_ne!(copy, a);
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.rect(copy), Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(doc.markers(copy), Markers::TRANSIT);
        let copied: Vec<_> = doc.children(copy).collect();
        assert_eq!(copied.len(), 3);
        for (original, cloned) in xs.iter().zip(&copied) {
            assert_ne!(original, cloned);
            assert_eq!(doc.label(*original).unwrap(), doc.label(*cloned).unwrap());
        }
        // Original untouched.
        assert_eq!(doc.child_ids(a).unwrap(), xs.as_slice());
    }

    #[test]
    fn hit_test_picks_deepest_topmost() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let xs = list(&mut doc, a, 3, 0.0);
        let overlay = doc.append(a, "overlay", Rect::new(0.0, 0.0, 100.0, 15.0)).unwrap();

        assert_eq!(doc.element_from_point(Point::new(5.0, 5.0)), Some(overlay));
        assert_eq!(doc.element_from_point(Point::new(5.0, 25.0)), Some(xs[2]));
        assert_eq!(doc.element_from_point(Point::new(5.0, 50.0)), Some(a));
        assert_eq!(doc.element_from_point(Point::new(500.0, 500.0)), Some(root));
    }

    #[test]
    fn hit_test_sees_through_mirrors() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let mirror = doc.append(root, "mirror", Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        doc.set_markers(mirror, Markers::MIRROR, true);

        assert_eq!(doc.element_from_point(Point::new(5.0, 5.0)), Some(a));
    }

    #[test]
    fn reflow_restacks_children() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::new(10.0, 50.0, 100.0, 100.0)).unwrap();
        let xs = list(&mut doc, a, 3, 500.0);

        doc.reflow(a, Direction::Vertical).unwrap();
        assert_eq!(doc.rect(xs[0]), Rect::new(10.0, 50.0, 100.0, 10.0));
        assert_eq!(doc.rect(xs[2]), Rect::new(10.0, 70.0, 100.0, 10.0));

        doc.reflow(a, Direction::Horizontal).unwrap();
        assert_eq!(doc.rect(xs[1]), Rect::new(110.0, 50.0, 100.0, 10.0));
    }

    #[test]
    fn text_input_and_editable_flags() {
        let mut doc = Document::new();
        let root = doc.root();
        let field = doc.append(root, "field", Rect::default()).unwrap();
        doc.set_text_input(field, true).unwrap();
        doc.set_content_editable(root, Some(false)).unwrap();

        assert!(doc.is_text_input(field));
        assert_eq!(doc.content_editable(root), Some(false));
        assert_eq!(doc.content_editable(field), None);
    }

    #[test]
    fn place_moves_without_reflow() {
        let mut doc = Document::new();
        let root = doc.root();
        let xs = list(&mut doc, root, 2, 0.0);
        doc.place(xs[0], Rect::new(300.0, 300.0, 100.0, 10.0));
        assert_eq!(doc.rect(xs[0]), Rect::new(300.0, 300.0, 100.0, 10.0));
        assert_eq!(doc.rect(xs[1]), Rect::new(0.0, 10.0, 100.0, 10.0));
    }

    // --- discard ---

    #[test]
    fn discard_frees_whole_subtree() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::default()).unwrap();
        let xs = list(&mut doc, a, 3, 0.0);
        assert_eq!(doc.len(), 5);

        assert_eq!(doc.try_discard(a), Ok(4));
        assert_eq!(doc.len(), 1);
        assert!(doc.child_ids(root).unwrap().is_empty());
        assert!(!doc.contains(a));
        assert_eq!(doc.label(xs[1]), Err(TreeError::UnknownNode(xs[1])));
        assert_eq!(doc.try_discard(a), Err(TreeError::UnknownNode(a)));
        assert_eq!(doc.try_discard(root), Err(TreeError::RootImmovable));
    }

    #[test]
    fn freed_slots_are_reused_under_new_generation() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::default()).unwrap();
        let copy = doc.deep_clone(a);
        doc.discard(copy);

        let again = doc.deep_clone(a);
        assert_eq!(again.index(), copy.index());
        assert_ne!(again, copy);
        assert_eq!(again.generation(), copy.generation() + 1);
        assert_eq!(doc.capacity(), 3);

        // The stale id reads as unknown and writes through it are ignored.
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.markers(copy), Markers::NONE);
        doc.set_markers(copy, Markers::HIDE, true);
        doc.insert_before(root, copy, None);
        assert_eq!(doc.markers(again), Markers::NONE);
        assert_eq!(doc.child_ids(root).unwrap(), &[a]);
    }

    #[test]
    fn clone_discard_cycles_keep_the_arena_flat() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, "a", Rect::default()).unwrap();
        list(&mut doc, a, 4, 0.0);
        let (len, capacity) = (doc.len(), doc.capacity());

        for _ in 0..1_000 {
            let clone = doc.deep_clone(a);
            doc.insert_before(root, clone, None);
            doc.discard(clone);
        }
        assert_eq!(doc.len(), len);
        assert_eq!(doc.capacity(), capacity * 2 - 1);
    }
}
