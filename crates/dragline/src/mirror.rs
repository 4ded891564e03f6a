#![forbid(unsafe_code)]

//! Tracking clone: the visual that follows the pointer during a drag.
//!
//! The controller treats the provider as an opaque capability. It asks for
//! a clone when a pointer drag is confirmed, moves it on every sample, asks
//! what lies behind it, and destroys it on cleanup. The controller emits the
//! `cloned` (mirror) event itself, right after [`MirrorProvider::create`]
//! returns.
//!
//! # Invariants
//!
//! 1. `move_to` positions only. It must not reorder or resize anything else.
//! 2. `element_behind_pointer` never returns the tracking clone or a node
//!    inside it.

use dragline_core::geometry::{Point, Rect};
use dragline_core::tree::{Markers, NodeTree, PlaceNode};

/// Produces, positions, and destroys the tracking clone.
pub trait MirrorProvider<T: NodeTree> {
    /// Whatever the provider needs to find its clone again.
    type Handle;

    /// Create a tracking clone of `item`. Returns the handle and the node
    /// reported in the `cloned` event.
    fn create(&mut self, tree: &mut T, item: T::Node) -> (Self::Handle, T::Node);

    /// Put the clone's top-left corner at `(x, y)`.
    fn move_to(&mut self, tree: &mut T, handle: &Self::Handle, x: f64, y: f64);

    /// Node under `point`, seeing through the clone.
    fn element_behind_pointer(
        &self,
        tree: &T,
        _handle: Option<&Self::Handle>,
        point: Point,
    ) -> Option<T::Node> {
        tree.element_from_point(point)
    }

    /// Remove the clone. The handle's nodes are not used again.
    fn destroy(&mut self, tree: &mut T, handle: Self::Handle);
}

/// Default provider: a deep clone of the subject placed inside the tree.
///
/// The clone is appended to the mirror container (the tree root unless set)
/// with [`Markers::MIRROR`], which makes it transparent to hit tests. The
/// container is marked [`Markers::UNSELECTABLE`] while the clone lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneMirror<N> {
    container: Option<N>,
}

impl<N> Default for CloneMirror<N> {
    fn default() -> Self {
        Self { container: None }
    }
}

impl<N: Copy> CloneMirror<N> {
    /// Clones go under the tree root.
    #[must_use]
    pub const fn new() -> Self {
        Self { container: None }
    }

    /// Clones go under `container`.
    #[must_use]
    pub const fn in_container(container: N) -> Self {
        Self {
            container: Some(container),
        }
    }

    /// The configured mirror container, if any.
    #[must_use]
    pub const fn container(&self) -> Option<N> {
        self.container
    }

    fn host<T: NodeTree<Node = N>>(&self, tree: &T) -> N {
        self.container.unwrap_or_else(|| tree.root())
    }
}

/// Handle to a [`CloneMirror`] clone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorHandle<N> {
    /// The clone node.
    pub node: N,
    /// The container it was appended to.
    pub host: N,
    size: (f64, f64),
}

impl<T: PlaceNode> MirrorProvider<T> for CloneMirror<T::Node> {
    type Handle = MirrorHandle<T::Node>;

    fn create(&mut self, tree: &mut T, item: T::Node) -> (Self::Handle, T::Node) {
        let rect = tree.rect(item);
        let host = self.host(tree);
        let mirror = tree.deep_clone(item);
        tree.set_markers(mirror, Markers::TRANSIT, false);
        tree.set_markers(mirror, Markers::MIRROR, true);
        tree.insert_before(host, mirror, None);
        tree.set_markers(host, Markers::UNSELECTABLE, true);
        tree.place(mirror, rect);
        let handle = MirrorHandle {
            node: mirror,
            host,
            size: (rect.width, rect.height),
        };
        (handle, mirror)
    }

    fn move_to(&mut self, tree: &mut T, handle: &Self::Handle, x: f64, y: f64) {
        let (width, height) = handle.size;
        tree.place(handle.node, Rect::new(x, y, width, height));
    }

    fn destroy(&mut self, tree: &mut T, handle: Self::Handle) {
        tree.set_markers(handle.host, Markers::UNSELECTABLE, false);
        tree.discard(handle.node);
    }
}
