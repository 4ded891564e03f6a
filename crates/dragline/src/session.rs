#![forbid(unsafe_code)]

//! Drag session state.
//!
//! # State Machine
//!
//! ```text
//!            down (legal grab)          move past threshold
//!   ┌──────┐ ──────────────────▶ ┌─────────┐ ──────────────▶ ┌──────────┐
//!   │ Idle │                     │ Grabbed │                 │ Dragging │
//!   └──────┘ ◀────────────────── └─────────┘                 └──────────┘
//!      ▲        up / cancel / empty buttons                        │
//!      └──────────────── drop / cancel / remove ───────────────────┘
//! ```
//!
//! A [`GrabContext`] exists only in `Grabbed`. A [`Session`] exists only in
//! `Dragging`, and at most one exists per controller.

use bitflags::bitflags;

/// A pending grab: the top-level draggable and its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrabContext<N> {
    /// Top-level draggable ancestor of the pressed node.
    pub item: N,
    /// Container holding `item`.
    pub source: N,
}

/// The one in-progress drag of a controller.
///
/// `H` is the tracking-clone handle of the mirror provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Session<N, H> {
    pub(crate) item: N,
    pub(crate) source: N,
    pub(crate) copy: Option<N>,
    pub(crate) initial_sibling: Option<N>,
    pub(crate) current_sibling: Option<N>,
    pub(crate) offset_x: f64,
    pub(crate) offset_y: f64,
    pub(crate) last_drop_target: Option<N>,
    pub(crate) mirror: Option<(H, N)>,
}

impl<N: Copy, H> Session<N, H> {
    pub(crate) fn new(item: N, source: N, copy: Option<N>, sibling: Option<N>) -> Self {
        Self {
            item,
            source,
            copy,
            initial_sibling: sibling,
            current_sibling: sibling,
            offset_x: 0.0,
            offset_y: 0.0,
            last_drop_target: None,
            mirror: None,
        }
    }

    /// The node being relocated: the copy if there is one, else the item.
    #[must_use]
    pub fn subject(&self) -> N {
        self.copy.unwrap_or(self.item)
    }

    /// The grabbed original.
    #[must_use]
    pub fn item(&self) -> N {
        self.item
    }

    /// Container the item was grabbed from.
    #[must_use]
    pub fn source(&self) -> N {
        self.source
    }

    /// The copy being dragged, with copy semantics.
    #[must_use]
    pub fn copy(&self) -> Option<N> {
        self.copy
    }

    /// Next sibling of the item when the drag started.
    #[must_use]
    pub fn initial_sibling(&self) -> Option<N> {
        self.initial_sibling
    }

    /// Reference of the last live relocation.
    #[must_use]
    pub fn current_sibling(&self) -> Option<N> {
        self.current_sibling
    }

    /// Accepting container under the pointer at the last sample.
    #[must_use]
    pub fn last_drop_target(&self) -> Option<N> {
        self.last_drop_target
    }

    /// Pointer offset from the item's top-left corner at drag start.
    #[must_use]
    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// The tracking clone node, for pointer-driven drags.
    #[must_use]
    pub fn mirror_node(&self) -> Option<N> {
        self.mirror.as_ref().map(|(_, node)| *node)
    }

    /// Whether a tracking clone is following the pointer.
    #[must_use]
    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }
}

/// Where a controller is in the drag lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragState {
    #[default]
    Idle,
    Grabbed,
    Dragging,
}

bitflags! {
    /// What the pointer adapter should do with the native event it just
    /// forwarded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PointerResponse: u8 {
        const NONE            = 0b00;
        /// Suppress the platform default (text selection, native drag).
        const PREVENT_DEFAULT = 0b01;
        /// Focus the event target (a grab landed on an input).
        const FOCUS_TARGET    = 0b10;
    }
}

impl Default for PointerResponse {
    fn default() -> Self {
        Self::NONE
    }
}
