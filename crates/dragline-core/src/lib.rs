#![forbid(unsafe_code)]

//! Core: geometry, pointer events, press gating, and the node-graph contract.
//!
//! # Role in dragline
//! `dragline-core` is the input layer. It owns the normalized pointer event
//! types hosts translate their native input into, the slide-threshold gate
//! that separates clicks from drags, and the [`tree::NodeTree`] trait the
//! drag controller reads and mutates.
//!
//! # Primary responsibilities
//! - **PointerEvent**: one event shape for mouse, touch, and pen.
//! - **SlideThreshold**: per-axis slack before a press becomes a drag.
//! - **NodeTree**: topology reads, hit testing, and drag mutations.
//! - **Document**: an arena tree for hosts without a DOM.
//!
//! # How it fits in the system
//! The `dragline` crate consumes these types and drives the drag session
//! state machine. Nothing here holds drag state.

pub mod document;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod tree;

pub use document::{Document, NodeId, TreeError};
pub use event::{Buttons, Modifiers, PointerButton, PointerEvent, PointerEventKind, PointerType};
pub use geometry::{Direction, Point, Rect};
pub use gesture::{PressOrigin, SlideThreshold};
pub use tree::{Markers, NodeTree, PlaceNode, is_input};
