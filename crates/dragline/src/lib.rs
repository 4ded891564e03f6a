#![forbid(unsafe_code)]

//! Pointer-driven drag-and-drop between containers.
//!
//! # Role in dragline
//! `dragline` is the behavior layer. It turns normalized pointer events from
//! `dragline-core` into drag sessions over a live [`NodeTree`]: deciding when
//! a press becomes a drag, resolving where the dragged node would land at
//! every sample, and committing the outcome as a move, copy, cancel, or
//! removal with a fixed event contract.
//!
//! # Primary responsibilities
//! - **Drake**: the session controller and its public operations.
//! - **resolver**: drop-target and insertion-point resolution.
//! - **EventChannel**: typed lifecycle events (`drag`, `drop`, `shadow`, ...).
//! - **MirrorProvider**: the tracking clone that follows the pointer.
//! - **DragConfig**: plain options, loadable from TOML/JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use dragline::{Drake, DragEventKind, DragOptions};
//! use dragline::core::{Document, PointerEvent};
//!
//! let mut drake = Drake::with_containers(doc, [todo, done], DragOptions::new());
//! drake.on(DragEventKind::Drop, |event| println!("{event:?}"));
//! drake.handle_pointer(&PointerEvent::down(card, 10.0, 10.0));
//! drake.handle_pointer(&PointerEvent::moved(10.0, 140.0));
//! drake.handle_pointer(&PointerEvent::up(10.0, 140.0));
//! ```

pub mod config;
pub mod drake;
pub mod events;
pub mod mirror;
pub mod policy;
pub mod registry;
pub mod resolver;
pub mod session;

pub use dragline_core as core;
pub use dragline_core::tree::NodeTree;

pub use config::{ConfigError, DragConfig};
pub use drake::Drake;
pub use events::{CloneKind, DragEvent, DragEventKind, EventChannel, ListenerId};
pub use mirror::{CloneMirror, MirrorHandle, MirrorProvider};
pub use policy::{DragOptions, Policy};
pub use registry::ContainerRegistry;
pub use resolver::DropTarget;
pub use session::{DragState, GrabContext, PointerResponse, Session};
