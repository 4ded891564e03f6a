#![forbid(unsafe_code)]

//! Drag lifecycle events and their publish/subscribe channel.
//!
//! # Design
//!
//! [`DragEvent`] is a closed set of variants, one payload shape per kind.
//! [`EventChannel`] keeps one listener list per [`DragEventKind`] and
//! dispatches synchronously, in subscription order, while the controller
//! performs the transition that produced the event.
//!
//! # Performance
//!
//! | Operation   | Complexity                     |
//! |-------------|--------------------------------|
//! | `on()`      | O(1) amortized                 |
//! | `off()`     | O(L) where L = total listeners |
//! | `emit()`    | O(L_k) listeners of that kind  |
//!
//! # Failure Modes
//!
//! - **Listener panic**: not caught. It unwinds through `emit` into the
//!   pointer handler or API call that triggered the event. Listeners
//!   registered after the panicking one are not invoked for that event.

use std::fmt;

/// Which clone a [`DragEvent::Cloned`] event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloneKind {
    /// The tracking clone that follows the pointer.
    Mirror,
    /// The copy that is dragged instead of the original.
    Copy,
}

/// A drag lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent<N> {
    /// A drag started.
    Drag { item: N, source: N },
    /// Always the last event of a drag.
    DragEnd { item: N },
    /// The subject was committed to `target` before `sibling`.
    Drop {
        item: N,
        target: N,
        source: N,
        sibling: Option<N>,
    },
    /// The drag ended with the subject at its original position (or gone,
    /// for a copy).
    Cancel { item: N, container: N, source: N },
    /// The subject was removed from the tree.
    Remove { item: N, container: N, source: N },
    /// The subject was relocated as a live preview.
    Shadow { item: N, container: N, source: N },
    /// The pointer entered an accepting container.
    Over { item: N, container: N, source: N },
    /// The pointer left the previous accepting container.
    Out { item: N, container: N, source: N },
    /// A clone of `original` was created.
    Cloned {
        clone: N,
        original: N,
        kind: CloneKind,
    },
}

impl<N> DragEvent<N> {
    /// The kind of this event.
    #[must_use]
    pub const fn kind(&self) -> DragEventKind {
        match self {
            Self::Drag { .. } => DragEventKind::Drag,
            Self::DragEnd { .. } => DragEventKind::DragEnd,
            Self::Drop { .. } => DragEventKind::Drop,
            Self::Cancel { .. } => DragEventKind::Cancel,
            Self::Remove { .. } => DragEventKind::Remove,
            Self::Shadow { .. } => DragEventKind::Shadow,
            Self::Over { .. } => DragEventKind::Over,
            Self::Out { .. } => DragEventKind::Out,
            Self::Cloned { .. } => DragEventKind::Cloned,
        }
    }
}

/// Event names, used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DragEventKind {
    Drag,
    DragEnd,
    Drop,
    Cancel,
    Remove,
    Shadow,
    Over,
    Out,
    Cloned,
}

impl DragEventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Drag,
        Self::DragEnd,
        Self::Drop,
        Self::Cancel,
        Self::Remove,
        Self::Shadow,
        Self::Over,
        Self::Out,
        Self::Cloned,
    ];

    /// Conventional lowercase event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drag => "drag",
            Self::DragEnd => "dragend",
            Self::Drop => "drop",
            Self::Cancel => "cancel",
            Self::Remove => "remove",
            Self::Shadow => "shadow",
            Self::Over => "over",
            Self::Out => "out",
            Self::Cloned => "cloned",
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DragEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by [`EventChannel::on`], used for exact removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener<N> = Box<dyn FnMut(&DragEvent<N>)>;

/// Typed publish/subscribe registry for [`DragEvent`]s.
///
/// # Invariants
///
/// 1. Listeners of one kind run in subscription order.
/// 2. A [`ListenerId`] is never reused by the same channel.
pub struct EventChannel<N> {
    listeners: [Vec<(ListenerId, Listener<N>)>; 9],
    next_id: u64,
}

impl<N> Default for EventChannel<N> {
    fn default() -> Self {
        Self {
            listeners: Default::default(),
            next_id: 0,
        }
    }
}

impl<N> fmt::Debug for EventChannel<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("listener_count", &self.len())
            .finish()
    }
}

impl<N> EventChannel<N> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to events of `kind`.
    pub fn on(&mut self, kind: DragEventKind, listener: impl FnMut(&DragEvent<N>) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners[kind.slot()].push((id, Box::new(listener)));
        id
    }

    /// Remove exactly the listener registered under `id`.
    ///
    /// Returns `false` if it was already removed.
    pub fn off(&mut self, id: ListenerId) -> bool {
        for list in &mut self.listeners {
            if let Some(at) = list.iter().position(|(l, _)| *l == id) {
                drop(list.remove(at));
                return true;
            }
        }
        false
    }

    /// Deliver `event` to every listener of its kind.
    pub fn emit(&mut self, event: &DragEvent<N>) {
        for (_, listener) in &mut self.listeners[event.kind().slot()] {
            listener(event);
        }
    }

    /// Number of listeners for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: DragEventKind) -> usize {
        self.listeners[kind.slot()].len()
    }

    /// Total number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every listener.
    pub fn clear(&mut self) {
        for list in &mut self.listeners {
            list.clear();
        }
    }
}
