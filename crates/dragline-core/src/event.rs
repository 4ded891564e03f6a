#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! Hosts translate their native input (DOM pointer events, terminal mouse
//! reports, winit cursor events, ...) into [`PointerEvent`] values so the
//! drag controller sees one shape for mouse, touch, and pen input.
//!
//! # Design Notes
//!
//! - Coordinates are client coordinates, see [`crate::geometry`].
//! - `button` is the button whose state changed (down/up); `buttons` is the
//!   mask of buttons currently held, which is what move samples carry.
//! - `target` is the node the host reports under the pointer at down time.
//!   Move/up samples may leave it empty; the controller hit-tests itself.

use bitflags::bitflags;

use crate::geometry::Point;

/// A normalized pointer event carrying a node identity of type `N`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent<N> {
    /// What happened.
    pub kind: PointerEventKind,
    /// Which kind of device produced the event.
    pub pointer_type: PointerType,
    /// Button whose state changed (meaningful for down/up).
    pub button: PointerButton,
    /// Buttons held while the event was produced.
    pub buttons: Buttons,
    /// Client x coordinate.
    pub x: f64,
    /// Client y coordinate.
    pub y: f64,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
    /// Node the host reported as the event target, if any.
    pub target: Option<N>,
}

impl<N> PointerEvent<N> {
    /// Create a new event of the given kind at `(x, y)`.
    ///
    /// Defaults to a mouse pointer with the primary button.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            pointer_type: PointerType::Mouse,
            button: PointerButton::Primary,
            buttons: Buttons::NONE,
            x,
            y,
            modifiers: Modifiers::NONE,
            target: None,
        }
    }

    /// Primary-button press on `target`.
    #[must_use]
    pub const fn down(target: N, x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Down,
            pointer_type: PointerType::Mouse,
            button: PointerButton::Primary,
            buttons: Buttons::PRIMARY,
            x,
            y,
            modifiers: Modifiers::NONE,
            target: Some(target),
        }
    }

    /// Movement with the primary button held.
    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        let mut event = Self::new(PointerEventKind::Move, x, y);
        event.buttons = Buttons::PRIMARY;
        event
    }

    /// Primary-button release.
    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, x, y)
    }

    /// The platform aborted the pointer stream.
    #[must_use]
    pub const fn cancel(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Cancel, x, y)
    }

    #[must_use]
    pub const fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub const fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = buttons;
        self
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_pointer_type(mut self, pointer_type: PointerType) -> Self {
        self.pointer_type = pointer_type;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: N) -> Self {
        self.target = Some(target);
        self
    }

    /// Client position as a point.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Primary left-click, primary touch contact, or primary pen tip,
    /// without ctrl or meta held (those gestures belong to the platform).
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        matches!(self.button, PointerButton::Primary)
            && !self.modifiers.intersects(Modifiers::CTRL.union(Modifiers::SUPER))
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    /// The platform took the pointer away (touch scroll, lost capture).
    Cancel,
}

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerType {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button, touch contact, pen tip.
    Primary,
    /// Middle mouse button.
    Auxiliary,
    /// Right mouse button, pen barrel button.
    Secondary,
    /// Any other button, by platform index.
    Other(u8),
}

bitflags! {
    /// Buttons held down during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const NONE      = 0b0000;
        const PRIMARY   = 0b0001;
        const SECONDARY = 0b0010;
        const AUXILIARY = 0b0100;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Self::NONE
    }
}

bitflags! {
    /// Modifier keys held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
