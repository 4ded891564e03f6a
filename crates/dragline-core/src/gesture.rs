#![forbid(unsafe_code)]

//! Press-to-drag gating.
//!
//! A pointer-down only *arms* a drag. The drag is confirmed once the pointer
//! has slid far enough from the press origin, which keeps clicks and
//! micro-jitter from turning into drags.
//!
//! # Invariants
//!
//! 1. A sample whose per-axis distance to the origin is within the threshold
//!    on **both** axes never confirms a drag.
//! 2. Exceeding the threshold on either axis confirms it.
//! 3. A zero threshold confirms on any movement, but not on a sample that
//!    repeats the origin exactly.

use crate::geometry::Point;

/// Per-axis distances a press must slide before it becomes a drag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlideThreshold {
    /// Horizontal slack in client units.
    pub x: f64,
    /// Vertical slack in client units.
    pub y: f64,
}

impl SlideThreshold {
    /// Create a threshold from per-axis slack.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether moving from `origin` to `current` leaves the slack box.
    #[must_use]
    pub fn exceeded_by(&self, origin: Point, current: Point) -> bool {
        let (dx, dy) = origin.abs_delta(current);
        !(dx <= self.x && dy <= self.y)
    }
}

/// Tracks the last press position so later samples can be gated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PressOrigin {
    origin: Point,
}

impl PressOrigin {
    /// Record a new press position.
    pub fn press(&mut self, at: Point) {
        self.origin = at;
    }

    /// The recorded press position.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Whether `current` has slid past `threshold` from the press position.
    #[must_use]
    pub fn slid_past(&self, threshold: SlideThreshold, current: Point) -> bool {
        threshold.exceeded_by(self.origin, current)
    }

    /// Forget the press (origin returns to zero).
    pub fn reset(&mut self) {
        self.origin = Point::default();
    }
}
