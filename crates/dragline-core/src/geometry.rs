#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All coordinates are client coordinates (origin at the top-left of the
//! viewport, y grows downward) expressed as `f64` so hosts can feed raw
//! pointer positions without rounding.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Coordinate on the layout axis of `direction`.
    #[inline]
    pub const fn along(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Vertical => self.y,
            Direction::Horizontal => self.x,
        }
    }

    /// Absolute per-axis distance to `other`.
    #[inline]
    pub fn abs_delta(&self, other: Point) -> (f64, f64) {
        ((self.x - other.x).abs(), (self.y - other.y).abs())
    }
}

/// Layout direction of a container's children.
///
/// Determines which axis is compared when resolving insertion points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Children stack top to bottom; the y axis decides.
    #[default]
    Vertical,
    /// Children flow left to right; the x axis decides.
    Horizontal,
}

impl Direction {
    /// Whether this is the horizontal layout.
    #[inline]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Horizontal)
    }
}

/// A bounding rectangle for layout bounds and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Horizontal midpoint.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical midpoint.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Midpoint on the layout axis of `direction`.
    #[inline]
    pub fn midpoint(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Vertical => self.center_y(),
            Direction::Horizontal => self.center_x(),
        }
    }

    /// Same size, new origin.
    #[inline]
    #[must_use]
    pub const fn with_origin(self, x: f64, y: f64) -> Self {
        Self::new(x, y, self.width, self.height)
    }

    /// Create a new rectangle that is the union of this rectangle and another.
    ///
    /// The result is the smallest rectangle that contains both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 10.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(29.9, 19.9)));
        assert!(!r.contains(Point::new(30.0, 15.0)));
        assert!(!r.contains(Point::new(15.0, 20.0)));
        assert!(!r.contains(Point::new(9.9, 15.0)));
    }

    #[test]
    fn midpoint_follows_direction() {
        let r = Rect::new(0.0, 100.0, 50.0, 20.0);
        assert_eq!(r.midpoint(Direction::Vertical), 110.0);
        assert_eq!(r.midpoint(Direction::Horizontal), 25.0);
    }

    #[test]
    fn point_along_axis() {
        let p = Point::new(3.0, 7.0);
        assert_eq!(p.along(Direction::Vertical), 7.0);
        assert_eq!(p.along(Direction::Horizontal), 3.0);
    }

    #[test]
    fn abs_delta_is_symmetric() {
        let a = Point::new(1.0, 5.0);
        let b = Point::new(4.0, 2.0);
        assert_eq!(a.abs_delta(b), (3.0, 3.0));
        assert_eq!(b.abs_delta(a), (3.0, 3.0));
    }

    #[test]
    fn union_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 20.0, 10.0, 5.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 25.0));
    }

    #[test]
    fn empty_rect() {
        assert!(Rect::from_size(0.0, 10.0).is_empty());
        assert!(!Rect::from_size(1.0, 1.0).is_empty());
    }

    #[test]
    fn default_direction_is_vertical() {
        assert_eq!(Direction::default(), Direction::Vertical);
        assert!(Direction::Horizontal.is_horizontal());
    }
}
