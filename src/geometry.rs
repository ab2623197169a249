//! Surface geometry: points, rectangles, and the viewport.
//!
//! All coordinates are absolute surface pixels with the origin at the top-left
//! corner of the workspace. Positions are deliberately unbounded: a card may
//! sit partly or fully off-screen and nothing here clamps it.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point (or an offset between two points) in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle in screen pixels, described by its four edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    /// Build a rectangle from its top-left corner and size.
    #[must_use]
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether `point` lies inside the rectangle. Edges count as inside.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.left <= point.x && point.x <= self.right && self.top <= point.y && point.y <= self.bottom
    }
}

/// Size of the visible surface, used to center newly placed cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_VIEWPORT_WIDTH, crate::consts::DEFAULT_VIEWPORT_HEIGHT)
    }
}
