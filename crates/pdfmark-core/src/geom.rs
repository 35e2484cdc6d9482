//! Geometry primitives shared by the placement engine
//!
//! All rectangles are axis-aligned and stored as origin plus size. Page-space
//! rects have a bottom-left origin (PDF convention); view-space rects have a
//! top-left origin. The types themselves are space-agnostic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rect of the given size centered on `center`.
    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The same rect translated by (dx, dy).
    pub fn offset_by(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// A rect with zero or negative extent on either axis is empty.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min_x() >= self.min_x()
            && other.min_y() >= self.min_y()
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    /// Clamp this rect fully inside `bounds` while keeping each dimension at
    /// least `min_width`/`min_height`: size is clamped first, then the origin
    /// is pulled back inside. Re-clamping an already-clamped rect is an
    /// identity.
    pub fn clamped_into(&self, bounds: &Rect, min_width: f64, min_height: f64) -> Self {
        let width = self.width.max(min_width).min(bounds.width);
        let height = self.height.max(min_height).min(bounds.height);
        let x = self.x.max(bounds.min_x()).min(bounds.max_x() - width);
        let y = self.y.max(bounds.min_y()).min(bounds.max_y() - height);
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
