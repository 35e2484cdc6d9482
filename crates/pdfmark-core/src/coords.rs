//! Coordinate transformation between view and page coordinate systems
//!
//! View space has a top-left origin in pixels and changes as the user scrolls
//! or zooms; page space has a bottom-left origin in page units and is fixed
//! for a given page. The viewport captures where the page's rendered top-left
//! corner currently sits on screen and at what zoom.

use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect};

/// Where a page is currently rendered inside the viewport.
///
/// `origin_x`/`origin_y` are the view-space position of the page's top-left
/// corner; `zoom` is view pixels per page unit and must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub origin_x: f64,
    pub origin_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(origin_x: f64, origin_y: f64, zoom: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            zoom,
        }
    }
}

/// Convert a page-space point to view space (flip Y axis)
pub fn page_to_view_point(point: Point, viewport: &Viewport, page_bounds: &Rect) -> Point {
    Point {
        x: viewport.origin_x + (point.x - page_bounds.min_x()) * viewport.zoom,
        y: viewport.origin_y + (page_bounds.max_y() - point.y) * viewport.zoom,
    }
}

/// Convert a view-space point to page space
pub fn view_to_page_point(point: Point, viewport: &Viewport, page_bounds: &Rect) -> Point {
    Point {
        x: page_bounds.min_x() + (point.x - viewport.origin_x) / viewport.zoom,
        y: page_bounds.max_y() - (point.y - viewport.origin_y) / viewport.zoom,
    }
}

/// Convert a page-space rect (bottom-left origin) to a view-space rect
/// (top-left origin).
pub fn page_to_view_rect(rect: Rect, viewport: &Viewport, page_bounds: &Rect) -> Rect {
    let top_left = page_to_view_point(
        Point::new(rect.min_x(), rect.max_y()),
        viewport,
        page_bounds,
    );
    Rect {
        x: top_left.x,
        y: top_left.y,
        width: rect.width * viewport.zoom,
        height: rect.height * viewport.zoom,
    }
}

/// Convert a view-space rect (top-left origin) to a page-space rect
/// (bottom-left origin).
pub fn view_to_page_rect(rect: Rect, viewport: &Viewport, page_bounds: &Rect) -> Rect {
    let width = rect.width / viewport.zoom;
    let height = rect.height / viewport.zoom;
    let top_left = view_to_page_point(Point::new(rect.x, rect.y), viewport, page_bounds);
    Rect {
        x: top_left.x,
        y: top_left.y - height,
        width,
        height,
    }
}
