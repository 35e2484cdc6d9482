//! Permanent page annotations produced by the placement engine

use serde::{Deserialize, Serialize};

use crate::geom::Rect;
use crate::image::SourceImage;

/// Translucent fill color for highlight annotations, RGB components in the
/// 0-1 range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub opacity: f32,
}

impl HighlightColor {
    pub fn new(r: f32, g: f32, b: f32, opacity: f32) -> Self {
        Self { r, g, b, opacity }
    }

    /// The classic marker yellow.
    pub fn yellow() -> Self {
        Self::new(1.0, 1.0, 0.0, 0.4)
    }

    /// Parse a hex color string (e.g., "#FF0000" or "FF0000"). Malformed
    /// components fall back to 0.
    pub fn from_hex(color: &str, opacity: f32) -> Self {
        let hex = color.trim_start_matches('#');
        if hex.len() >= 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0) as f32 / 255.0;
            let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0) as f32 / 255.0;
            let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0) as f32 / 255.0;
            Self::new(r, g, b, opacity)
        } else {
            Self::new(0.0, 0.0, 0.0, opacity)
        }
    }
}

/// A raster image painted into a page region, borderless and unfilled: the
/// visual result is exactly the source pixels, alpha-composited as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampAnnotation {
    pub rect: Rect,
    pub image: SourceImage,
}

/// A translucent rectangle over one visual line of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightAnnotation {
    pub rect: Rect,
    pub color: HighlightColor,
}

/// An annotation a page can own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageAnnotation {
    Stamp(StampAnnotation),
    Highlight(HighlightAnnotation),
}

impl PageAnnotation {
    /// Bounding rect in page space.
    pub fn rect(&self) -> Rect {
        match self {
            PageAnnotation::Stamp(stamp) => stamp.rect,
            PageAnnotation::Highlight(highlight) => highlight.rect,
        }
    }
}
