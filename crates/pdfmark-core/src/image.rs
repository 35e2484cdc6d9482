//! Raster source images for stamp placement

use serde::{Deserialize, Serialize};

use crate::error::MarkupError;

/// An immutable RGBA raster plus its natural pixel dimensions.
///
/// The placement engine never decodes or resamples: the host hands over the
/// already-rendered pixels (a drawn signature, an imported graphic) and the
/// same bytes end up composited into the page. A zero-sized image is a valid
/// value (the user confirmed an empty drawing) but is rejected when a
/// placement begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
}

impl SourceImage {
    /// Wrap raw RGBA8 pixels. Fails if the buffer length does not match
    /// `width * height * 4`.
    pub fn from_rgba8(rgba: Vec<u8>, width: u32, height: u32) -> Result<Self, MarkupError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(MarkupError::InvalidImage(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                rgba.len()
            )));
        }
        Ok(Self {
            rgba,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when either dimension is zero (degenerate/empty drawing).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Height over width.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.height) / f64::from(self.width)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// The interleaved RGB samples, alpha stripped.
    pub fn rgb_channel(&self) -> Vec<u8> {
        self.rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }

    /// The alpha samples alone, one byte per pixel.
    pub fn alpha_channel(&self) -> Vec<u8> {
        self.rgba.chunks_exact(4).map(|px| px[3]).collect()
    }
}
