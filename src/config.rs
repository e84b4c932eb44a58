//! Decode options shared by both decoders.
//!
//! ```
//! use pixnorm_rs::config::{DecodeOptions, DecodeRegion};
//!
//! let options = DecodeOptions::default()
//!     .with_region(DecodeRegion::new(0, 0, 64, 64))
//!     .with_max_pixels(0);
//! assert!(options.apply_embedded_profile);
//! ```

use crate::error::{PixnormError, Result};

/// Default pixel-count ceiling (256 Mpx), checked against header dimensions before decoding.
pub const DEFAULT_MAX_PIXELS: u64 = 1 << 28;

/// Area to decode, in image pixel coordinates: `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeRegion {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl DecodeRegion {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Checks the region against the image size taken from the header.
    pub fn validate(&self, width: u32, height: u32) -> Result<()> {
        if self.x0 < self.x1 && self.x1 <= width && self.y0 < self.y1 && self.y1 <= height {
            Ok(())
        } else {
            Err(PixnormError::InvalidRegion {
                x0: self.x0,
                y0: self.y0,
                x1: self.x1,
                y1: self.y1,
                width,
                height,
            })
        }
    }

    pub fn is_full(&self, width: u32, height: u32) -> bool {
        self.x0 == 0 && self.y0 == 0 && self.x1 == width && self.y1 == height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Decode area; `None` decodes the full image.
    pub region: Option<DecodeRegion>,

    /// Maximum `width * height` accepted from a header. Set to 0 to disable the check.
    pub max_pixels: u64,

    /// Apply embedded ICC / CIELab colour data found in wavelet containers.
    pub apply_embedded_profile: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            region: None,
            max_pixels: DEFAULT_MAX_PIXELS,
            apply_embedded_profile: true,
        }
    }
}

impl DecodeOptions {
    pub fn with_region(mut self, region: DecodeRegion) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    pub fn with_embedded_profile(mut self, apply: bool) -> Self {
        self.apply_embedded_profile = apply;
        self
    }

    pub fn check_pixel_limit(&self, width: u32, height: u32) -> Result<()> {
        let pixels = width as u64 * height as u64;
        if self.max_pixels > 0 && pixels > self.max_pixels {
            return Err(PixnormError::TooLarge {
                pixels,
                limit: self.max_pixels,
            });
        }
        Ok(())
    }
}
