//! Device (CMYK) to display (sRGB) conversion.
//!
//! A `DeviceTransform` is built once from a device profile and then passed
//! explicitly to every conversion. Rebuilding produces a new handle; existing
//! handles, and any conversion running on them, are unaffected.

use std::fmt;
use std::sync::Arc;

use lcms2::{ColorSpaceSignature, DisallowCache, Flags, GlobalContext, Intent, PixelFormat, Profile, Transform};

use crate::canonical::CHANNELS;
use crate::error::{PixnormError, Result};

type CmykToRgba = Transform<[u8; 4], [u8; 4], GlobalContext, DisallowCache>;

/// Converts interleaved 4-channel device samples into 4-channel display samples.
///
/// Implementations write R, G, B of every output pixel; the alpha byte is
/// unspecified and is overwritten by the decoders.
pub trait CmykConverter {
    fn convert(&self, input: &[u8], output: &mut [u8]);
}

/// Shared, immutable CMYK to sRGB pipeline (perceptual intent).
#[derive(Clone)]
pub struct DeviceTransform {
    inner: Arc<CmykToRgba>,
}

impl DeviceTransform {
    /// Parses `profile_bytes` as a CMYK ICC profile and pairs it with sRGB.
    pub fn from_profile(profile_bytes: &[u8]) -> Result<Self> {
        let device = Profile::new_icc(profile_bytes)
            .map_err(|err| PixnormError::Profile(err.to_string()))?;
        let space = device.color_space();
        if space != ColorSpaceSignature::CmykData {
            return Err(PixnormError::Profile(format!(
                "expected a CMYK device profile, found {:?}",
                space
            )));
        }
        let display = Profile::new_srgb();
        let transform: CmykToRgba = Transform::new_flags_context(
            GlobalContext::new(),
            &device,
            PixelFormat::CMYK_8,
            &display,
            PixelFormat::RGBA_8,
            Intent::Perceptual,
            Flags::NO_CACHE,
        )
        .map_err(|err| PixnormError::Profile(err.to_string()))?;
        log::debug!("device transform built from {} profile bytes", profile_bytes.len());
        Ok(Self {
            inner: Arc::new(transform),
        })
    }

    /// Converts `pixel_count` CMYK pixels from `input` into RGBA pixels in `output`.
    pub fn convert_batch(&self, input: &[u8], pixel_count: usize, output: &mut [u8]) -> Result<()> {
        let len = pixel_count
            .checked_mul(CHANNELS)
            .ok_or(PixnormError::BufferSize {
                expected: usize::MAX,
                actual: input.len(),
            })?;
        if input.len() < len {
            return Err(PixnormError::BufferSize {
                expected: len,
                actual: input.len(),
            });
        }
        if output.len() < len {
            return Err(PixnormError::BufferSize {
                expected: len,
                actual: output.len(),
            });
        }
        self.convert(&input[..len], &mut output[..len]);
        Ok(())
    }

    pub fn convert_single(&self, c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
        let mut out = [[0u8; 4]; 1];
        self.inner.transform_pixels(&[[c, m, y, k]], &mut out);
        [out[0][0], out[0][1], out[0][2]]
    }
}

impl CmykConverter for DeviceTransform {
    fn convert(&self, input: &[u8], output: &mut [u8]) {
        let len = input.len().min(output.len()) / CHANNELS * CHANNELS;
        self.inner.transform_pixels(
            bytemuck::cast_slice(&input[..len]),
            bytemuck::cast_slice_mut(&mut output[..len]),
        );
    }
}

impl fmt::Debug for DeviceTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceTransform").finish_non_exhaustive()
    }
}
