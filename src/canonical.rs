//! Canonical output layout: row-major, top-to-bottom, interleaved R, G, B, A
//! at 8 bits per channel, alpha always opaque.

use crate::error::{PixnormError, Result};

pub const CHANNELS: usize = 4;
pub const OPAQUE: u8 = 255;

/// Byte length of a canonical buffer, or `None` on overflow.
pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// Verifies that a caller-allocated buffer is exactly `width * height * 4` bytes.
/// Returns the pixel count.
pub fn check_output(width: u32, height: u32, output: &[u8]) -> Result<usize> {
    let expected = rgba_len(width, height).ok_or(PixnormError::TooLarge {
        pixels: width as u64 * height as u64,
        limit: (usize::MAX / CHANNELS) as u64,
    })?;
    if output.len() != expected {
        return Err(PixnormError::BufferSize {
            expected,
            actual: output.len(),
        });
    }
    Ok(expected / CHANNELS)
}

#[inline]
pub fn put_gray(output: &mut [u8], index: usize, value: u8) {
    put_rgb(output, index, value, value, value);
}

#[inline]
pub fn put_rgb(output: &mut [u8], index: usize, r: u8, g: u8, b: u8) {
    let px = &mut output[index * CHANNELS..index * CHANNELS + CHANNELS];
    px[0] = r;
    px[1] = g;
    px[2] = b;
    px[3] = OPAQUE;
}

/// Overwrites every alpha byte with `OPAQUE`.
pub fn force_opaque(output: &mut [u8]) {
    for px in output.chunks_exact_mut(CHANNELS) {
        px[3] = OPAQUE;
    }
}
