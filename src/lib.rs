//! Decode JPEG and JPEG 2000 images into one canonical pixel layout.
//!
//! Every decoder writes row-major RGBA8 with opaque alpha into a
//! caller-allocated buffer of exactly `width * height * 4` bytes. Use the
//! `read_*_info` functions to size that buffer first.
//!
//! CMYK JPEG data needs a [`DeviceTransform`], built once with [`setup`] and
//! passed to every decode that may need it.

pub mod byte_source;
pub mod canonical;
pub mod color_transform;
pub mod config;
pub mod constants;
pub mod error;
pub mod jpeg1;
pub mod jpeg2000;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use byte_source::MemoryByteSource;
pub use color_transform::{CmykConverter, DeviceTransform};
pub use config::{DecodeOptions, DecodeRegion};
pub use error::{PixnormError, Result, SourceError};
pub use jpeg1::DctImageDecoder;
pub use jpeg2000::WaveletImageDecoder;

/// Output geometry of a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Components in the compressed source, before expansion to RGBA.
    pub component_count: usize,
}

impl ImageInfo {
    /// Size of the canonical buffer for this image, `None` on overflow.
    pub fn rgba_len(&self) -> Option<usize> {
        canonical::rgba_len(self.width, self.height)
    }
}

/// Builds a CMYK to sRGB transform from a device profile.
///
/// Each call returns an independent handle; previously built handles stay valid.
pub fn setup(profile: &[u8]) -> Result<DeviceTransform> {
    DeviceTransform::from_profile(profile)
}

/// Converts `pixel_count` CMYK pixels into RGBA pixels.
pub fn convert_cmyk_buffer(
    transform: &DeviceTransform,
    input: &[u8],
    pixel_count: usize,
    output: &mut [u8],
) -> Result<()> {
    transform.convert_batch(input, pixel_count, output)
}

pub fn convert_cmyk_pixel(transform: &DeviceTransform, c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    transform.convert_single(c, m, y, k)
}

pub fn read_dct_info(input: &[u8]) -> Result<ImageInfo> {
    DctImageDecoder::new(input).read_info()
}

/// Decodes a JPEG into `output`. CMYK images require `transform`.
pub fn decode_dct(input: &[u8], transform: Option<&DeviceTransform>, output: &mut [u8]) -> Result<ImageInfo> {
    DctImageDecoder::new(input).decode(transform.map(|t| t as &dyn CmykConverter), output)
}

pub fn read_wavelet_info(input: &[u8]) -> Result<ImageInfo> {
    WaveletImageDecoder::new(input).read_info()
}

/// Decodes a JP2 file or raw JPEG 2000 codestream into `output`.
pub fn decode_wavelet(input: &[u8], output: &mut [u8]) -> Result<ImageInfo> {
    WaveletImageDecoder::new(input).decode(output)
}
