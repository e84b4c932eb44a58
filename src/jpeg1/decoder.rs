//! JPEG 1 (DCT) decoder producing canonical RGBA8.
//!
//! Huffman decoding and the inverse DCT are done by `jpeg-decoder`; this
//! module selects the expansion rule from the decoded component count.

use jpeg_decoder::{Decoder, PixelFormat};

use crate::ImageInfo;
use crate::canonical::{CHANNELS, check_output, force_opaque, put_gray, put_rgb};
use crate::color_transform::CmykConverter;
use crate::config::{DecodeOptions, DecodeRegion};
use crate::error::{PixnormError, Result};
use crate::jpeg2000::color::normalize_sample;

const CODEC: &str = "DCT";

pub struct DctImageDecoder<'a> {
    data: &'a [u8],
    options: DecodeOptions,
}

struct Frame<'a> {
    decoder: Decoder<&'a [u8]>,
    format: PixelFormat,
    precision: u32,
    width: u32,
    height: u32,
    output: ImageInfo,
}

impl<'a> DctImageDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, DecodeOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: DecodeOptions) -> Self {
        Self { data, options }
    }

    /// Parses the frame header only.
    pub fn read_info(&self) -> Result<ImageInfo> {
        self.read_frame().map(|frame| frame.output)
    }

    /// Decodes into `output` (`width * height * 4` bytes).
    ///
    /// Four-component images are passed through `converter` as CMYK; without
    /// one they fail with `NotConfigured` before any sample is decoded.
    pub fn decode(&self, converter: Option<&dyn CmykConverter>, output: &mut [u8]) -> Result<ImageInfo> {
        let mut frame = self.read_frame()?;
        let info = frame.output;
        check_output(info.width, info.height, output)?;
        if info.component_count == 4 && converter.is_none() {
            return Err(PixnormError::NotConfigured);
        }

        let pixels = frame
            .decoder
            .decode()
            .map_err(|err| PixnormError::Codec(err.to_string()))?;
        if pixels.is_empty() {
            return Err(PixnormError::EmptyResult);
        }
        let samples = match frame.format {
            PixelFormat::L16 => reduce_to_8_bit(&pixels, frame.precision),
            // jpeg-decoder complements CMYK output; undo it to get the stored samples.
            PixelFormat::CMYK32 => pixels.into_iter().map(|v| 255 - v).collect(),
            _ => pixels,
        };
        let expected = frame.width as usize * frame.height as usize * info.component_count;
        if samples.len() != expected {
            return Err(PixnormError::Codec(format!(
                "decoded {} samples, expected {}",
                samples.len(),
                expected
            )));
        }
        let plane = match self.options.region {
            Some(region) if !region.is_full(frame.width, frame.height) => {
                crop_plane(&samples, frame.width, info.component_count, &region)
            }
            _ => samples,
        };

        log::debug!(
            "DCT image {}x{} ({:?}) expanded from {} components",
            info.width,
            info.height,
            frame.format,
            info.component_count
        );
        expand_samples(info.component_count, &plane, converter, output)?;
        Ok(info)
    }

    fn read_frame(&self) -> Result<Frame<'a>> {
        let mut decoder = Decoder::new(self.data);
        decoder
            .read_info()
            .map_err(|err| PixnormError::Header(err.to_string()))?;
        let frame = decoder
            .info()
            .ok_or_else(|| PixnormError::Header("no frame header".to_string()))?;
        let (width, height) = (frame.width as u32, frame.height as u32);
        #[allow(unreachable_patterns)]
        let component_count = match frame.pixel_format {
            PixelFormat::L8 | PixelFormat::L16 => 1,
            PixelFormat::RGB24 => 3,
            PixelFormat::CMYK32 => 4,
            other => {
                return Err(PixnormError::UnsupportedShape {
                    codec: CODEC,
                    components: other.pixel_bytes(),
                });
            }
        };

        self.options.check_pixel_limit(width, height)?;
        let (out_width, out_height) = match self.options.region {
            Some(region) => {
                region.validate(width, height)?;
                (region.width(), region.height())
            }
            None => (width, height),
        };
        Ok(Frame {
            decoder,
            format: frame.pixel_format,
            precision: frame_precision(self.data).map_or(16, u32::from),
            width,
            height,
            output: ImageInfo {
                width: out_width,
                height: out_height,
                component_count,
            },
        })
    }
}

/// Native-endian 16-bit luminance of `precision` bits to 8 bits, using the
/// wavelet rounding rule.
fn reduce_to_8_bit(pixels: &[u8], precision: u32) -> Vec<u8> {
    pixels
        .chunks_exact(2)
        .map(|px| normalize_sample(u16::from_ne_bytes([px[0], px[1]]) as i32, precision, false))
        .collect()
}

/// Sample precision from the first SOFn segment.
fn frame_precision(data: &[u8]) -> Option<u8> {
    let mut pos = 2;
    while pos + 4 < data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        match marker {
            0xFF => pos += 1,
            0x01 | 0xD0..=0xD7 => pos += 2,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return data.get(pos + 4).copied();
            }
            _ => pos += 2 + u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize,
        }
    }
    None
}

fn crop_plane(plane: &[u8], width: u32, components: usize, region: &DecodeRegion) -> Vec<u8> {
    let stride = width as usize * components;
    let start = region.x0 as usize * components;
    let end = region.x1 as usize * components;
    let mut out = Vec::with_capacity(region.width() as usize * region.height() as usize * components);
    for y in region.y0..region.y1 {
        let row = y as usize * stride;
        out.extend_from_slice(&plane[row + start..row + end]);
    }
    out
}

/// Expands an interleaved plane of `components` samples per pixel into RGBA8.
///
/// - 1: grey replicated into R, G, B.
/// - 3: copied through.
/// - 4: CMYK through `converter`, alpha forced opaque afterwards.
///
/// Any other count is `UnsupportedShape`. `output` is not touched on error.
pub fn expand_samples(
    components: usize,
    plane: &[u8],
    converter: Option<&dyn CmykConverter>,
    output: &mut [u8],
) -> Result<()> {
    if !matches!(components, 1 | 3 | 4) {
        return Err(PixnormError::UnsupportedShape {
            codec: CODEC,
            components,
        });
    }
    let pixel_count = output.len() / CHANNELS;
    if output.len() % CHANNELS != 0 || plane.len() != pixel_count * components {
        return Err(PixnormError::BufferSize {
            expected: plane.len() / components * CHANNELS,
            actual: output.len(),
        });
    }

    match components {
        1 => {
            for (index, &v) in plane.iter().enumerate() {
                put_gray(output, index, v);
            }
        }
        3 => {
            for (index, px) in plane.chunks_exact(3).enumerate() {
                put_rgb(output, index, px[0], px[1], px[2]);
            }
        }
        _ => {
            let converter = converter.ok_or(PixnormError::NotConfigured)?;
            converter.convert(plane, output);
            force_opaque(output);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Naive CMYK inversion that leaves alpha at 0.
    struct Inverse;

    impl CmykConverter for Inverse {
        fn convert(&self, input: &[u8], output: &mut [u8]) {
            for (src, dst) in input.chunks_exact(4).zip(output.chunks_exact_mut(4)) {
                dst[0] = 255 - src[0];
                dst[1] = 255 - src[1];
                dst[2] = 255 - src[2];
                dst[3] = 0;
            }
        }
    }

    #[test]
    fn grey_is_replicated() {
        let mut out = [1u8; 8];
        expand_samples(1, &[0, 255], None, &mut out).unwrap();
        assert_eq!(out, [0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn rgb_is_copied() {
        let mut out = [0u8; 4];
        expand_samples(3, &[10, 20, 30], None, &mut out).unwrap();
        assert_eq!(out, [10, 20, 30, 255]);
    }

    #[test]
    fn cmyk_alpha_is_forced() {
        let mut out = [0u8; 8];
        expand_samples(4, &[0, 0, 0, 0, 255, 0, 55, 9], Some(&Inverse), &mut out).unwrap();
        assert_eq!(out, [255, 255, 255, 255, 0, 255, 200, 255]);
    }

    #[test]
    fn cmyk_without_converter() {
        let mut out = [0u8; 4];
        assert_eq!(
            expand_samples(4, &[0; 4], None, &mut out),
            Err(PixnormError::NotConfigured)
        );
    }

    #[test]
    fn two_components_are_unsupported() {
        let mut out = [9u8; 4];
        let err = expand_samples(2, &[1, 2], None, &mut out).unwrap_err();
        assert_eq!(err, PixnormError::UnsupportedShape { codec: "DCT", components: 2 });
        assert_eq!(out, [9; 4]);
    }

    #[test]
    fn plane_size_mismatch() {
        let mut out = [0u8; 8];
        assert!(matches!(
            expand_samples(3, &[1, 2, 3], None, &mut out),
            Err(PixnormError::BufferSize { .. })
        ));
    }

    fn native_bytes(samples: &[u16]) -> Vec<u8> {
        samples.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn sixteen_bit_reduction() {
        let bytes = native_bytes(&[0xFF00, 0x8000, 0xFFFF, 0x007F]);
        assert_eq!(reduce_to_8_bit(&bytes, 16), vec![255, 128, 255, 0]);
    }

    #[test]
    fn twelve_bit_reduction_uses_frame_precision() {
        let bytes = native_bytes(&[4095, 2048, 0]);
        assert_eq!(reduce_to_8_bit(&bytes, 12), vec![255, 128, 0]);
    }

    #[test]
    fn precision_from_first_frame_header() {
        // SOI, APP0 (2 payload bytes), SOF3 with 12-bit samples.
        let data = [
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0xAA, 0xBB, 0xFF, 0xC3, 0x00, 0x0B, 0x0C, 0x00,
            0x01,
        ];
        assert_eq!(frame_precision(&data), Some(12));
        // DHT is not a frame header.
        let no_frame = [0xFF, 0xD8, 0xFF, 0xC4, 0x00, 0x02, 0xFF, 0xD9];
        assert_eq!(frame_precision(&no_frame), None);
    }

    #[test]
    fn crop_rows_and_columns() {
        // 3x2, one component.
        let plane = [0, 1, 2, 3, 4, 5];
        assert_eq!(crop_plane(&plane, 3, 1, &DecodeRegion::new(1, 1, 3, 2)), vec![4, 5]);
    }

    #[test]
    fn garbage_is_a_header_error() {
        let decoder = DctImageDecoder::new(b"definitely not a jpeg");
        assert!(matches!(decoder.read_info(), Err(PixnormError::Header(_))));
    }
}
