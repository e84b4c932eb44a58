//! JPEG 2000 decode-and-normalise pipeline.
//!
//! This module provides the `WaveletImageDecoder`, which reads the container
//! and main header itself, hands sample decoding to a `CodestreamDecoder`,
//! then resolves colour and packs the result as RGBA8.

use super::codec::{CodestreamDecoder, OpenJpegCodec};
use super::color::{
    cmyk_to_rgb, crop, esycc_to_rgb, infer_color_space, pack_rgba, sycc_to_rgb,
    validate_components,
};
use super::icc::{apply_icc_profile, cielab_to_rgb};
use super::image::{ColorSpace, ColorSpecification, DecodedImage, ImageComponent, WaveletHeader};
use super::jp2::read_header;
use crate::ImageInfo;
use crate::byte_source::MemoryByteSource;
use crate::canonical::check_output;
use crate::config::DecodeOptions;
use crate::error::{PixnormError, Result};

/// Decoder for a complete JP2 file or raw codestream held in memory.
pub struct WaveletImageDecoder<'a> {
    data: &'a [u8],
    options: DecodeOptions,
}

impl<'a> WaveletImageDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, DecodeOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: DecodeOptions) -> Self {
        Self { data, options }
    }

    /// Reads container boxes and the codestream main header.
    pub fn read_header(&self) -> Result<WaveletHeader> {
        let mut source = MemoryByteSource::new(self.data);
        read_header(&mut source)
    }

    /// Output dimensions and source component count, without decoding samples.
    pub fn read_info(&self) -> Result<ImageInfo> {
        self.prepare().map(|(_, info)| info)
    }

    /// Decodes into `output`, which must hold exactly `width * height * 4` bytes.
    pub fn decode(&self, output: &mut [u8]) -> Result<ImageInfo> {
        self.decode_with(&OpenJpegCodec, output)
    }

    /// Same as [`decode`](Self::decode) with an explicit sample decoder.
    ///
    /// `output` is written only once every stage has succeeded.
    pub fn decode_with(&self, codec: &dyn CodestreamDecoder, output: &mut [u8]) -> Result<ImageInfo> {
        let (header, info) = self.prepare()?;
        check_output(info.width, info.height, output)?;
        let image = self.resolve(header, codec)?;
        pack_rgba(&image, output)?;
        Ok(ImageInfo {
            width: image.width(),
            height: image.height(),
            component_count: info.component_count,
        })
    }

    /// Runs the pipeline up to, but not including, 8-bit packing.
    pub fn decode_image(&self, codec: &dyn CodestreamDecoder) -> Result<DecodedImage> {
        let (header, _) = self.prepare()?;
        self.resolve(header, codec)
    }

    fn prepare(&self) -> Result<(WaveletHeader, ImageInfo)> {
        let header = self.read_header()?;
        let (width, height) = header.codestream.image_size();
        self.options.check_pixel_limit(width, height)?;
        let (width, height) = match self.options.region {
            Some(region) => {
                region.validate(width, height)?;
                (region.width(), region.height())
            }
            None => (width, height),
        };
        let info = ImageInfo {
            width,
            height,
            component_count: header.codestream.components.len(),
        };
        Ok((header, info))
    }

    fn resolve(&self, header: WaveletHeader, codec: &dyn CodestreamDecoder) -> Result<DecodedImage> {
        let mut components = codec.decode(self.data)?;
        if components.first().is_none_or(|c| c.data.is_empty()) {
            return Err(PixnormError::EmptyResult);
        }
        assign_subsampling(&header, &mut components);

        let declared = header.color.declared_color_space();
        let mut image = DecodedImage {
            components,
            color_space: declared,
        };
        validate_components(&image)?;

        if let Some(region) = self.options.region {
            region.validate(image.width(), image.height())?;
            crop(&mut image, &region);
        }

        let subsampling: Vec<(u32, u32)> = image.components.iter().map(|c| (c.dx, c.dy)).collect();
        image.color_space = infer_color_space(declared, &subsampling);
        if image.color_space != declared {
            log::debug!(
                "declared {:?} with {} components, interpreting as {:?}",
                declared,
                subsampling.len(),
                image.color_space
            );
        }

        let profiled = self.options.apply_embedded_profile
            && match &header.color {
                ColorSpecification::Icc(profile) if !profile.is_empty() => {
                    apply_icc_profile(&mut image, profile)
                }
                ColorSpecification::Icc(_) => cielab_to_rgb(&mut image, None),
                ColorSpecification::CieLab(parameters) => cielab_to_rgb(&mut image, *parameters),
                _ => false,
            };

        if !profiled {
            match image.color_space {
                ColorSpace::Sycc => {
                    sycc_to_rgb(&mut image);
                }
                ColorSpace::ESycc => {
                    esycc_to_rgb(&mut image);
                }
                ColorSpace::Cmyk => {
                    cmyk_to_rgb(&mut image);
                }
                _ => {}
            }
        }

        log::debug!(
            "wavelet image {}x{}: {} components as {:?}",
            image.width(),
            image.height(),
            image.components.len(),
            image.color_space
        );
        Ok(image)
    }
}

/// Copies sub-sampling factors from SIZ, or estimates them from the decoded
/// size when the header has fewer components than the codec returned.
fn assign_subsampling(header: &WaveletHeader, components: &mut [ImageComponent]) {
    let (width, height) = header.codestream.image_size();
    for (index, c) in components.iter_mut().enumerate() {
        let (dx, dy) = match header.codestream.components.get(index) {
            Some(info) => (info.dx as u32, info.dy as u32),
            None => (
                width.div_ceil(c.width.max(1)),
                height.div_ceil(c.height.max(1)),
            ),
        };
        c.dx = dx.max(1);
        c.dy = dy.max(1);
    }
}
