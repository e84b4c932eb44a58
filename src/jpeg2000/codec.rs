//! Sample decoding backend.
//!
//! Entropy decoding and the inverse wavelet transform are delegated to
//! OpenJPEG through the `jpeg2k` crate. The trait keeps the pipeline
//! independent of that choice.

use super::image::ImageComponent;
use crate::error::{PixnormError, Result};

pub trait CodestreamDecoder {
    /// Decodes every component of a JP2 file or raw codestream.
    ///
    /// Returned components carry their decoded size, precision and
    /// signedness; sub-sampling factors are filled in by the caller.
    fn decode(&self, data: &[u8]) -> Result<Vec<ImageComponent>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenJpegCodec;

impl CodestreamDecoder for OpenJpegCodec {
    fn decode(&self, data: &[u8]) -> Result<Vec<ImageComponent>> {
        let image = jpeg2k::Image::from_bytes(data)
            .map_err(|err| PixnormError::Codec(format!("{:?}", err)))?;
        let components = image
            .components()
            .iter()
            .map(|c| {
                ImageComponent::new(
                    c.width(),
                    c.height(),
                    c.precision(),
                    c.is_signed(),
                    c.data().to_vec(),
                )
            })
            .collect();
        Ok(components)
    }
}
