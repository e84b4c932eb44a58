//! JPEG 2000 (Part 1, ISO/IEC 15444-1)
//!
//! - `jp2` / `parser`: JP2 boxes and the codestream main header.
//! - `image`: components, colour specification and header structures.
//! - `codec`: sample decoding backend (OpenJPEG).
//! - `color` / `icc`: colour-space resolution, profiles and 8-bit packing.
//! - `decoder`: the pipeline tying these together.

pub mod codec;
pub mod color;
pub mod decoder;
pub mod icc;
pub mod image;
pub mod jp2;
pub mod parser;

pub use codec::{CodestreamDecoder, OpenJpegCodec};
pub use decoder::WaveletImageDecoder;
pub use image::{ColorSpace, DecodedImage, ImageComponent};
