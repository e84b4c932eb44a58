//! JPEG 1 (DCT, ISO/IEC 10918-1 / ITU-T T.81)
//!
//! Baseline, progressive and lossless frames are decoded by `jpeg-decoder`;
//! greyscale (8 or 16 bit), RGB and CMYK results are expanded to RGBA8.

pub mod decoder;

pub use decoder::{DctImageDecoder, expand_samples};
