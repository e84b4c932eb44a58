use num_enum::TryFromPrimitive;

// JPEG 1 start-of-image marker (FFD8).
pub const DCT_MAGIC: [u8; 2] = [0xFF, 0xD8];

// The JP2 signature box is exactly 12 bytes (ISO/IEC 15444-1, I.5.1).
pub const JP2_SIGNATURE: [u8; 12] = *b"\x00\x00\x00\x0CjP  \r\n\x87\n";

pub const BOX_JP2_HEADER: [u8; 4] = *b"jp2h";
pub const BOX_IMAGE_HEADER: [u8; 4] = *b"ihdr";
pub const BOX_COLOUR_SPECIFICATION: [u8; 4] = *b"colr";
pub const BOX_CODESTREAM: [u8; 4] = *b"jp2c";

// Box header sizes: LBox + TBox, and the optional XLBox.
pub const BOX_HEADER_SIZE: u64 = 8;
pub const BOX_EXTENDED_LENGTH_SIZE: u64 = 8;

// Codestream markers (ISO/IEC 15444-1, table A.2).
pub const MARKER_SOC: u16 = 0xFF4F;
pub const MARKER_SIZ: u16 = 0xFF51;

// SIZ allows up to 16384 components; precision is stored as (bits - 1) in 7 bits.
pub const MAXIMUM_COMPONENT_COUNT: u16 = 16384;
pub const MAXIMUM_PRECISION: u8 = 38;

/// Colour specification methods of the `colr` box.
pub const COLR_METHOD_ENUMERATED: u8 = 1;
pub const COLR_METHOD_RESTRICTED_ICC: u8 = 2;
pub const COLR_METHOD_ANY_ICC: u8 = 3;

// Marks the default CIELab parameters in the `colr` box ("DEF\0" in T.801).
pub const CIELAB_DEFAULT_ILLUMINANT: u32 = 0x4445_4600;

/// Enumerated colour spaces understood by the wavelet pipeline (EnumCS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum EnumeratedColorSpace {
    Cmyk = 12,
    CieLab = 14,
    Srgb = 16,
    Greyscale = 17,
    Sycc = 18,
    ESycc = 24,
}
