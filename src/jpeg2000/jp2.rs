//! JP2 Box structure reader (ISO/IEC 15444-1 Annex I).

use super::image::{ColorSpace, ColorSpecification, Container, LabParameters, WaveletHeader};
use super::parser::parse_main_header;
use crate::byte_source::MemoryByteSource;
use crate::constants::{
    BOX_CODESTREAM, BOX_COLOUR_SPECIFICATION, BOX_EXTENDED_LENGTH_SIZE, BOX_HEADER_SIZE,
    BOX_IMAGE_HEADER, BOX_JP2_HEADER, CIELAB_DEFAULT_ILLUMINANT, COLR_METHOD_ANY_ICC,
    COLR_METHOD_ENUMERATED, COLR_METHOD_RESTRICTED_ICC, EnumeratedColorSpace, JP2_SIGNATURE,
    MARKER_SOC,
};
use crate::error::{PixnormError, Result};

// METH, PREC and APPROX precede the colour data in a colr box.
const COLR_PREFIX_LENGTH: u64 = 3;
// EnumCS followed by RL, OL, RA, OA, RB, OB, IL.
const CIELAB_PARAMETERS_LENGTH: u64 = 4 + 7 * 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jp2Box {
    pub box_type: [u8; 4],
    /// Absolute offset of the box contents.
    pub data_offset: u64,
    pub data_length: u64,
}

impl Jp2Box {
    pub fn end(&self) -> u64 {
        self.data_offset + self.data_length
    }
}

/// Identifies the container from the leading bytes.
pub fn detect_container(data: &[u8]) -> Option<Container> {
    if data.starts_with(&JP2_SIGNATURE) {
        Some(Container::Jp2)
    } else if data.starts_with(&MARKER_SOC.to_be_bytes()) {
        Some(Container::Codestream)
    } else {
        None
    }
}

/// Reads the container boxes (if any) and the codestream main header.
pub fn read_header(source: &mut MemoryByteSource<'_>) -> Result<WaveletHeader> {
    let mut magic = [0u8; 12];
    let available = source.remaining().min(magic.len() as u64) as usize;
    source.read_exact(&mut magic[..available])?;
    source.seek(0)?;

    match detect_container(&magic[..available]) {
        Some(Container::Codestream) => {
            let codestream = parse_main_header(source)?;
            Ok(WaveletHeader {
                container: Container::Codestream,
                codestream,
                color: ColorSpecification::None,
                codestream_offset: 0,
            })
        }
        Some(Container::Jp2) => read_jp2(source),
        None => Err(PixnormError::Header(
            "neither a JP2 signature nor a codestream SOC marker".to_string(),
        )),
    }
}

fn read_jp2(source: &mut MemoryByteSource<'_>) -> Result<WaveletHeader> {
    let end = source.len() as u64;
    source.skip(JP2_SIGNATURE.len() as i64)?;

    let mut color = None;
    while let Some(b) = read_box(source, end)? {
        log::trace!(
            "box {:?} at {} ({} bytes)",
            String::from_utf8_lossy(&b.box_type),
            b.data_offset,
            b.data_length
        );
        match b.box_type {
            BOX_JP2_HEADER => {
                color = read_jp2_header(source, &b)?;
                source.seek(b.end() as i64)?;
            }
            BOX_CODESTREAM => {
                let codestream = parse_main_header(source)?;
                return Ok(WaveletHeader {
                    container: Container::Jp2,
                    codestream,
                    color: color.unwrap_or_default(),
                    codestream_offset: b.data_offset,
                });
            }
            _ => {
                let rest = b.end() - source.position();
                source.skip(rest as i64)?;
            }
        }
    }
    Err(PixnormError::Header("JP2 container has no codestream box".to_string()))
}

/// Reads the box header at the cursor. Returns `None` when fewer than eight
/// bytes remain before `end`. The cursor is left at the start of the contents.
pub fn read_box(source: &mut MemoryByteSource<'_>, end: u64) -> Result<Option<Jp2Box>> {
    let start = source.position();
    if start + BOX_HEADER_SIZE > end {
        return Ok(None);
    }
    let lbox = source.read_u32()? as u64;
    let mut box_type = [0u8; 4];
    source.read_exact(&mut box_type)?;

    let (header, length) = match lbox {
        0 => (BOX_HEADER_SIZE, end - start),
        1 => (
            BOX_HEADER_SIZE + BOX_EXTENDED_LENGTH_SIZE,
            source.read_u64()?,
        ),
        n => (BOX_HEADER_SIZE, n),
    };
    if length < header || start.checked_add(length).is_none_or(|box_end| box_end > end) {
        return Err(PixnormError::Header(format!(
            "box {:?} at {} has invalid length {}",
            String::from_utf8_lossy(&box_type),
            start,
            length
        )));
    }
    Ok(Some(Jp2Box {
        box_type,
        data_offset: start + header,
        data_length: length - header,
    }))
}

fn read_jp2_header(
    source: &mut MemoryByteSource<'_>,
    header_box: &Jp2Box,
) -> Result<Option<ColorSpecification>> {
    let mut color = None;
    while let Some(b) = read_box(source, header_box.end())? {
        match b.box_type {
            BOX_IMAGE_HEADER if b.data_length >= 10 => {
                let height = source.read_u32()?;
                let width = source.read_u32()?;
                let components = source.read_u16()?;
                log::trace!("ihdr: {}x{}, {} components", width, height, components);
            }
            // Only the first colour specification is used.
            BOX_COLOUR_SPECIFICATION if color.is_none() => {
                color = Some(read_colour_specification(source, &b)?);
            }
            _ => {}
        }
        source.seek(b.end() as i64)?;
    }
    Ok(color)
}

fn read_colour_specification(
    source: &mut MemoryByteSource<'_>,
    colr: &Jp2Box,
) -> Result<ColorSpecification> {
    if colr.data_length < COLR_PREFIX_LENGTH {
        return Err(PixnormError::Header("truncated colr box".to_string()));
    }
    let method = source.read_u8()?;
    let _precedence = source.read_u8()?;
    let _approximation = source.read_u8()?;
    let payload = colr.data_length - COLR_PREFIX_LENGTH;

    match method {
        COLR_METHOD_ENUMERATED if payload >= 4 => {
            let code = source.read_u32()?;
            match EnumeratedColorSpace::try_from(code) {
                Ok(EnumeratedColorSpace::CieLab) => {
                    let parameters = if payload >= CIELAB_PARAMETERS_LENGTH {
                        read_lab_parameters(source)?
                    } else {
                        None
                    };
                    Ok(ColorSpecification::CieLab(parameters))
                }
                Ok(space) => Ok(ColorSpecification::Enumerated(space.into())),
                Err(_) => {
                    log::warn!("unknown enumerated colour space {}, treating as unspecified", code);
                    Ok(ColorSpecification::Enumerated(ColorSpace::Unspecified))
                }
            }
        }
        COLR_METHOD_RESTRICTED_ICC | COLR_METHOD_ANY_ICC => {
            let profile = source.slice(source.position(), payload)?;
            Ok(ColorSpecification::Icc(profile.to_vec()))
        }
        _ => {
            log::warn!("unsupported colr method {}, ignoring colour specification", method);
            Ok(ColorSpecification::None)
        }
    }
}

fn read_lab_parameters(source: &mut MemoryByteSource<'_>) -> Result<Option<LabParameters>> {
    let rl = source.read_u32()?;
    let ol = source.read_u32()?;
    let ra = source.read_u32()?;
    let oa = source.read_u32()?;
    let rb = source.read_u32()?;
    let ob = source.read_u32()?;
    let illuminant = source.read_u32()?;
    if illuminant == CIELAB_DEFAULT_ILLUMINANT {
        return Ok(None);
    }
    Ok(Some(LabParameters { rl, ol, ra, oa, rb, ob }))
}
