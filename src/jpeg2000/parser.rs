//! JPEG 2000 codestream main-header reader.
//!
//! Only SOC and the SIZ segment that must immediately follow it are read;
//! everything after SIZ belongs to the sample decoder.

use super::image::{CodestreamHeader, ComponentInfo};
use crate::byte_source::MemoryByteSource;
use crate::constants::{MARKER_SIZ, MARKER_SOC, MAXIMUM_COMPONENT_COUNT, MAXIMUM_PRECISION};
use crate::error::{PixnormError, Result};

// Lsiz covers itself, Rsiz, eight 32-bit extents and Csiz.
const SIZ_FIXED_LENGTH: u16 = 38;
const SIZ_COMPONENT_LENGTH: u16 = 3;

/// Reads SOC and SIZ at the source cursor.
pub fn parse_main_header(source: &mut MemoryByteSource<'_>) -> Result<CodestreamHeader> {
    let soc = source.read_u16()?;
    if soc != MARKER_SOC {
        return Err(PixnormError::Header(format!(
            "expected SOC marker, found {:#06X}",
            soc
        )));
    }
    let siz = source.read_u16()?;
    if siz != MARKER_SIZ {
        return Err(PixnormError::Header(format!(
            "expected SIZ marker after SOC, found {:#06X}",
            siz
        )));
    }
    parse_siz(source)
}

fn parse_siz(source: &mut MemoryByteSource<'_>) -> Result<CodestreamHeader> {
    let len = source.read_u16()?;
    let _caps = source.read_u16()?; // Rsiz
    let grid_width = source.read_u32()?;
    let grid_height = source.read_u32()?;
    let x_origin = source.read_u32()?;
    let y_origin = source.read_u32()?;
    let _tile_width = source.read_u32()?;
    let _tile_height = source.read_u32()?;
    let _tile_x_origin = source.read_u32()?;
    let _tile_y_origin = source.read_u32()?;
    let count = source.read_u16()?;

    if count == 0 || count > MAXIMUM_COMPONENT_COUNT {
        return Err(PixnormError::Header(format!("invalid component count {}", count)));
    }
    if len != SIZ_FIXED_LENGTH + SIZ_COMPONENT_LENGTH * count {
        return Err(PixnormError::Header(format!(
            "SIZ length {} does not match {} components",
            len, count
        )));
    }
    if grid_width <= x_origin || grid_height <= y_origin {
        return Err(PixnormError::Header(format!(
            "empty image area: grid {}x{}, origin ({}, {})",
            grid_width, grid_height, x_origin, y_origin
        )));
    }

    let mut components = Vec::with_capacity(count as usize);
    for index in 0..count {
        let depth_byte = source.read_u8()?;
        let precision = (depth_byte & 0x7F) + 1;
        let signed = (depth_byte & 0x80) != 0;
        let dx = source.read_u8()?;
        let dy = source.read_u8()?;
        if precision > MAXIMUM_PRECISION || dx == 0 || dy == 0 {
            return Err(PixnormError::Header(format!(
                "component {}: precision {}, sub-sampling {}x{}",
                index, precision, dx, dy
            )));
        }
        components.push(ComponentInfo {
            precision,
            signed,
            dx,
            dy,
        });
    }

    log::trace!(
        "SIZ: grid {}x{} origin ({}, {}), {} components",
        grid_width,
        grid_height,
        x_origin,
        y_origin,
        count
    );

    Ok(CodestreamHeader {
        grid_width,
        grid_height,
        x_origin,
        y_origin,
        components,
    })
}
