//! C Foreign Function Interface for pixnorm-rs.
//!
//! Device transforms are exposed as opaque handles. Every function returns
//! `PIXNORM_OK` (0) or the `PixnormError::code` of the failure; output buffers
//! are left untouched when a call fails.

use std::os::raw::{c_int, c_uchar};
use std::ptr;
use std::slice;

use crate::color_transform::{CmykConverter, DeviceTransform};
use crate::error::{PixnormError, Result};
use crate::{DctImageDecoder, ImageInfo, WaveletImageDecoder};

pub const PIXNORM_OK: c_int = 0;
/// A required pointer argument was null.
pub const PIXNORM_NULL_ARGUMENT: c_int = -1;

/// Opaque device transform handle.
#[repr(C)]
pub struct PixnormTransform {
    _private: [u8; 0],
}

/// Image information structure.
#[repr(C)]
#[derive(Debug, Default)]
pub struct PixnormImageInfo {
    pub width: u32,
    pub height: u32,
    pub components: u32,
}

impl From<ImageInfo> for PixnormImageInfo {
    fn from(info: ImageInfo) -> Self {
        Self {
            width: info.width,
            height: info.height,
            components: info.component_count as u32,
        }
    }
}

fn status(result: Result<()>) -> c_int {
    match result {
        Ok(()) => PIXNORM_OK,
        Err(err) => {
            log::debug!("ffi call failed: {}", err);
            err.code()
        }
    }
}

unsafe fn write_info(info: *mut PixnormImageInfo, value: ImageInfo) {
    if !info.is_null() {
        unsafe { *info = value.into() };
    }
}

/// Builds a device transform from a CMYK ICC profile.
///
/// On failure `*transform` is set to null and no handle is allocated; the
/// caller may continue without CMYK support.
///
/// # Safety
/// `profile` must point to `len` readable bytes and `transform` must be writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixnorm_transform_new(
    profile: *const c_uchar,
    len: usize,
    transform: *mut *mut PixnormTransform,
) -> c_int {
    if profile.is_null() || transform.is_null() {
        return PIXNORM_NULL_ARGUMENT;
    }
    unsafe { *transform = ptr::null_mut() };
    let bytes = unsafe { slice::from_raw_parts(profile, len) };
    match DeviceTransform::from_profile(bytes) {
        Ok(device) => {
            let handle = Box::into_raw(Box::new(device)) as *mut PixnormTransform;
            unsafe { *transform = handle };
            PIXNORM_OK
        }
        Err(err) => {
            log::warn!("device profile rejected: {}", err);
            err.code()
        }
    }
}

/// Frees a transform handle. Null is ignored.
///
/// # Safety
/// `transform` must come from `pixnorm_transform_new` and not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixnorm_transform_free(transform: *mut PixnormTransform) {
    if !transform.is_null() {
        let _ = unsafe { Box::from_raw(transform as *mut DeviceTransform) };
    }
}

unsafe fn transform_ref<'a>(transform: *const PixnormTransform) -> Option<&'a DeviceTransform> {
    unsafe { (transform as *const DeviceTransform).as_ref() }
}

/// Converts `pixel_count` CMYK pixels to RGBA.
///
/// # Safety
/// `input` and `output` must each point to `4 * pixel_count` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixnorm_convert_cmyk_buffer(
    transform: *const PixnormTransform,
    input: *const c_uchar,
    pixel_count: usize,
    output: *mut c_uchar,
) -> c_int {
    let Some(device) = (unsafe { transform_ref(transform) }) else {
        return PixnormError::NotConfigured.code();
    };
    if input.is_null() || output.is_null() {
        return PIXNORM_NULL_ARGUMENT;
    }
    let Some(len) = pixel_count.checked_mul(4) else {
        return PixnormError::BufferSize { expected: usize::MAX, actual: 0 }.code();
    };
    let input = unsafe { slice::from_raw_parts(input, len) };
    let output = unsafe { slice::from_raw_parts_mut(output, len) };
    status(device.convert_batch(input, pixel_count, output))
}

/// Converts one CMYK pixel, writing three bytes to `rgb`.
///
/// # Safety
/// `rgb` must point to 3 writable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixnorm_convert_cmyk_pixel(
    transform: *const PixnormTransform,
    c: c_uchar,
    m: c_uchar,
    y: c_uchar,
    k: c_uchar,
    rgb: *mut c_uchar,
) -> c_int {
    let Some(device) = (unsafe { transform_ref(transform) }) else {
        return PixnormError::NotConfigured.code();
    };
    if rgb.is_null() {
        return PIXNORM_NULL_ARGUMENT;
    }
    let out = device.convert_single(c, m, y, k);
    unsafe { ptr::copy_nonoverlapping(out.as_ptr(), rgb, out.len()) };
    PIXNORM_OK
}

/// Reads a JPEG header.
///
/// # Safety
/// `input` must point to `len` bytes; `info` must be writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixnorm_dct_read_info(
    input: *const c_uchar,
    len: usize,
    info: *mut PixnormImageInfo,
) -> c_int {
    if input.is_null() || info.is_null() {
        return PIXNORM_NULL_ARGUMENT;
    }
    let data = unsafe { slice::from_raw_parts(input, len) };
    status(DctImageDecoder::new(data).read_info().map(|value| unsafe { write_info(info, value) }))
}

/// Decodes a JPEG into `output` (`width * height * 4` bytes).
///
/// `transform` may be null when the image is known not to be CMYK.
///
/// # Safety
/// `input` must point to `len` bytes, `output` to `output_len` writable bytes.
/// `info` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixnorm_decode_dct(
    input: *const c_uchar,
    len: usize,
    transform: *const PixnormTransform,
    output: *mut c_uchar,
    output_len: usize,
    info: *mut PixnormImageInfo,
) -> c_int {
    if input.is_null() || output.is_null() {
        return PIXNORM_NULL_ARGUMENT;
    }
    let data = unsafe { slice::from_raw_parts(input, len) };
    let output = unsafe { slice::from_raw_parts_mut(output, output_len) };
    let converter = unsafe { transform_ref(transform) }.map(|t| t as &dyn CmykConverter);
    status(
        DctImageDecoder::new(data)
            .decode(converter, output)
            .map(|value| unsafe { write_info(info, value) }),
    )
}

/// Reads JP2 boxes and the codestream main header.
///
/// # Safety
/// `input` must point to `len` bytes; `info` must be writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixnorm_wavelet_read_info(
    input: *const c_uchar,
    len: usize,
    info: *mut PixnormImageInfo,
) -> c_int {
    if input.is_null() || info.is_null() {
        return PIXNORM_NULL_ARGUMENT;
    }
    let data = unsafe { slice::from_raw_parts(input, len) };
    status(WaveletImageDecoder::new(data).read_info().map(|value| unsafe { write_info(info, value) }))
}

/// Decodes a JP2 file or raw codestream into `output`.
///
/// # Safety
/// `input` must point to `len` bytes, `output` to `output_len` writable bytes.
/// `info` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixnorm_decode_wavelet(
    input: *const c_uchar,
    len: usize,
    output: *mut c_uchar,
    output_len: usize,
    info: *mut PixnormImageInfo,
) -> c_int {
    if input.is_null() || output.is_null() {
        return PIXNORM_NULL_ARGUMENT;
    }
    let data = unsafe { slice::from_raw_parts(input, len) };
    let output = unsafe { slice::from_raw_parts_mut(output, output_len) };
    status(
        WaveletImageDecoder::new(data)
            .decode(output)
            .map(|value| unsafe { write_info(info, value) }),
    )
}
