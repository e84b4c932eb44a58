//! Colour-space resolution and normalisation of decoded components to RGBA8.

use super::image::{ColorSpace, DecodedImage, ImageComponent};
use crate::canonical::{check_output, put_gray, put_rgb};
use crate::config::DecodeRegion;
use crate::error::{PixnormError, Result};

/// Resolves the colour model of a decoded image.
///
/// Many encoders omit colour signalling. When the declared space does not
/// match the component count, three components whose first plane is
/// sampled evenly but whose second plane is sampled differently are taken as
/// luma/chroma, and one or two components are taken as greyscale.
/// `subsampling` holds the `(dx, dy)` factors of each component.
pub fn infer_color_space(declared: ColorSpace, subsampling: &[(u32, u32)]) -> ColorSpace {
    let count = subsampling.len();
    if declares_matching_space(declared, count) {
        return declared;
    }
    match subsampling {
        [first, second, _] if first.0 == first.1 && second != first => ColorSpace::Sycc,
        _ if count <= 2 => ColorSpace::Gray,
        _ => declared,
    }
}

fn declares_matching_space(declared: ColorSpace, count: usize) -> bool {
    match declared {
        ColorSpace::Unspecified => false,
        ColorSpace::Gray => (1..=2).contains(&count),
        ColorSpace::Srgb | ColorSpace::Sycc | ColorSpace::ESycc | ColorSpace::CieLab => count >= 3,
        ColorSpace::Cmyk => count >= 4,
    }
}

/// Maps a coordinate on a `full`-wide axis onto an axis of `size` samples.
#[inline]
fn nearest(pos: u32, full: u32, size: u32) -> u32 {
    if size == full {
        pos
    } else {
        ((pos as u64 * size as u64 / full as u64) as u32).min(size - 1)
    }
}

#[inline]
fn sample_at(c: &ImageComponent, x: u32, y: u32, width: u32, height: u32) -> i32 {
    let sx = nearest(x, width, c.width);
    let sy = nearest(y, height, c.height);
    c.data[sy as usize * c.width as usize + sx as usize]
}

/// Nearest-neighbour resample of `c` onto a `width` x `height` grid.
pub fn upsample_to(c: &ImageComponent, width: u32, height: u32) -> ImageComponent {
    if c.width == width && c.height == height {
        return c.clone();
    }
    let mut data = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            data.push(sample_at(c, x, y, width, height));
        }
    }
    ImageComponent {
        width,
        height,
        precision: c.precision,
        signed: c.signed,
        dx: c.dx,
        dy: c.dy,
        data,
    }
}

/// Checks that every component is non-empty and holds `width * height` samples.
pub fn validate_components(image: &DecodedImage) -> Result<()> {
    for (index, c) in image.components.iter().enumerate() {
        if c.width == 0 || c.height == 0 || c.data.len() != c.sample_count() {
            return Err(PixnormError::Codec(format!(
                "component {} is {}x{} with {} samples",
                index,
                c.width,
                c.height,
                c.data.len()
            )));
        }
    }
    Ok(())
}

/// Restricts every component to `region`, given in first-component pixel coordinates.
pub fn crop(image: &mut DecodedImage, region: &DecodeRegion) {
    let (width, height) = (image.width(), image.height());
    if region.is_full(width, height) {
        return;
    }
    for c in &mut image.components {
        let x0 = (region.x0 as u64 * c.width as u64 / width as u64) as u32;
        let y0 = (region.y0 as u64 * c.height as u64 / height as u64) as u32;
        let x1 = ((region.x1 as u64 * c.width as u64).div_ceil(width as u64) as u32).max(x0 + 1);
        let y1 = ((region.y1 as u64 * c.height as u64).div_ceil(height as u64) as u32).max(y0 + 1);
        let mut data = Vec::with_capacity((x1 - x0) as usize * (y1 - y0) as usize);
        for y in y0..y1 {
            let row = y as usize * c.width as usize;
            data.extend_from_slice(&c.data[row + x0 as usize..row + x1 as usize]);
        }
        c.width = x1 - x0;
        c.height = y1 - y0;
        c.data = data;
    }
}

/// Converts three luma/chroma components to RGB at the luma precision.
/// Chroma planes are upsampled to the luma plane first.
pub fn sycc_to_rgb(image: &mut DecodedImage) -> bool {
    if image.components.len() != 3 {
        return false;
    }
    let luma = &image.components[0];
    let (width, height) = (luma.width, luma.height);
    let precision = luma.precision.clamp(1, 31);
    let upper = (1i64 << precision) - 1;
    let y_offset = luma.sign_offset();
    let cb = upsample_to(&image.components[1], width, height);
    let cr = upsample_to(&image.components[2], width, height);
    let cb_centre = if cb.signed { 0 } else { 1i64 << (cb.precision.clamp(1, 31) - 1) };
    let cr_centre = if cr.signed { 0 } else { 1i64 << (cr.precision.clamp(1, 31) - 1) };

    let count = luma.sample_count();
    let mut r = Vec::with_capacity(count);
    let mut g = Vec::with_capacity(count);
    let mut b = Vec::with_capacity(count);
    for i in 0..count {
        let y = luma.data[i] as i64 + y_offset;
        let cb = (cb.data[i] as i64 - cb_centre) as f64;
        let cr = (cr.data[i] as i64 - cr_centre) as f64;
        r.push((y + (1.402 * cr) as i64).clamp(0, upper) as i32);
        g.push((y - (0.344 * cb + 0.714 * cr) as i64).clamp(0, upper) as i32);
        b.push((y + (1.772 * cb) as i64).clamp(0, upper) as i32);
    }

    let (dx, dy) = (luma.dx, luma.dy);
    image.components = [r, g, b]
        .into_iter()
        .map(|data| ImageComponent {
            width,
            height,
            precision,
            signed: false,
            dx,
            dy,
            data,
        })
        .collect();
    image.color_space = ColorSpace::Srgb;
    true
}

/// Converts extended-gamut luma/chroma (e-sYCC) to RGB at the luma precision.
///
/// Unsigned chroma is centred on `2^(precision-1)` of the luma component.
/// Components past the third are kept after the RGB planes.
pub fn esycc_to_rgb(image: &mut DecodedImage) -> bool {
    if image.components.len() < 3 {
        return false;
    }
    let luma = &image.components[0];
    let (width, height) = (luma.width, luma.height);
    let precision = luma.precision.clamp(1, 31);
    let upper = (1i64 << precision) - 1;
    let flip = 1i64 << (precision - 1);
    let cb = upsample_to(&image.components[1], width, height);
    let cr = upsample_to(&image.components[2], width, height);
    let cb_centre = if cb.signed { 0 } else { flip };
    let cr_centre = if cr.signed { 0 } else { flip };

    let count = luma.sample_count();
    let mut planes = [
        Vec::with_capacity(count),
        Vec::with_capacity(count),
        Vec::with_capacity(count),
    ];
    for i in 0..count {
        let y = luma.data[i] as f64;
        let cb = (cb.data[i] as i64 - cb_centre) as f64;
        let cr = (cr.data[i] as i64 - cr_centre) as f64;
        let rgb = [
            y - 0.0000368 * cb + 1.40199 * cr,
            1.0003 * y - 0.344125 * cb - 0.7141128 * cr,
            0.999823 * y + 1.77204 * cb - 0.000008 * cr,
        ];
        for (plane, v) in planes.iter_mut().zip(rgb) {
            plane.push(((v + 0.5) as i64).clamp(0, upper) as i32);
        }
    }

    let (dx, dy) = (luma.dx, luma.dy);
    let mut components: Vec<ImageComponent> = planes
        .into_iter()
        .map(|data| ImageComponent {
            width,
            height,
            precision,
            signed: false,
            dx,
            dy,
            data,
        })
        .collect();
    components.extend(image.components.drain(3..));
    image.components = components;
    image.color_space = ColorSpace::Srgb;
    true
}

/// Profile-less CMYK to RGB: `R = 255 (1 - C)(1 - K)` and so on.
/// Components past the fourth are kept after the RGB planes.
pub fn cmyk_to_rgb(image: &mut DecodedImage) -> bool {
    if image.components.len() < 4 {
        return false;
    }
    let (width, height) = (image.width(), image.height());
    let inks: Vec<ImageComponent> = image.components[..4]
        .iter()
        .map(|c| upsample_to(c, width, height))
        .collect();
    let scale: Vec<f64> = inks.iter().map(|c| 1.0 / c.max_value() as f64).collect();

    let count = inks[0].sample_count();
    let mut planes = [
        Vec::with_capacity(count),
        Vec::with_capacity(count),
        Vec::with_capacity(count),
    ];
    for i in 0..count {
        let coverage = |n: usize| {
            let c = &inks[n];
            1.0 - ((c.data[i] as i64 + c.sign_offset()) as f64 * scale[n]).clamp(0.0, 1.0)
        };
        let k = coverage(3);
        for (n, plane) in planes.iter_mut().enumerate() {
            plane.push((255.0 * coverage(n) * k) as i32);
        }
    }

    let mut components: Vec<ImageComponent> = planes
        .into_iter()
        .map(|data| ImageComponent::new(width, height, 8, false, data))
        .collect();
    components.extend(image.components.drain(4..));
    image.components = components;
    image.color_space = ColorSpace::Srgb;
    true
}

/// Reduces one decoded sample to an unsigned 8-bit value.
///
/// Signed samples are re-centred by `2^(precision-1)`. Precision above 8 bits
/// is shifted down with the next lower bit added back as a rounding term.
#[inline]
pub fn normalize_sample(value: i32, precision: u32, signed: bool) -> u8 {
    let precision = precision.clamp(1, 38);
    let mut v = value as i64;
    if signed {
        v += 1i64 << (precision - 1);
    }
    if precision > 8 {
        let shift = precision - 8;
        v = (v >> shift) + ((v >> (shift - 1)) % 2);
    }
    v.clamp(0, 255) as u8
}

/// Writes one or three components into a canonical RGBA8 buffer.
///
/// Every check happens before the first byte of `output` is written.
pub fn pack_rgba(image: &DecodedImage, output: &mut [u8]) -> Result<()> {
    let count = image.components.len();
    if count != 1 && count != 3 {
        return Err(PixnormError::UnsupportedShape {
            codec: "wavelet",
            components: count,
        });
    }
    validate_components(image)?;
    let (width, height) = (image.width(), image.height());
    check_output(width, height, output)?;

    let comps = &image.components;
    for y in 0..height {
        for x in 0..width {
            let index = y as usize * width as usize + x as usize;
            let level = |c: &ImageComponent| {
                normalize_sample(sample_at(c, x, y, width, height), c.precision, c.signed)
            };
            if count == 1 {
                put_gray(output, index, level(&comps[0]));
            } else {
                put_rgb(output, index, level(&comps[0]), level(&comps[1]), level(&comps[2]));
            }
        }
    }
    Ok(())
}
