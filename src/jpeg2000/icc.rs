//! Colour management of decoded wavelet components with `lcms2`.
//!
//! Both entry points convert in place to three unsigned 16-bit sRGB
//! components and report whether anything was changed. A profile that cannot
//! be used is logged and the components are left as decoded.

use lcms2::{CIExyY, ColorSpaceSignature, GlobalContext, Intent, PixelFormat, Profile, Transform};

use super::color::upsample_to;
use super::image::{ColorSpace, DecodedImage, ImageComponent, LabParameters};

const OUTPUT_PRECISION: u32 = 16;

const D50: CIExyY = CIExyY {
    x: 0.3457,
    y: 0.3585,
    Y: 1.0,
};

/// Widens every component to 16 bits, sampled on the first component's grid.
fn widen(image: &DecodedImage, count: usize) -> Vec<Vec<u16>> {
    let (width, height) = (image.width(), image.height());
    image.components[..count]
        .iter()
        .map(|c| {
            let full = upsample_to(c, width, height);
            let max = full.max_value();
            let offset = full.sign_offset();
            full.data
                .iter()
                .map(|&v| ((v as i64 + offset).clamp(0, max) * 65535 / max) as u16)
                .collect()
        })
        .collect()
}

fn replace_with_rgb(image: &mut DecodedImage, rgb: &[[u16; 3]], consumed: usize) {
    let (width, height) = (image.width(), image.height());
    let mut components: Vec<ImageComponent> = (0..3)
        .map(|n| {
            let data = rgb.iter().map(|px| px[n] as i32).collect();
            ImageComponent::new(width, height, OUTPUT_PRECISION, false, data)
        })
        .collect();
    components.extend(image.components.drain(consumed..));
    image.components = components;
    image.color_space = ColorSpace::Srgb;
}

/// Applies an embedded ICC profile, converting to sRGB with perceptual intent.
///
/// Grey, RGB and CMYK profiles are supported.
pub fn apply_icc_profile(image: &mut DecodedImage, icc: &[u8]) -> bool {
    let profile = match Profile::new_icc(icc) {
        Ok(profile) => profile,
        Err(err) => {
            log::warn!("ignoring unparsable embedded ICC profile: {}", err);
            return false;
        }
    };
    let space = profile.color_space();
    let count = match space {
        ColorSpaceSignature::GrayData => 1,
        ColorSpaceSignature::RgbData => 3,
        ColorSpaceSignature::CmykData => 4,
        other => {
            log::warn!("ignoring embedded ICC profile in colour space {:?}", other);
            return false;
        }
    };
    if image.components.len() < count {
        log::warn!(
            "embedded {:?} profile needs {} components, image has {}",
            space,
            count,
            image.components.len()
        );
        return false;
    }

    let planes = widen(image, count);
    let pixels = planes[0].len();
    let srgb = Profile::new_srgb();
    let mut rgb = vec![[0u16; 3]; pixels];
    let result = match count {
        1 => Transform::<u16, [u16; 3]>::new(
            &profile,
            PixelFormat::GRAY_16,
            &srgb,
            PixelFormat::RGB_16,
            Intent::Perceptual,
        )
        .map(|t| t.transform_pixels(&planes[0], &mut rgb)),
        3 => Transform::<[u16; 3], [u16; 3]>::new(
            &profile,
            PixelFormat::RGB_16,
            &srgb,
            PixelFormat::RGB_16,
            Intent::Perceptual,
        )
        .map(|t| {
            let input: Vec<[u16; 3]> = (0..pixels)
                .map(|i| [planes[0][i], planes[1][i], planes[2][i]])
                .collect();
            t.transform_pixels(&input, &mut rgb)
        }),
        _ => Transform::<[u16; 4], [u16; 3]>::new(
            &profile,
            PixelFormat::CMYK_16,
            &srgb,
            PixelFormat::RGB_16,
            Intent::Perceptual,
        )
        .map(|t| {
            let input: Vec<[u16; 4]> = (0..pixels)
                .map(|i| [planes[0][i], planes[1][i], planes[2][i], planes[3][i]])
                .collect();
            t.transform_pixels(&input, &mut rgb)
        }),
    };
    if let Err(err) = result {
        log::warn!("cannot build transform for embedded profile: {}", err);
        return false;
    }

    log::debug!("applied embedded {:?} profile to {} pixels", space, pixels);
    replace_with_rgb(image, &rgb, count);
    true
}

/// Default range/offset parameters; each chroma offset follows the precision
/// of its own axis.
pub fn default_lab_parameters(a_precision: u32, b_precision: u32) -> LabParameters {
    let pa = a_precision.clamp(1, 31);
    let pb = b_precision.clamp(3, 31);
    LabParameters {
        rl: 100,
        ol: 0,
        ra: 170,
        oa: 1 << (pa - 1),
        rb: 200,
        ob: (1 << (pb - 2)) + (1 << (pb - 3)),
    }
}

/// Linear mapping of a code value onto `[min, min + range]`.
fn lab_axis(value: i32, precision: u32, range: u32, offset: u32) -> f64 {
    let scale = ((1u64 << precision.clamp(1, 38)) - 1) as f64;
    let min = -(range as f64 * offset as f64) / scale;
    min + value as f64 * range as f64 / scale
}

/// Converts L*, a*, b* components to sRGB through a D50 Lab v4 profile.
pub fn cielab_to_rgb(image: &mut DecodedImage, parameters: Option<LabParameters>) -> bool {
    if image.components.len() < 3 {
        log::warn!("CIELab needs 3 components, image has {}", image.components.len());
        return false;
    }
    let (width, height) = (image.width(), image.height());
    let planes: Vec<ImageComponent> = image.components[..3]
        .iter()
        .map(|c| upsample_to(c, width, height))
        .collect();
    let p = parameters
        .unwrap_or_else(|| default_lab_parameters(planes[1].precision, planes[2].precision));

    let lab = match Profile::new_lab4_context(GlobalContext::new(), &D50) {
        Ok(profile) => profile,
        Err(err) => {
            log::warn!("cannot create Lab profile: {}", err);
            return false;
        }
    };
    let transform = match Transform::<[f64; 3], [u16; 3]>::new(
        &lab,
        PixelFormat::Lab_DBL,
        &Profile::new_srgb(),
        PixelFormat::RGB_16,
        Intent::Perceptual,
    ) {
        Ok(transform) => transform,
        Err(err) => {
            log::warn!("cannot build Lab transform: {}", err);
            return false;
        }
    };

    let input: Vec<[f64; 3]> = (0..planes[0].sample_count())
        .map(|i| {
            [
                lab_axis(planes[0].data[i], planes[0].precision, p.rl, p.ol),
                lab_axis(planes[1].data[i], planes[1].precision, p.ra, p.oa),
                lab_axis(planes[2].data[i], planes[2].precision, p.rb, p.ob),
            ]
        })
        .collect();
    let mut rgb = vec![[0u16; 3]; input.len()];
    transform.transform_pixels(&input, &mut rgb);

    log::debug!("converted {} CIELab pixels to sRGB", rgb.len());
    replace_with_rgb(image, &rgb, 3);
    true
}
