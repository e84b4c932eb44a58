//! DCT decoder tests over hand-assembled baseline JPEGs.

mod common;

use std::cell::RefCell;

use common::{cmyk_jpeg, cmyk_profile, grey_jpeg, lossless_jpeg, ycbcr_jpeg};
use pixnorm_rs::jpeg1::expand_samples;
use pixnorm_rs::{
    CmykConverter, DctImageDecoder, DecodeOptions, DecodeRegion, DeviceTransform, PixnormError, decode_dct,
    read_dct_info, setup,
};

/// Remembers the samples it was handed and writes mid grey.
#[derive(Default)]
struct Recorder(RefCell<Vec<u8>>);

impl CmykConverter for Recorder {
    fn convert(&self, input: &[u8], output: &mut [u8]) {
        self.0.borrow_mut().extend_from_slice(input);
        output.fill(128);
    }
}

fn close(a: u8, b: u8) -> bool {
    (a as i32 - b as i32).abs() <= 1
}

#[test]
fn greyscale_header() {
    let info = read_dct_info(&grey_jpeg()).unwrap();
    assert_eq!((info.width, info.height, info.component_count), (16, 1, 1));
    assert_eq!(info.rgba_len(), Some(64));
}

#[test]
fn greyscale_decode_replicates_channels() {
    let data = grey_jpeg();
    let mut out = vec![0u8; 64];
    decode_dct(&data, None, &mut out).unwrap();
    for (i, px) in out.chunks_exact(4).enumerate() {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);
        let want = if i < 8 { 0 } else { 255 };
        assert!(close(px[0], want), "pixel {}: {:?}", i, px);
    }
}

#[test]
fn three_components_decode_to_opaque_rgb() {
    let data = ycbcr_jpeg();
    let info = read_dct_info(&data).unwrap();
    assert_eq!(info.component_count, 3);
    let mut out = vec![0xAAu8; info.rgba_len().unwrap()];
    decode_dct(&data, None, &mut out).unwrap();
    for px in out.chunks_exact(4) {
        assert!(px[..3].iter().all(|&v| v <= 1), "{:?}", px);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn four_components_reach_the_transform_as_stored() {
    let data = cmyk_jpeg();
    let recorder = Recorder::default();
    let mut out = vec![0u8; 8 * 8 * 4];
    let info = DctImageDecoder::new(&data).decode(Some(&recorder), &mut out).unwrap();
    assert_eq!(info.component_count, 4);

    let seen = recorder.0.borrow();
    assert_eq!(seen.len(), 8 * 8 * 4);
    assert!(seen.iter().all(|&v| v <= 1), "first pixel {:?}", &seen[..4]);
    assert!(out.chunks_exact(4).all(|px| px == [128, 128, 128, 255]));
}

#[test]
fn four_components_without_ink_decode_to_white() {
    let transform = setup(&cmyk_profile()).unwrap();
    let data = cmyk_jpeg();
    let mut out = vec![0u8; 8 * 8 * 4];
    decode_dct(&data, Some(&transform), &mut out).unwrap();
    for px in out.chunks_exact(4) {
        assert!(px[..3].iter().all(|&v| v >= 245), "{:?}", px);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn four_components_without_transform_are_not_configured() {
    let mut out = vec![0u8; 8 * 8 * 4];
    assert_eq!(decode_dct(&cmyk_jpeg(), None, &mut out), Err(PixnormError::NotConfigured));
}

#[test]
fn twelve_bit_lossless_is_reduced_by_its_own_precision() {
    let data = lossless_jpeg();
    let info = read_dct_info(&data).unwrap();
    assert_eq!((info.width, info.height, info.component_count), (2, 1, 1));
    let mut out = vec![0u8; 8];
    decode_dct(&data, None, &mut out).unwrap();
    assert_eq!(out, vec![255, 255, 255, 255, 128, 128, 128, 255]);
}

#[test]
fn region_of_greyscale_image() {
    let data = grey_jpeg();
    let options = DecodeOptions::default().with_region(DecodeRegion::new(6, 0, 10, 1));
    let decoder = DctImageDecoder::with_options(&data, options);
    let info = decoder.read_info().unwrap();
    assert_eq!((info.width, info.height), (4, 1));
    let mut out = vec![0u8; 16];
    decoder.decode(None, &mut out).unwrap();
    let levels: Vec<u8> = out.chunks_exact(4).map(|px| px[0]).collect();
    assert!(close(levels[1], 0) && close(levels[2], 255), "{:?}", levels);
}

#[test]
fn malformed_header_writes_nothing() {
    let mut data = grey_jpeg();
    data.truncate(30);
    let mut out = vec![0x55u8; 64];
    let err = decode_dct(&data, None, &mut out).unwrap_err();
    assert!(err.is_header_error(), "{:?}", err);
    assert!(out.iter().all(|&b| b == 0x55));
}

#[test]
fn output_must_be_sized_from_header() {
    let data = grey_jpeg();
    let mut out = vec![0u8; 60];
    assert_eq!(
        decode_dct(&data, None, &mut out),
        Err(PixnormError::BufferSize { expected: 64, actual: 60 })
    );
}

#[test]
fn pixel_limit_applies() {
    let data = grey_jpeg();
    let options = DecodeOptions::default().with_max_pixels(15);
    let err = DctImageDecoder::with_options(&data, options).read_info().unwrap_err();
    assert_eq!(err, PixnormError::TooLarge { pixels: 16, limit: 15 });
}

#[test]
fn scenario_grey_two_pixels() {
    let mut out = [0u8; 8];
    expand_samples(1, &[0, 255], None, &mut out).unwrap();
    assert_eq!(out, [0, 0, 0, 255, 255, 255, 255, 255]);
}

#[test]
fn scenario_rgb_single_pixel() {
    let mut out = [0u8; 4];
    expand_samples(3, &[10, 20, 30], None, &mut out).unwrap();
    assert_eq!(out, [10, 20, 30, 255]);
}

#[test]
fn cmyk_expansion_matches_device_transform() {
    let transform = DeviceTransform::from_profile(&cmyk_profile()).unwrap();
    let plane = [0, 0, 0, 0, 255, 0, 0, 0, 0, 0, 0, 255, 40, 80, 120, 160];

    let mut expected = [0u8; 16];
    transform.convert_batch(&plane, 4, &mut expected).unwrap();
    for px in expected.chunks_exact_mut(4) {
        px[3] = 255;
    }

    let mut out = [0u8; 16];
    expand_samples(4, &plane, Some(&transform), &mut out).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn unsupported_component_count() {
    let mut out = [0u8; 4];
    let err = expand_samples(2, &[0, 0], None, &mut out).unwrap_err();
    assert_eq!(err, PixnormError::UnsupportedShape { codec: "DCT", components: 2 });
}
