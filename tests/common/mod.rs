//! In-memory builders for test inputs: JP2 containers, codestream headers,
//! minimal baseline JPEGs and a small CMYK printer profile.

#![allow(dead_code)]

use pixnorm_rs::error::Result;
use pixnorm_rs::jpeg2000::{CodestreamDecoder, ImageComponent};

/// Returns fixed components regardless of input.
pub struct StubCodec(pub Vec<ImageComponent>);

impl CodestreamDecoder for StubCodec {
    fn decode(&self, _data: &[u8]) -> Result<Vec<ImageComponent>> {
        Ok(self.0.clone())
    }
}

pub fn plane(width: u32, height: u32, precision: u32, signed: bool, data: Vec<i32>) -> ImageComponent {
    ImageComponent::new(width, height, precision, signed, data)
}

/// SOC + SIZ + a bare SOT marker; each component is (precision, signed, dx, dy).
pub fn codestream(width: u32, height: u32, comps: &[(u8, bool, u8, u8)]) -> Vec<u8> {
    let mut out = main_header(width, height, comps);
    // SOT so the codestream does not end right after SIZ.
    out.extend_from_slice(&[0xFF, 0x90]);
    out
}

fn main_header(width: u32, height: u32, comps: &[(u8, bool, u8, u8)]) -> Vec<u8> {
    let mut out = vec![0xFF, 0x4F, 0xFF, 0x51];
    out.extend_from_slice(&(38 + 3 * comps.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    for v in [width, height, 0, 0, width, height, 0, 0] {
        out.extend_from_slice(&v.to_be_bytes());
    }
    out.extend_from_slice(&(comps.len() as u16).to_be_bytes());
    for &(precision, signed, dx, dy) in comps {
        out.push((precision - 1) | if signed { 0x80 } else { 0 });
        out.push(dx);
        out.push(dy);
    }
    out
}

/// Complete single-tile codestream whose coefficients are all zero.
///
/// COD: one layer, no decomposition levels, reversible 5-3. QCD: no
/// quantisation. Every component contributes one empty packet, so unsigned
/// samples decode to the mid level.
pub fn decodable_codestream(width: u32, height: u32, comps: &[(u8, bool, u8, u8)]) -> Vec<u8> {
    let mut out = main_header(width, height, comps);
    out.extend(segment(0x52, &[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x04, 0x04, 0x00, 0x01]));
    out.extend(segment(0x5C, &[0x40, 0x40]));

    let packets = comps.len() as u32;
    let tile_part_length = 12 + 2 + packets;
    let mut sot = 0u16.to_be_bytes().to_vec();
    sot.extend_from_slice(&tile_part_length.to_be_bytes());
    sot.extend_from_slice(&[0, 1]);
    out.extend(segment(0x90, &sot));
    out.extend_from_slice(&[0xFF, 0x93]);
    out.extend(std::iter::repeat_n(0x00, packets as usize));
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

pub fn jp2_box(box_type: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(box_type);
    out.extend_from_slice(payload);
    out
}

pub fn enumerated_colr(code: u32) -> Vec<u8> {
    let mut payload = vec![1, 0, 0];
    payload.extend_from_slice(&code.to_be_bytes());
    payload
}

pub fn icc_colr(profile: &[u8]) -> Vec<u8> {
    let mut payload = vec![2, 0, 0];
    payload.extend_from_slice(profile);
    payload
}

/// Signature, `ftyp`, `jp2h` (with `ihdr` and an optional `colr`), `jp2c`.
pub fn jp2_file(colr: Option<Vec<u8>>, codestream: &[u8]) -> Vec<u8> {
    let mut out = b"\x00\x00\x00\x0CjP  \r\n\x87\n".to_vec();
    out.extend(jp2_box(b"ftyp", b"jp2 \x00\x00\x00\x00jp2 "));
    let mut header = jp2_box(b"ihdr", &[0; 14]);
    if let Some(payload) = colr {
        header.extend(jp2_box(b"colr", &payload));
    }
    out.extend(jp2_box(b"jp2h", &header));
    out.extend(jp2_box(b"jp2c", codestream));
    out
}

fn segment(marker: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, marker];
    out.extend_from_slice(&((body.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(body);
    out
}

/// Baseline JPEG with one 8x8 block per component per MCU and no subsampling.
///
/// Quantisation gives DC a step of 8, so a DC value `d` decodes to `128 + d`.
/// The DC table codes category 0 as `00` and category 8 as `01`; the AC
/// table only has EOB (`00`). `scan` is the entropy-coded data.
pub fn baseline_jpeg(width: u16, height: u16, components: u8, scan: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];

    let mut dqt = vec![0x00, 8];
    dqt.extend_from_slice(&[1; 63]);
    out.extend(segment(0xDB, &dqt));

    let mut sof = vec![8];
    sof.extend_from_slice(&height.to_be_bytes());
    sof.extend_from_slice(&width.to_be_bytes());
    sof.push(components);
    for id in 1..=components {
        sof.extend_from_slice(&[id, 0x11, 0]);
    }
    out.extend(segment(0xC0, &sof));

    let mut dc = vec![0x00, 0, 2];
    dc.extend_from_slice(&[0; 14]);
    dc.extend_from_slice(&[0x00, 0x08]);
    out.extend(segment(0xC4, &dc));

    let mut ac = vec![0x10, 0, 1];
    ac.extend_from_slice(&[0; 14]);
    ac.push(0x00);
    out.extend(segment(0xC4, &ac));

    let mut sos = vec![components];
    for id in 1..=components {
        sos.extend_from_slice(&[id, 0x00]);
    }
    sos.extend_from_slice(&[0, 63, 0]);
    out.extend(segment(0xDA, &sos));

    out.extend_from_slice(scan);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// 16x1 greyscale: left block black, right block white.
pub fn grey_jpeg() -> Vec<u8> {
    // 01 01111111 00 | 01 11111111 00
    baseline_jpeg(16, 1, 1, &[0x5F, 0xC7, 0xFC])
}

/// 8x8 three-component: Y black, neutral chroma.
pub fn ycbcr_jpeg() -> Vec<u8> {
    // 01 01111111 00 | 00 00 | 00 00 | 1111 padding
    baseline_jpeg(8, 8, 3, &[0x5F, 0xC0, 0x0F])
}

/// 8x8 four-component with every stored sample 0 and no Adobe marker.
pub fn cmyk_jpeg() -> Vec<u8> {
    // (01 01111111 00) per component
    baseline_jpeg(8, 8, 4, &[0x5F, 0xC5, 0xFC, 0x5F, 0xC5, 0xFC])
}

/// 2x1 lossless (SOF3) greyscale at 12 bits with the left-neighbour predictor.
///
/// The difference table codes category 0 as `00` and category 11 as `01`.
/// Samples decode to 4095 (+2047 from the 2048 start value) and 2048 (-2047).
pub fn lossless_jpeg() -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    out.extend(segment(0xC3, &[12, 0, 1, 0, 2, 1, 1, 0x11, 0]));

    let mut table = vec![0x00, 0, 2];
    table.extend_from_slice(&[0; 14]);
    table.extend_from_slice(&[0x00, 0x0B]);
    out.extend(segment(0xC4, &table));

    out.extend(segment(0xDA, &[1, 1, 0x00, 1, 0, 0]));
    // 01 11111111111 | 01 00000000000 | 111111 padding
    out.extend_from_slice(&[0x7F, 0xFA, 0x00, 0x3F]);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

fn s15(v: f64) -> [u8; 4] {
    ((v * 65536.0).round() as i32).to_be_bytes()
}

/// Version 2 output profile (CMYK -> Lab) whose only A2B0 lut makes
/// lightness depend on K (`L = 100 (1 - K)`) and pushes cyan towards
/// negative a*/b*.
pub fn cmyk_profile() -> Vec<u8> {
    const LUT_OFFSET: u32 = 156;
    const LUT_SIZE: u32 = 176;
    const WTPT_OFFSET: u32 = LUT_OFFSET + LUT_SIZE;
    const WTPT_SIZE: u32 = 20;
    const TOTAL: u32 = WTPT_OFFSET + WTPT_SIZE;

    let mut p = Vec::with_capacity(TOTAL as usize);
    p.extend_from_slice(&TOTAL.to_be_bytes());
    p.extend_from_slice(&[0; 4]);
    p.extend_from_slice(&0x0210_0000u32.to_be_bytes());
    p.extend_from_slice(b"prtr");
    p.extend_from_slice(b"CMYK");
    p.extend_from_slice(b"Lab ");
    p.extend_from_slice(&[0; 12]);
    p.extend_from_slice(b"acsp");
    p.extend_from_slice(&[0; 28]);
    p.extend_from_slice(&0x0000_F6D6u32.to_be_bytes());
    p.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    p.extend_from_slice(&0x0000_D32Du32.to_be_bytes());
    p.resize(128, 0);

    p.extend_from_slice(&2u32.to_be_bytes());
    for (sig, offset, size) in [(b"A2B0", LUT_OFFSET, LUT_SIZE), (b"wtpt", WTPT_OFFSET, WTPT_SIZE)] {
        p.extend_from_slice(sig);
        p.extend_from_slice(&offset.to_be_bytes());
        p.extend_from_slice(&size.to_be_bytes());
    }
    assert_eq!(p.len(), LUT_OFFSET as usize);

    p.extend_from_slice(b"mft2");
    p.extend_from_slice(&[0; 4]);
    p.extend_from_slice(&[4, 3, 2, 0]);
    for i in 0..9 {
        p.extend_from_slice(&s15(if i % 4 == 0 { 1.0 } else { 0.0 }));
    }
    p.extend_from_slice(&2u16.to_be_bytes());
    p.extend_from_slice(&2u16.to_be_bytes());
    for _ in 0..4 {
        p.extend_from_slice(&0u16.to_be_bytes());
        p.extend_from_slice(&0xFFFFu16.to_be_bytes());
    }
    // Grid order: C slowest, K fastest.
    for index in 0..16u32 {
        let (c, k) = ((index >> 3) & 1, index & 1);
        let lightness = if k == 1 { 0.0 } else { 100.0 };
        let chroma = if c == 1 && k == 0 { -40.0 } else { 0.0 };
        let l16 = (lightness * 65280.0 / 100.0) as u16;
        let ab16 = ((chroma + 128.0) * 256.0) as u16;
        for v in [l16, ab16, ab16] {
            p.extend_from_slice(&v.to_be_bytes());
        }
    }
    for _ in 0..3 {
        p.extend_from_slice(&0u16.to_be_bytes());
        p.extend_from_slice(&0xFFFFu16.to_be_bytes());
    }
    assert_eq!(p.len(), WTPT_OFFSET as usize);

    p.extend_from_slice(b"XYZ ");
    p.extend_from_slice(&[0; 4]);
    p.extend_from_slice(&s15(0.9642));
    p.extend_from_slice(&s15(1.0));
    p.extend_from_slice(&s15(0.8249));
    assert_eq!(p.len(), TOTAL as usize);
    p
}
