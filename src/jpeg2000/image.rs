use crate::constants::EnumeratedColorSpace;

/// Colour model used to interpret decoded components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// No colour signalling (raw codestream, or an enumerated space we do not know).
    #[default]
    Unspecified,
    Srgb,
    Gray,
    /// Luma/chroma (YCbCr) representation.
    Sycc,
    ESycc,
    Cmyk,
    CieLab,
}

impl From<EnumeratedColorSpace> for ColorSpace {
    fn from(value: EnumeratedColorSpace) -> Self {
        match value {
            EnumeratedColorSpace::Cmyk => ColorSpace::Cmyk,
            EnumeratedColorSpace::CieLab => ColorSpace::CieLab,
            EnumeratedColorSpace::Srgb => ColorSpace::Srgb,
            EnumeratedColorSpace::Greyscale => ColorSpace::Gray,
            EnumeratedColorSpace::Sycc => ColorSpace::Sycc,
            EnumeratedColorSpace::ESycc => ColorSpace::ESycc,
        }
    }
}

/// Range/offset parameters of an enumerated CIELab `colr` box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabParameters {
    pub rl: u32,
    pub ol: u32,
    pub ra: u32,
    pub oa: u32,
    pub rb: u32,
    pub ob: u32,
}

/// Colour data carried by the container, taken from the first `colr` box.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColorSpecification {
    #[default]
    None,
    Enumerated(ColorSpace),
    /// CIELab with explicit parameters, or `None` for the defaults.
    CieLab(Option<LabParameters>),
    /// Embedded ICC profile. An empty payload is a declared-but-empty profile.
    Icc(Vec<u8>),
}

impl ColorSpecification {
    pub fn declared_color_space(&self) -> ColorSpace {
        match self {
            ColorSpecification::Enumerated(space) => *space,
            ColorSpecification::CieLab(_) => ColorSpace::CieLab,
            ColorSpecification::None | ColorSpecification::Icc(_) => ColorSpace::Unspecified,
        }
    }
}

/// Per-component metadata from the SIZ marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentInfo {
    /// Bit depth (1..=38).
    pub precision: u8,
    pub signed: bool,
    /// Horizontal sub-sampling factor.
    pub dx: u8,
    /// Vertical sub-sampling factor.
    pub dy: u8,
}

/// Main header fields needed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodestreamHeader {
    /// Xsiz / Ysiz: reference grid extent.
    pub grid_width: u32,
    pub grid_height: u32,
    /// XOsiz / YOsiz: image area offset on the reference grid.
    pub x_origin: u32,
    pub y_origin: u32,
    pub components: Vec<ComponentInfo>,
}

impl CodestreamHeader {
    /// Size of component `index` in samples.
    pub fn component_size(&self, index: usize) -> Option<(u32, u32)> {
        let info = self.components.get(index)?;
        let dx = info.dx.max(1) as u32;
        let dy = info.dy.max(1) as u32;
        Some((
            self.grid_width.div_ceil(dx) - self.x_origin.div_ceil(dx),
            self.grid_height.div_ceil(dy) - self.y_origin.div_ceil(dy),
        ))
    }

    /// Image size, measured on the first component.
    pub fn image_size(&self) -> (u32, u32) {
        self.component_size(0).unwrap_or((0, 0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// JP2 file format with boxes.
    Jp2,
    /// Bare codestream starting with SOC.
    Codestream,
}

/// Everything read before sample decoding starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveletHeader {
    pub container: Container,
    pub codestream: CodestreamHeader,
    pub color: ColorSpecification,
    /// Absolute offset of the SOC marker in the input.
    pub codestream_offset: u64,
}

/// One decoded colour plane.
///
/// Signedness is explicit per component; the sample array always holds the
/// values as decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageComponent {
    pub width: u32,
    pub height: u32,
    pub precision: u32,
    pub signed: bool,
    pub dx: u32,
    pub dy: u32,
    pub data: Vec<i32>,
}

impl ImageComponent {
    pub fn new(width: u32, height: u32, precision: u32, signed: bool, data: Vec<i32>) -> Self {
        Self {
            width,
            height,
            precision,
            signed,
            dx: 1,
            dy: 1,
            data,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Largest unsigned value representable at this precision.
    pub fn max_value(&self) -> i64 {
        (1i64 << self.precision.clamp(1, 38)) - 1
    }

    /// Offset that re-centres a signed sample onto the unsigned range.
    pub fn sign_offset(&self) -> i64 {
        if self.signed {
            1i64 << (self.precision.clamp(1, 38) - 1)
        } else {
            0
        }
    }
}

/// Components plus the colour model they are expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub components: Vec<ImageComponent>,
    pub color_space: ColorSpace,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.components.first().map_or(0, |c| c.width)
    }

    pub fn height(&self) -> u32 {
        self.components.first().map_or(0, |c| c.height)
    }
}
