use thiserror::Error;

pub type Result<T> = std::result::Result<T, PixnormError>;

/// Failures raised by `MemoryByteSource`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    #[error("Negative skip of {0} bytes")]
    NegativeSkip(i64),
    #[error("Negative seek to offset {0}")]
    NegativeSeek(i64),
    #[error("Unexpected end of data at offset {0}")]
    UnexpectedEof(u64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PixnormError {
    #[error("Color profile rejected: {0}")]
    Profile(String),
    #[error("No device color transform configured")]
    NotConfigured,
    #[error("Invalid image header: {0}")]
    Header(String),
    #[error("Invalid decode region ({x0},{y0})-({x1},{y1}) for a {width}x{height} image")]
    InvalidRegion {
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        width: u32,
        height: u32,
    },
    #[error("Codec failure: {0}")]
    Codec(String),
    #[error("Decoder produced no sample data")]
    EmptyResult,
    #[error("Unsupported {codec} component count: {components}")]
    UnsupportedShape { codec: &'static str, components: usize },
    #[error("Destination too small: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Image of {pixels} pixels exceeds the limit of {limit}")]
    TooLarge { pixels: u64, limit: u64 },
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl PixnormError {
    /// Stable numeric code used across the C boundary. Zero is reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            PixnormError::Profile(_) => 1,
            PixnormError::NotConfigured => 2,
            PixnormError::Header(_) => 3,
            PixnormError::InvalidRegion { .. } => 4,
            PixnormError::Codec(_) => 5,
            PixnormError::EmptyResult => 6,
            PixnormError::UnsupportedShape { .. } => 7,
            PixnormError::BufferSize { .. } => 8,
            PixnormError::TooLarge { .. } => 9,
            PixnormError::Source(_) => 10,
        }
    }

    /// True for failures detected while reading headers, before any sample decoding.
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            PixnormError::Header(_) | PixnormError::InvalidRegion { .. } | PixnormError::Source(_)
        )
    }
}
