//! Codec error types.

use imgbridge_arena::ArenaError;
use imgbridge_types::PixelError;
use thiserror::Error;

/// Errors surfaced by probe, decode and encode.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The codec could not read image metadata from the input.
    #[error("cannot read image metadata")]
    ProbeFailed,

    /// The codec could not decode the input.
    #[error("cannot decode image")]
    DecodeFailed,

    /// The codec reported a failure status while encoding.
    #[error("encoding to format {format_code} failed with status {status}")]
    EncodeFailed { format_code: i32, status: i32 },

    /// The image does not fit the codec's 32-bit interface.
    #[error("image dimensions {width}x{height} exceed the codec limits")]
    DimensionsTooLarge { width: u32, height: u32 },

    /// A configuration document could not be parsed.
    #[error("invalid codec configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Arena(#[from] ArenaError),

    #[error(transparent)]
    Pixel(#[from] PixelError),
}

/// Codec result type alias.
pub type CodecResult<T> = Result<T, CodecError>;
