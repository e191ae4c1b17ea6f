use thiserror::Error;

/// Errors raised while building or converting pixel buffers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelError {
    /// The pixel slice does not hold exactly `width * height` words.
    #[error("pixel count mismatch: {width}x{height} needs {expected} pixels, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// `width * height` does not fit in the host's address space.
    #[error("image dimensions overflow: {width}x{height}")]
    DimensionsOverflow { width: u32, height: u32 },
}
