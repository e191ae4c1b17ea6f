//! Shared types for imgbridge.
//!
//! This crate defines the host-side image values exchanged with the sandboxed
//! codec: image metadata, 32-bit RGBA pixel buffers tagged with their alpha
//! convention, the premultiply/depremultiply rules, and the numeric format
//! codes the codec module expects.

pub mod alpha;
mod error;
pub mod format;
mod image;

pub use alpha::AlphaMode;
pub use error::PixelError;
pub use format::{resolve_format_code, ImageFormat};
pub use image::{ImageInfo, PixelBuffer};

/// Result type used for pixel buffer construction and conversion.
pub type Result<T> = std::result::Result<T, PixelError>;
