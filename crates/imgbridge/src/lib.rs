//! Image codec host bridge.
//!
//! Probes, decodes and encodes images by driving a sandboxed codec module
//! (stb_image / stb_image_write compiled to WebAssembly) through the
//! [`imgbridge_arena`] arena.
//!
//! ```text
//! bytes ─ probe ──▶ ImageInfo
//! bytes ─ decode ─▶ PixelBuffer (premultiplied RGBA)
//! PixelBuffer + format ─ encode ─▶ bytes
//! ```
//!
//! [`SharedCodec::global`] is the usual entry point.  It hands out clones
//! of one lock-guarded instance of the bundled codec.  Independent instances
//! come from [`SharedCodec::embedded`] or [`CodecAdapter::from_payload`].
//!
//! ## Formats
//! | name | code |
//! |---|---|
//! | `png` | 0 |
//! | `bmp` | 1 |
//! | `tga` | 2 |
//! | `jpg`, `jpeg` | 3 |
//!
//! Unknown names fall back to PNG.

pub mod adapter;
pub mod config;
pub mod embedded;
pub mod error;
pub mod shared;

pub use adapter::CodecAdapter;
pub use config::{CodecConfig, CodecExports, EncodeOptions, DEFAULT_QUALITY};
pub use error::{CodecError, CodecResult};
pub use shared::SharedCodec;

pub use imgbridge_types::{
    alpha, resolve_format_code, AlphaMode, ImageFormat, ImageInfo, PixelBuffer, PixelError,
};
