//! Image format names and the numeric codes the codec module expects.

use serde::{Deserialize, Serialize};

/// Encodable image formats, with their codec format codes as discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum ImageFormat {
    Png = 0,
    Bmp = 1,
    Tga = 2,
    Jpeg = 3,
}

impl ImageFormat {
    /// Every format, in code order.
    pub const ALL: [ImageFormat; 4] = [Self::Png, Self::Bmp, Self::Tga, Self::Jpeg];

    /// Resolve a format name, case-insensitively.
    ///
    /// Unrecognized names fall back to [`ImageFormat::Png`]; use
    /// [`ImageFormat::parse`] to reject them instead.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or(Self::Png)
    }

    /// Strict, case-insensitive name lookup.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tga" => Some(Self::Tga),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Look up a format by codec code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    /// The codec's numeric code for this format.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Canonical file extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tga => "tga",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type string.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
            Self::Tga => "image/x-tga",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Whether the codec discards information when writing this format.
    pub const fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg)
    }

    /// Detect a format from its magic bytes.
    ///
    /// TGA carries no signature and is never detected.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF] {
            return Some(Self::Jpeg);
        }
        if data.len() >= 14 && data.starts_with(b"BM") {
            return Some(Self::Bmp);
        }
        None
    }
}

/// Map a format name to the codec's numeric format code.
///
/// `png → 0`, `bmp → 1`, `tga → 2`, `jpg`/`jpeg → 3`; anything else is `0`.
pub fn resolve_format_code(name: &str) -> i32 {
    ImageFormat::from_name(name).code()
}
