//! Alpha conventions and the conversions between them.
//!
//! Pixels are 32-bit words with little-endian channel packing:
//!
//! ```text
//! bits  0..8  : R
//! bits  8..16 : G
//! bits 16..24 : B
//! bits 24..32 : A
//! ```
//!
//! which is the byte order `R, G, B, A` when the word is stored in linear
//! memory.
//!
//! # Rounding
//!
//! Premultiplication rounds to nearest: `c' = (c * a + 127) / 255`.
//! Depremultiplication rounds to nearest and saturates:
//! `c = min(255, (c' * 255 + a / 2) / a)`.
//!
//! A fully transparent pixel has no recoverable color. Premultiplying it
//! yields zero color channels; depremultiplying it leaves the color channels
//! exactly as they are.

use serde::{Deserialize, Serialize};

/// How the color channels of a pixel relate to its alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaMode {
    /// Color channels are stored unmodified by alpha.
    Straight,
    /// Color channels are pre-scaled by `alpha / 255`.
    Premultiplied,
}

/// Pack four channels into a pixel word.
#[inline]
pub const fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}

/// Split a pixel word into `[r, g, b, a]`.
#[inline]
pub const fn unpack(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

/// Alpha channel of a pixel word.
#[inline]
pub const fn alpha(pixel: u32) -> u8 {
    (pixel >> 24) as u8
}

/// Scale one color channel by `alpha / 255`.
#[inline]
pub fn premultiply_channel(color: u8, alpha: u8) -> u8 {
    ((color as u32 * alpha as u32 + 127) / 255) as u8
}

/// Undo [`premultiply_channel`]. Zero alpha leaves the channel unchanged.
#[inline]
pub fn depremultiply_channel(color: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return color;
    }
    let a = alpha as u32;
    ((color as u32 * 255 + a / 2) / a).min(255) as u8
}

/// Convert one straight-alpha pixel to premultiplied form.
pub fn premultiply(pixel: u32) -> u32 {
    let [r, g, b, a] = unpack(pixel);
    match a {
        255 => pixel,
        0 => 0,
        _ => pack(
            premultiply_channel(r, a),
            premultiply_channel(g, a),
            premultiply_channel(b, a),
            a,
        ),
    }
}

/// Convert one premultiplied pixel to straight-alpha form.
pub fn depremultiply(pixel: u32) -> u32 {
    let [r, g, b, a] = unpack(pixel);
    match a {
        255 | 0 => pixel,
        _ => pack(
            depremultiply_channel(r, a),
            depremultiply_channel(g, a),
            depremultiply_channel(b, a),
            a,
        ),
    }
}

/// Premultiply every pixel in place.
pub fn premultiply_slice(pixels: &mut [u32]) {
    for px in pixels.iter_mut() {
        *px = premultiply(*px);
    }
}

/// Depremultiply every pixel in place.
pub fn depremultiply_slice(pixels: &mut [u32]) {
    for px in pixels.iter_mut() {
        *px = depremultiply(*px);
    }
}
