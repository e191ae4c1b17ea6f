use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::alpha::{self, AlphaMode};
use crate::error::PixelError;

/// Image metadata reported by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Source channel count times 8.
    pub bits_per_pixel: u32,
}

impl ImageInfo {
    /// Build info from a channel count as reported by the codec.
    ///
    /// The count comes straight out of module memory, so an absurd value
    /// saturates rather than overflowing.
    pub fn from_channels(width: u32, height: u32, channels: u32) -> Self {
        Self {
            width,
            height,
            bits_per_pixel: channels.saturating_mul(8),
        }
    }

    /// Channel count in the source image.
    pub fn channels(&self) -> u32 {
        self.bits_per_pixel / 8
    }
}

/// A `width * height` grid of packed RGBA words tagged with its alpha
/// convention.
///
/// The length invariant is checked on construction and preserved by every
/// method, so `pixels().len() == width * height` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    alpha: AlphaMode,
}

impl PixelBuffer {
    /// Wrap `pixels` as a `width` x `height` buffer.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<u32>,
        alpha: AlphaMode,
    ) -> crate::Result<Self> {
        let expected = Self::pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(PixelError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            alpha,
        })
    }

    /// A buffer with every pixel set to `pixel`.
    pub fn filled(
        width: u32,
        height: u32,
        pixel: u32,
        alpha: AlphaMode,
    ) -> crate::Result<Self> {
        let count = Self::pixel_count(width, height)?;
        Self::new(width, height, vec![pixel; count], alpha)
    }

    /// `width * height`, checked against the host's address space.
    pub fn pixel_count(width: u32, height: u32) -> crate::Result<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .ok_or(PixelError::DimensionsOverflow { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn alpha(&self) -> AlphaMode {
        self.alpha
    }

    pub fn is_premultiplied(&self) -> bool {
        self.alpha == AlphaMode::Premultiplied
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// Pixel at column `x`, row `y`, or `None` when out of range.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// The same image with premultiplied alpha. No-op if already premultiplied.
    pub fn into_premultiplied(mut self) -> Self {
        if self.alpha == AlphaMode::Straight {
            alpha::premultiply_slice(&mut self.pixels);
            self.alpha = AlphaMode::Premultiplied;
        }
        self
    }

    /// The same image with straight alpha. No-op if already straight.
    pub fn into_straight(mut self) -> Self {
        if self.alpha == AlphaMode::Premultiplied {
            alpha::depremultiply_slice(&mut self.pixels);
            self.alpha = AlphaMode::Straight;
        }
        self
    }

    /// Straight-alpha pixel words, copying only when a conversion is needed.
    pub fn straight_pixels(&self) -> Cow<'_, [u32]> {
        match self.alpha {
            AlphaMode::Straight => Cow::Borrowed(&self.pixels),
            AlphaMode::Premultiplied => {
                let mut pixels = self.pixels.clone();
                alpha::depremultiply_slice(&mut pixels);
                Cow::Owned(pixels)
            }
        }
    }
}
