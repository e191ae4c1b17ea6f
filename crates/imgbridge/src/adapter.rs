//! Probe, decode and encode over an [`ArenaBridge`].
//!
//! Each operation is one full arena cycle: reset, stage inputs, invoke the
//! codec export, read results back.  Nothing staged survives into the next
//! operation.

use imgbridge_arena::{ArenaBridge, ArenaOffset, Payload};
use imgbridge_types::{alpha, AlphaMode, ImageInfo, PixelBuffer};
use tracing::{debug, warn};

use crate::config::CodecConfig;
use crate::embedded;
use crate::error::{CodecError, CodecResult};

/// Width, height and channel count slots written by the codec.
const DIMENSION_SLOTS: usize = 3;

/// Host adapter over one codec module instance.
#[derive(Debug)]
pub struct CodecAdapter {
    bridge: ArenaBridge,
    config: CodecConfig,
}

impl CodecAdapter {
    /// Instantiate `payload` as a codec.
    ///
    /// Fails with an unknown-export error if any configured entry point is
    /// missing, before anything is instantiated.
    pub fn from_payload(payload: &Payload, config: CodecConfig) -> CodecResult<Self> {
        payload.require_functions(config.exports.names())?;
        let bridge = ArenaBridge::from_payload(payload, config.bridge.clone())?;
        Ok(Self { bridge, config })
    }

    /// Instantiate the bundled stb codec with the default configuration.
    pub fn embedded() -> CodecResult<Self> {
        Self::embedded_with(CodecConfig::default())
    }

    /// Instantiate the bundled stb codec.
    pub fn embedded_with(config: CodecConfig) -> CodecResult<Self> {
        Self::from_payload(&embedded::payload()?, config)
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn bridge(&self) -> &ArenaBridge {
        &self.bridge
    }

    /// Read width, height and channel count without decoding pixels.
    pub fn probe(&mut self, source: &[u8]) -> CodecResult<ImageInfo> {
        self.bridge.reset()?;
        let data = self.bridge.write_bytes(source)?;
        let out = self.bridge.allocate(DIMENSION_SLOTS * 4)?;

        let status = self.bridge.invoke(
            &self.config.exports.probe,
            (
                data.as_arg(),
                source.len() as i32,
                out.word(0).as_arg(),
                out.word(1).as_arg(),
                out.word(2).as_arg(),
            ),
        )?;
        if status == 0 {
            return Err(CodecError::ProbeFailed);
        }

        let dims = self.bridge.read_ints(out, DIMENSION_SLOTS)?;
        self.bridge.release(&[data, out]);

        let info = ImageInfo::from_channels(dims[0], dims[1], dims[2]);
        debug!(
            width = info.width,
            height = info.height,
            channels = dims[2],
            input = source.len(),
            "probe"
        );
        Ok(info)
    }

    /// Decode `source` into a premultiplied RGBA buffer.
    pub fn decode(&mut self, source: &[u8]) -> CodecResult<PixelBuffer> {
        self.bridge.reset()?;
        let out = self.bridge.allocate(DIMENSION_SLOTS * 4)?;
        let data = self.bridge.write_bytes(source)?;
        let len = source.len() as i32;
        let slots = (
            out.word(0).as_arg(),
            out.word(1).as_arg(),
            out.word(2).as_arg(),
        );

        // The decoder allocates its output and scratch inside the module, so
        // make room for them first when the header is readable.
        let status = self.bridge.invoke(
            &self.config.exports.probe,
            (data.as_arg(), len, slots.0, slots.1, slots.2),
        )?;
        if status != 0 {
            let dims = self.bridge.read_ints(out, 2)?;
            self.reserve_scratch(dims[0], dims[1])?;
        }

        let raw = self.bridge.invoke(
            &self.config.exports.decode,
            (
                data.as_arg(),
                len,
                slots.0,
                slots.1,
                slots.2,
                self.config.forced_channels,
            ),
        )?;
        let pixels_at = self.bridge.adopt(raw).ok_or(CodecError::DecodeFailed)?;

        let dims = self.bridge.read_ints(out, DIMENSION_SLOTS)?;
        let (width, height) = (dims[0], dims[1]);
        let channels = match self.config.forced_channels {
            n if n > 0 => n as u32,
            _ => dims[2],
        };
        let pixels = self.read_pixels(pixels_at, width, height, channels)?;
        self.bridge.release(&[out, data, pixels_at]);

        debug!(width, height, channels, input = source.len(), "decode");
        Ok(PixelBuffer::new(width, height, pixels, AlphaMode::Straight)?.into_premultiplied())
    }

    /// Encode `image` as `format_code` (see [`imgbridge_types::ImageFormat`]).
    ///
    /// `quality` only affects lossy formats.  Premultiplied buffers are
    /// converted to straight alpha first.
    pub fn encode(
        &mut self,
        image: &PixelBuffer,
        format_code: i32,
        quality: i32,
    ) -> CodecResult<Vec<u8>> {
        let too_large = || CodecError::DimensionsTooLarge {
            width: image.width(),
            height: image.height(),
        };
        let width = i32::try_from(image.width()).map_err(|_| too_large())?;
        let height = i32::try_from(image.height()).map_err(|_| too_large())?;
        let raw_len = image.pixels().len().checked_mul(4).ok_or_else(too_large)?;
        let capacity = raw_len
            .checked_add(self.config.output_slack)
            .ok_or_else(too_large)?;
        let capacity_arg = i32::try_from(capacity).map_err(|_| too_large())?;

        self.bridge.reset()?;
        let pixels = image.straight_pixels();
        let data = self.bridge.write_ints(&pixels)?;
        let out = self.bridge.allocate(capacity)?;
        self.reserve_scratch(image.width(), image.height())?;

        let produced = self.bridge.invoke(
            &self.config.exports.encode,
            (
                format_code,
                data.as_arg(),
                width,
                height,
                out.as_arg(),
                capacity_arg,
                quality,
            ),
        )?;
        if produced <= 0 {
            return Err(CodecError::EncodeFailed {
                format_code,
                status: produced,
            });
        }

        let produced = produced as usize;
        if produced > capacity {
            warn!(
                produced,
                capacity, format_code, "codec wrote past the reserved output buffer"
            );
        }
        let bytes = self.bridge.read_bytes(out, produced)?;
        self.bridge.release(&[data, out]);

        debug!(
            width,
            height,
            format_code,
            quality,
            output = bytes.len(),
            "encode"
        );
        Ok(bytes)
    }

    /// Grow memory for codec-internal buffers of a `width` x `height` image.
    fn reserve_scratch(&mut self, width: u32, height: u32) -> CodecResult<()> {
        let raw = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .and_then(|n| n.checked_mul(self.config.scratch_factor))
            .ok_or(CodecError::DimensionsTooLarge { width, height })?;
        self.bridge.reserve_headroom(raw)?;
        Ok(())
    }

    /// Read a decoded `channels`-per-pixel byte grid as packed RGBA words.
    fn read_pixels(
        &self,
        at: ArenaOffset,
        width: u32,
        height: u32,
        channels: u32,
    ) -> CodecResult<Vec<u32>> {
        let count = PixelBuffer::pixel_count(width, height)?;
        if channels == 4 {
            return Ok(self.bridge.read_ints(at, count)?);
        }
        let len = count
            .checked_mul(channels as usize)
            .ok_or(CodecError::DimensionsTooLarge { width, height })?;
        let bytes = self.bridge.read_bytes(at, len)?;
        expand_to_rgba(&bytes, channels).ok_or(CodecError::DecodeFailed)
    }
}

/// Widen 1-3 channel pixels to packed RGBA.
///
/// 1 is gray, 2 is gray + alpha, 3 is RGB.
fn expand_to_rgba(bytes: &[u8], channels: u32) -> Option<Vec<u32>> {
    let pixels = match channels {
        1 => bytes.iter().map(|&g| alpha::pack(g, g, g, 255)).collect(),
        2 => bytes
            .chunks_exact(2)
            .map(|p| alpha::pack(p[0], p[0], p[0], p[1]))
            .collect(),
        3 => bytes
            .chunks_exact(3)
            .map(|p| alpha::pack(p[0], p[1], p[2], 255))
            .collect(),
        4 => bytes
            .chunks_exact(4)
            .map(|p| alpha::pack(p[0], p[1], p[2], p[3]))
            .collect(),
        _ => return None,
    };
    Some(pixels)
}
