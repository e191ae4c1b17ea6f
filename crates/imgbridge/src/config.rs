//! Codec configuration.

use imgbridge_arena::BridgeConfig;
use serde::{Deserialize, Serialize};

use crate::error::CodecResult;

/// Default JPEG quality used when the caller does not choose one.
pub const DEFAULT_QUALITY: i32 = 90;

/// Names of the codec entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecExports {
    /// `(src, len, out_w, out_h, out_ch) -> status`
    pub probe: String,
    /// `(src, len, out_w, out_h, out_ch, force_ch) -> pixels`
    pub decode: String,
    /// `(format, pixels, w, h, out, out_cap, quality) -> size`
    pub encode: String,
}

impl Default for CodecExports {
    fn default() -> Self {
        Self {
            probe: "stbi_info_from_memory".to_string(),
            decode: "stbi_load_from_memory".to_string(),
            encode: "stbi_write_to_memory".to_string(),
        }
    }
}

impl CodecExports {
    pub fn names(&self) -> [&str; 3] {
        [
            self.probe.as_str(),
            self.decode.as_str(),
            self.encode.as_str(),
        ]
    }
}

/// Full adapter configuration.
///
/// Every field has a default, so `{}` is a valid document and partial
/// documents override only what they name:
///
/// ```json
/// { "output_slack": 4096, "bridge": { "max_memory_pages": 4096 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub exports: CodecExports,
    pub bridge: BridgeConfig,
    /// Channel count requested from the decoder.  4 is read back as packed
    /// RGBA words, 1-3 are widened to RGBA, and 0 keeps the source's own
    /// count.  Anything else fails the decode.
    pub forced_channels: i32,
    /// Bytes reserved for encoder output beyond the raw pixel size.
    pub output_slack: usize,
    /// Linear memory kept free for the codec's own allocations, as a
    /// multiple of the raw RGBA size of the image being processed.
    pub scratch_factor: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            exports: CodecExports::default(),
            bridge: BridgeConfig::default(),
            forced_channels: 4,
            output_slack: 1024,
            scratch_factor: 2,
        }
    }
}

impl CodecConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> CodecResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_bridge(mut self, bridge: BridgeConfig) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_output_slack(mut self, slack: usize) -> Self {
        self.output_slack = slack;
        self
    }
}

/// Per-call encoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Lossy quality, 1-100.  Ignored by lossless formats.
    pub quality: i32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

impl EncodeOptions {
    pub fn with_quality(quality: i32) -> Self {
        Self { quality }
    }
}
