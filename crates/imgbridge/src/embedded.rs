//! The bundled stb codec module.
//!
//! `stb_image` and `stb_image_write` compiled to an import-free module with a
//! bump allocator, shipped as a raw-deflate stream.

use imgbridge_arena::Payload;

use crate::error::CodecResult;

static STBI_WASM_DEFLATE: &[u8] = include_bytes!("../assets/stbi.wasm.deflate");

/// SHA-256 of the inflated module.
pub const STBI_WASM_SHA256: &str =
    "7c012235cc57cb2d325f792043b4d0e3692ca3d723c8f4d81a1338e065aab3b3";

/// The compressed module as shipped.
pub fn compressed() -> &'static [u8] {
    STBI_WASM_DEFLATE
}

/// Inflate and validate the bundled module.
pub fn payload() -> CodecResult<Payload> {
    Ok(Payload::from_deflate(STBI_WASM_DEFLATE)?)
}
