//! Module payloads: loading, validation and inspection.
//!
//! A payload is an opaque WebAssembly binary.  It may arrive as raw module
//! bytes or as a raw-deflate stream (no zlib or gzip header), which is how
//! codec modules are usually bundled into host programs.

use std::fmt;
use std::io::Read;

use flate2::read::DeflateDecoder;
use sha2::{Digest, Sha256};
use wasmparser::{ExternalKind, Parser, Payload as WasmPayload};

use crate::error::{ArenaError, ArenaResult};

/// A validated WebAssembly module binary.
#[derive(Clone)]
pub struct Payload {
    bytes: Vec<u8>,
    digest: [u8; 32],
}

/// What an export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Function,
    Table,
    Memory,
    Global,
    Tag,
}

/// One entry of the module's export table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub name: String,
    pub kind: ExportKind,
}

impl Payload {
    /// Wrap raw module bytes, validating them first.
    pub fn from_wasm(bytes: Vec<u8>) -> ArenaResult<Self> {
        wasmparser::validate(&bytes).map_err(|e| ArenaError::InvalidPayload(e.to_string()))?;
        let digest: [u8; 32] = Sha256::digest(&bytes).into();
        Ok(Self { bytes, digest })
    }

    /// Inflate a raw-deflate stream and validate the result.
    pub fn from_deflate(compressed: &[u8]) -> ArenaResult<Self> {
        let mut bytes = Vec::with_capacity(compressed.len() * 3);
        DeflateDecoder::new(compressed).read_to_end(&mut bytes)?;
        Self::from_wasm(bytes)
    }

    /// The module binary.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// SHA-256 of the module binary.
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    /// SHA-256 of the module binary as lowercase hex.
    pub fn digest_hex(&self) -> String {
        self.digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The module's export table, in declaration order.
    pub fn exports(&self) -> Vec<ExportEntry> {
        let mut exports = Vec::new();
        for payload in Parser::new(0).parse_all(&self.bytes) {
            if let Ok(WasmPayload::ExportSection(reader)) = payload {
                for export in reader.into_iter().flatten() {
                    exports.push(ExportEntry {
                        name: export.name.to_string(),
                        kind: match export.kind {
                            ExternalKind::Func => ExportKind::Function,
                            ExternalKind::Table => ExportKind::Table,
                            ExternalKind::Memory => ExportKind::Memory,
                            ExternalKind::Global => ExportKind::Global,
                            ExternalKind::Tag => ExportKind::Tag,
                        },
                    });
                }
            }
        }
        exports
    }

    /// Whether the module exports a function named `name`.
    pub fn exports_function(&self, name: &str) -> bool {
        self.exports()
            .iter()
            .any(|e| e.kind == ExportKind::Function && e.name == name)
    }

    /// Fail with [`ArenaError::UnknownExport`] for the first missing function.
    pub fn require_functions<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> ArenaResult<()> {
        let exports = self.exports();
        for name in names {
            let found = exports
                .iter()
                .any(|e| e.kind == ExportKind::Function && e.name == name);
            if !found {
                return Err(ArenaError::UnknownExport(name.to_string()));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("len", &self.bytes.len())
            .field("digest", &self.digest_hex())
            .finish()
    }
}
