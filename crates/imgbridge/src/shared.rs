//! A cloneable, lock-guarded codec handle.

use std::sync::Arc;

use imgbridge_types::{resolve_format_code, ImageInfo, PixelBuffer};
use parking_lot::{Mutex, MutexGuard};

use crate::adapter::CodecAdapter;
use crate::config::EncodeOptions;
use crate::error::CodecResult;

/// Process-wide instance, built on first use.
static GLOBAL: Mutex<Option<SharedCodec>> = parking_lot::const_mutex(None);

/// Shared access to one [`CodecAdapter`].
///
/// Every operation resets the whole arena, so each call holds the lock from
/// reset to the final read.  Concurrent callers queue.
#[derive(Clone)]
pub struct SharedCodec {
    inner: Arc<Mutex<CodecAdapter>>,
}

impl SharedCodec {
    pub fn new(adapter: CodecAdapter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(adapter)),
        }
    }

    /// A fresh instance of the bundled codec, independent of the global one.
    pub fn embedded() -> CodecResult<Self> {
        CodecAdapter::embedded().map(Self::new)
    }

    /// The process-wide instance of the bundled codec.
    ///
    /// Built once; later calls return handles to the same instance.  A failed
    /// construction is not cached.
    pub fn global() -> CodecResult<Self> {
        let mut slot = GLOBAL.lock();
        if let Some(codec) = slot.as_ref() {
            return Ok(codec.clone());
        }
        let codec = Self::embedded()?;
        *slot = Some(codec.clone());
        Ok(codec)
    }

    /// Whether both handles refer to the same module instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Hold the adapter for several operations in a row.
    pub fn lock(&self) -> MutexGuard<'_, CodecAdapter> {
        self.inner.lock()
    }

    /// Width, height and bits per pixel of an encoded image.
    pub fn info(&self, bytes: &[u8]) -> CodecResult<ImageInfo> {
        self.inner.lock().probe(bytes)
    }

    /// Decode to premultiplied RGBA.
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<PixelBuffer> {
        self.inner.lock().decode(bytes)
    }

    /// Encode to the format called `format_name`; unknown names encode PNG.
    pub fn encode(
        &self,
        image: &PixelBuffer,
        format_name: &str,
        options: EncodeOptions,
    ) -> CodecResult<Vec<u8>> {
        let code = resolve_format_code(format_name);
        self.inner.lock().encode(image, code, options.quality)
    }
}

impl std::fmt::Debug for SharedCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCodec")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
