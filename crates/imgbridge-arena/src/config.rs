//! Bridge configuration: export names and memory limits.

use serde::{Deserialize, Serialize};

/// How the bridge binds to a module's allocator and memory.
///
/// Defaults match the embedded stb codec module.  Deserializing a partial
/// document keeps the defaults for every omitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name of the exported linear memory.
    pub memory_export: String,
    /// `(size: i32) -> i32` bump allocator export.
    pub alloc_export: String,
    /// `() -> ()` export that rewinds the bump allocator.
    pub reset_export: String,
    /// `() -> ()` constructor to run once after instantiation, if exported.
    pub initialize_export: Option<String>,
    /// Upper bound on linear memory pages the bridge may grow to.
    ///
    /// `None` leaves the limit to the module's own declared maximum.
    pub max_memory_pages: Option<u32>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            memory_export: "memory".to_string(),
            alloc_export: "malloc".to_string(),
            reset_export: "heap_reset".to_string(),
            initialize_export: Some("_initialize".to_string()),
            max_memory_pages: None,
        }
    }
}

impl BridgeConfig {
    /// Set the page cap.
    pub fn with_max_memory_pages(mut self, pages: u32) -> Self {
        self.max_memory_pages = Some(pages);
        self
    }

    /// Set the allocator and reset export names.
    pub fn with_allocator(mut self, alloc: impl Into<String>, reset: impl Into<String>) -> Self {
        self.alloc_export = alloc.into();
        self.reset_export = reset.into();
        self
    }

    /// Set or clear the constructor export.
    pub fn with_initialize(mut self, export: Option<String>) -> Self {
        self.initialize_export = export;
        self
    }

    /// Byte limit derived from [`Self::max_memory_pages`].
    pub fn max_memory_bytes(&self) -> Option<usize> {
        self.max_memory_pages
            .map(|pages| pages as usize * crate::WASM_PAGE_SIZE)
    }
}
