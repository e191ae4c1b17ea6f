//! A single instantiated module: engine, store, exports and linear memory.

use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{debug, info};
use wasmi::{Engine, Instance, Linker, Memory, Module, Store, TypedFunc, WasmParams, WasmResults};

use crate::config::BridgeConfig;
use crate::error::{ArenaError, ArenaResult};
use crate::payload::Payload;
use crate::WASM_PAGE_SIZE;

/// Source of instance ids stamped into every [`ArenaOffset`](crate::ArenaOffset).
static NEXT_INSTANCE_ID: AtomicU32 = AtomicU32::new(1);

/// One instantiated module and its linear memory.
///
/// The module must be import-free: codec payloads are self-contained and get
/// an empty linker.
pub struct ModuleInstance {
    id: u32,
    store: Store<()>,
    instance: Instance,
    memory: Memory,
    alloc: TypedFunc<i32, i32>,
    reset: TypedFunc<(), ()>,
    config: BridgeConfig,
    digest: String,
}

impl ModuleInstance {
    /// Compile and instantiate `payload`, then run its constructor export.
    ///
    /// The allocator and reset exports are resolved here, so a payload that
    /// lacks them fails with [`ArenaError::UnknownExport`] before first use.
    pub fn instantiate(payload: &Payload, config: BridgeConfig) -> ArenaResult<Self> {
        let engine = Engine::default();
        let module = Module::new(&engine, payload.bytes())
            .map_err(|e| ArenaError::Instantiation(e.to_string()))?;

        let mut store = Store::new(&engine, ());
        let linker = <Linker<()>>::new(&engine);
        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(|e| ArenaError::Instantiation(e.to_string()))?
            .start(&mut store)
            .map_err(|e| ArenaError::Instantiation(e.to_string()))?;

        let memory = instance
            .get_memory(&store, &config.memory_export)
            .ok_or_else(|| ArenaError::MissingMemory(config.memory_export.clone()))?;
        let alloc = typed_export::<i32, i32>(&store, &instance, &config.alloc_export)?;
        let reset = typed_export::<(), ()>(&store, &instance, &config.reset_export)?;

        let mut this = Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            store,
            instance,
            memory,
            alloc,
            reset,
            config,
            digest: payload.digest_hex(),
        };

        if let Some(init) = this.config.initialize_export.clone() {
            if this.has_function(&init) {
                typed_export::<(), ()>(&this.store, &this.instance, &init)?
                    .call(&mut this.store, ())
                    .map_err(|e| trap(&init, e))?;
            }
        }

        info!(
            instance = this.id,
            digest = %this.digest,
            pages = this.memory_size() / WASM_PAGE_SIZE,
            "module instantiated"
        );
        Ok(this)
    }

    /// Process-unique id of this instance.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// SHA-256 (hex) of the payload this instance was built from.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Whether the module exports a function called `name`.
    pub fn has_function(&self, name: &str) -> bool {
        self.instance.get_func(&self.store, name).is_some()
    }

    /// Current linear memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.memory.data(&self.store).len()
    }

    /// Call `name` with `args`, expecting a single `i32` result.
    pub fn call<P: WasmParams>(&mut self, name: &str, args: P) -> ArenaResult<i32> {
        let func = typed_export::<P, i32>(&self.store, &self.instance, name)?;
        func.call(&mut self.store, args).map_err(|e| trap(name, e))
    }

    /// Run the module's bump allocator.
    pub(crate) fn alloc(&mut self, size: i32) -> ArenaResult<i32> {
        self.alloc
            .call(&mut self.store, size)
            .map_err(|e| trap(&self.config.alloc_export, e))
    }

    /// Rewind the module's bump allocator.
    pub(crate) fn reset_heap(&mut self) -> ArenaResult<()> {
        self.reset
            .call(&mut self.store, ())
            .map_err(|e| trap(&self.config.reset_export, e))
    }

    /// Grow linear memory until it is at least `end` bytes long.
    ///
    /// `requested` and `addr` describe the allocation being satisfied and are
    /// only used to report [`ArenaError::OutOfArenaMemory`].
    pub(crate) fn ensure_len(
        &mut self,
        end: usize,
        requested: usize,
        addr: u32,
    ) -> ArenaResult<()> {
        let current = self.memory_size();
        if end <= current {
            return Ok(());
        }
        let out_of_memory = || ArenaError::OutOfArenaMemory {
            requested,
            available: current.saturating_sub(addr as usize),
        };

        if let Some(limit) = self.config.max_memory_bytes() {
            if end > limit {
                return Err(out_of_memory());
            }
        }

        let pages = u32::try_from((end - current).div_ceil(WASM_PAGE_SIZE))
            .map_err(|_| out_of_memory())?;
        self.memory
            .grow(&mut self.store, pages.into())
            .map_err(|e| {
                debug!(instance = self.id, pages, error = %e, "memory growth refused");
                out_of_memory()
            })?;
        debug!(instance = self.id, pages, size = self.memory_size(), "memory grown");
        Ok(())
    }

    /// Borrow `len` bytes of linear memory at `addr`.
    pub(crate) fn read(&self, addr: u32, len: usize) -> ArenaResult<&[u8]> {
        let data = self.memory.data(&self.store);
        let range = checked_range(addr, len, data.len())?;
        Ok(&data[range])
    }

    /// Mutably borrow `len` bytes of linear memory at `addr`.
    pub(crate) fn read_mut(&mut self, addr: u32, len: usize) -> ArenaResult<&mut [u8]> {
        let data = self.memory.data_mut(&mut self.store);
        let range = checked_range(addr, len, data.len())?;
        Ok(&mut data[range])
    }
}

impl fmt::Debug for ModuleInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInstance")
            .field("id", &self.id)
            .field("digest", &self.digest)
            .field("memory_size", &self.memory_size())
            .finish()
    }
}

/// Resolve a function export with a fixed signature.
fn typed_export<P: WasmParams, R: WasmResults>(
    store: &Store<()>,
    instance: &Instance,
    name: &str,
) -> ArenaResult<TypedFunc<P, R>> {
    let func = instance
        .get_func(store, name)
        .ok_or_else(|| ArenaError::UnknownExport(name.to_string()))?;
    func.typed::<P, R>(store)
        .map_err(|e| ArenaError::ExportSignature {
            name: name.to_string(),
            cause: e.to_string(),
        })
}

/// `addr..addr + len`, if it lies inside a memory of `memory_size` bytes.
fn checked_range(addr: u32, len: usize, memory_size: usize) -> ArenaResult<Range<usize>> {
    let start = addr as usize;
    match start.checked_add(len) {
        Some(end) if end <= memory_size => Ok(start..end),
        _ => Err(ArenaError::OutOfBounds {
            offset: addr,
            len,
            memory_size,
        }),
    }
}

fn trap(export: &str, error: wasmi::Error) -> ArenaError {
    ArenaError::ModuleTrap {
        export: export.to_string(),
        message: error.to_string(),
    }
}
