//! Arena allocation, marshaling and export invocation over one module.

use tracing::{debug, trace};

use crate::config::BridgeConfig;
use crate::error::{ArenaError, ArenaResult};
use crate::instance::ModuleInstance;
use crate::offset::ArenaOffset;
use crate::payload::Payload;
use crate::WasmParams;

/// Host-side view of one module's arena.
///
/// Allocation is delegated to the module's own bump allocator so that host
/// reservations and the module's internal allocations share one heap.  The
/// bridge adds what that allocator lacks: bounds checks, memory growth and
/// generation tracking for the offsets it hands out.
#[derive(Debug)]
pub struct ArenaBridge {
    instance: ModuleInstance,
    generation: u64,
    allocated: usize,
    /// Set after an allocation failed past the module's bump pointer; the
    /// heap is in an unknown state until the next reset.
    poisoned: bool,
}

impl ArenaBridge {
    pub fn new(instance: ModuleInstance) -> Self {
        Self {
            instance,
            generation: 0,
            allocated: 0,
            poisoned: false,
        }
    }

    /// Instantiate `payload` and wrap it.
    pub fn from_payload(payload: &Payload, config: BridgeConfig) -> ArenaResult<Self> {
        ModuleInstance::instantiate(payload, config).map(Self::new)
    }

    pub fn instance(&self) -> &ModuleInstance {
        &self.instance
    }

    /// Current reset generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bytes handed out since the last reset.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated
    }

    pub fn memory_size(&self) -> usize {
        self.instance.memory_size()
    }

    /// Reclaim the whole arena. Every offset issued so far becomes stale.
    pub fn reset(&mut self) -> ArenaResult<()> {
        self.instance.reset_heap()?;
        self.generation += 1;
        self.allocated = 0;
        self.poisoned = false;
        trace!(
            instance = self.instance.id(),
            generation = self.generation,
            "arena reset"
        );
        Ok(())
    }

    /// Reserve `size` contiguous bytes.
    ///
    /// The bytes are not zeroed; callers write before they read.
    pub fn allocate(&mut self, size: usize) -> ArenaResult<ArenaOffset> {
        let available = || self.memory_size().saturating_sub(self.allocated);
        if self.poisoned {
            return Err(ArenaError::OutOfArenaMemory {
                requested: size,
                available: available(),
            });
        }
        let request = i32::try_from(size).map_err(|_| ArenaError::OutOfArenaMemory {
            requested: size,
            available: available(),
        })?;

        let raw = self.instance.alloc(request)?;
        if raw == 0 && size > 0 {
            self.poisoned = true;
            return Err(ArenaError::OutOfArenaMemory {
                requested: size,
                available: 0,
            });
        }

        let addr = raw as u32;
        let end = u64::from(addr) + size as u64;
        let grown = if end > u64::from(u32::MAX) + 1 {
            Err(ArenaError::OutOfArenaMemory {
                requested: size,
                available: self.memory_size().saturating_sub(addr as usize),
            })
        } else {
            self.instance.ensure_len(end as usize, size, addr)
        };
        if let Err(e) = grown {
            self.poisoned = true;
            return Err(e);
        }

        self.allocated += size;
        trace!(
            instance = self.instance.id(),
            generation = self.generation,
            addr,
            size,
            "arena allocate"
        );
        Ok(ArenaOffset::new(addr, self.generation, self.instance.id()))
    }

    /// Make sure `bytes` of linear memory exist past the module's heap
    /// pointer without moving it.
    ///
    /// The module allocator never grows memory, so allocations the module
    /// makes on its own during the next call must already fit.
    pub fn reserve_headroom(&mut self, bytes: usize) -> ArenaResult<()> {
        let top = self.instance.alloc(0)? as u32;
        let end = u64::from(top) + bytes as u64;
        if end > u64::from(u32::MAX) + 1 {
            return Err(ArenaError::OutOfArenaMemory {
                requested: bytes,
                available: self.memory_size().saturating_sub(top as usize),
            });
        }
        self.instance.ensure_len(end as usize, bytes, top)?;
        trace!(instance = self.instance.id(), top, bytes, "arena headroom");
        Ok(())
    }

    /// Allocate and copy `bytes` into the arena.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> ArenaResult<ArenaOffset> {
        let offset = self.allocate(bytes.len())?;
        self.instance
            .read_mut(offset.addr(), bytes.len())?
            .copy_from_slice(bytes);
        Ok(offset)
    }

    /// Allocate `4 * words.len()` bytes and store each word little-endian.
    pub fn write_ints(&mut self, words: &[u32]) -> ArenaResult<ArenaOffset> {
        let len = words.len() * 4;
        let offset = self.allocate(len)?;
        let dst = self.instance.read_mut(offset.addr(), len)?;
        for (chunk, word) in dst.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Ok(offset)
    }

    /// Copy `count` bytes out of the arena.
    pub fn read_bytes(&self, offset: ArenaOffset, count: usize) -> ArenaResult<Vec<u8>> {
        self.check(offset)?;
        Ok(self.instance.read(offset.addr(), count)?.to_vec())
    }

    /// Read `count` little-endian words.
    pub fn read_ints(&self, offset: ArenaOffset, count: usize) -> ArenaResult<Vec<u32>> {
        self.check(offset)?;
        let len = count.checked_mul(4).ok_or(ArenaError::OutOfBounds {
            offset: offset.addr(),
            len: usize::MAX,
            memory_size: self.memory_size(),
        })?;
        let src = self.instance.read(offset.addr(), len)?;
        Ok(src
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    /// Read a single little-endian word.
    pub fn read_int(&self, offset: ArenaOffset) -> ArenaResult<u32> {
        self.read_ints(offset, 1).map(|words| words[0])
    }

    /// Hand offsets back. Nothing is reclaimed before [`ArenaBridge::reset`].
    pub fn release(&mut self, offsets: &[ArenaOffset]) {
        trace!(
            instance = self.instance.id(),
            generation = self.generation,
            count = offsets.len(),
            "arena release (deferred to reset)"
        );
    }

    /// Call export `name` with `i32` arguments, returning its `i32` result.
    pub fn invoke<P: WasmParams>(&mut self, name: &str, args: P) -> ArenaResult<i32> {
        debug!(instance = self.instance.id(), export = name, "invoke");
        let result = self.instance.call(name, args);
        match &result {
            Ok(value) => trace!(export = name, result = value, "invoke returned"),
            Err(e) => debug!(export = name, error = %e, "invoke failed"),
        }
        result
    }

    /// Treat a pointer returned by the module as an offset of the current
    /// generation. A null pointer yields `None`.
    pub fn adopt(&self, raw: i32) -> Option<ArenaOffset> {
        (raw != 0).then(|| ArenaOffset::new(raw as u32, self.generation, self.instance.id()))
    }

    fn check(&self, offset: ArenaOffset) -> ArenaResult<()> {
        if offset.owner() != self.instance.id() {
            return Err(ArenaError::ForeignOffset {
                offset: offset.addr(),
            });
        }
        if offset.generation() != self.generation {
            return Err(ArenaError::StaleOffset {
                offset: offset.addr(),
                issued: offset.generation(),
                current: self.generation,
            });
        }
        Ok(())
    }
}
