//! Opaque offsets into the arena.

use std::fmt;

/// A byte offset into a module's linear memory, valid until the next reset.
///
/// Only an [`ArenaBridge`](crate::ArenaBridge) can issue one, and only the
/// bridge that issued it accepts it back, and only within the same
/// generation.  The sole arithmetic offered is [`ArenaOffset::word`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaOffset {
    addr: u32,
    generation: u64,
    owner: u32,
}

impl ArenaOffset {
    pub(crate) const fn new(addr: u32, generation: u64, owner: u32) -> Self {
        Self {
            addr,
            generation,
            owner,
        }
    }

    /// The offset of the `index`-th 4-byte word from this one.
    ///
    /// Used to address consecutive integer slots of a single allocation.
    pub const fn word(self, index: u32) -> Self {
        Self {
            addr: self.addr.wrapping_add(index.wrapping_mul(4)),
            ..self
        }
    }

    /// The offset as an `i32` argument for an export call.
    pub const fn as_arg(self) -> i32 {
        self.addr as i32
    }

    /// Reset generation this offset belongs to.
    pub const fn generation(self) -> u64 {
        self.generation
    }

    pub(crate) const fn addr(self) -> u32 {
        self.addr
    }

    pub(crate) const fn owner(self) -> u32 {
        self.owner
    }
}

impl fmt::Debug for ArenaOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArenaOffset({:#x}@gen{})", self.addr, self.generation)
    }
}
