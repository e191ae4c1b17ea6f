//! Arena bridge into a sandboxed WASM module's linear memory.
//!
//! # Architecture
//!
//! The host never holds native pointers into the module.  Instead it stages
//! data through a bump allocator that lives inside the module and reads
//! results back out by offset:
//!
//! ```text
//! Payload (wasm bytes) → ModuleInstance (wasmi) → ArenaBridge
//!                                                  ├─ reset()
//!                                                  ├─ allocate / write_* → ArenaOffset
//!                                                  ├─ invoke(export, (i32, …)) → i32
//!                                                  └─ read_* (ArenaOffset)
//! ```
//!
//! ## Module contract
//! - `memory`: exported linear memory
//! - `malloc(size) → ptr`: bump allocation; does not need to grow memory
//! - `heap_reset()`: rewinds the bump pointer to the heap base
//! - `_initialize()`: optional one-time constructor
//!
//! The bridge grows memory on the module's behalf, both for its own
//! allocations and ahead of calls that allocate internally
//! ([`ArenaBridge::reserve_headroom`]).
//!
//! Export names are configurable through [`BridgeConfig`].
//!
//! ## Reclamation
//!
//! There is no per-allocation free.  Every [`ArenaOffset`] is tagged with the
//! generation it was issued in; [`ArenaBridge::reset`] reclaims the whole
//! arena and starts a new generation, after which older offsets are rejected.

pub mod bridge;
pub mod config;
pub mod error;
pub mod instance;
pub mod offset;
pub mod payload;

pub use bridge::ArenaBridge;
pub use config::BridgeConfig;
pub use error::{ArenaError, ArenaResult};
pub use instance::ModuleInstance;
pub use offset::ArenaOffset;
pub use payload::{ExportEntry, ExportKind, Payload};

/// Size of one linear-memory page (64 KiB).
pub const WASM_PAGE_SIZE: usize = 64 * 1024;

/// Re-exported so callers can name argument tuples for [`ArenaBridge::invoke`].
pub use wasmi::WasmParams;
