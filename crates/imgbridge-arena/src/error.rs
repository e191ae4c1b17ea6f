//! Arena bridge error types.

use thiserror::Error;

/// Errors raised by the payload loader, the module instance and the bridge.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// The payload is not a valid WebAssembly module.
    #[error("invalid module payload: {0}")]
    InvalidPayload(String),

    /// The compressed payload could not be inflated.
    #[error("failed to inflate module payload: {0}")]
    Inflate(#[from] std::io::Error),

    /// The module could not be compiled or instantiated.
    #[error("module instantiation failed: {0}")]
    Instantiation(String),

    /// The module does not export the configured linear memory.
    #[error("module does not export memory '{0}'")]
    MissingMemory(String),

    /// No export with this name exists in the module.
    #[error("unknown export: {0}")]
    UnknownExport(String),

    /// The export exists but its signature does not match the call.
    #[error("export '{name}' has an unexpected signature: {cause}")]
    ExportSignature { name: String, cause: String },

    /// Execution faulted inside the sandbox.
    #[error("module trapped in '{export}': {message}")]
    ModuleTrap { export: String, message: String },

    /// Linear memory cannot hold the requested allocation.
    #[error("out of arena memory: requested {requested} bytes, {available} available")]
    OutOfArenaMemory { requested: usize, available: usize },

    /// A read or write fell outside linear memory.
    #[error("out-of-bounds arena access: offset={offset}, len={len}, memory size={memory_size}")]
    OutOfBounds {
        offset: u32,
        len: usize,
        memory_size: usize,
    },

    /// The offset was issued before the most recent reset.
    #[error("stale arena offset {offset}: issued in generation {issued}, arena is at {current}")]
    StaleOffset {
        offset: u32,
        issued: u64,
        current: u64,
    },

    /// The offset was issued by a different bridge.
    #[error("arena offset {offset} belongs to another module instance")]
    ForeignOffset { offset: u32 },
}

/// Arena result type alias.
pub type ArenaResult<T> = Result<T, ArenaError>;
