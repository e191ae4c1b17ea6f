//! Synthetic fixture modules for the arena tests.
//!
//! Each fixture is a small import-free module with the same shape as a codec
//! payload: an exported memory, a bump allocator and a reset export, plus a
//! handful of functions the tests drive through the bridge.

#![allow(dead_code)]

use wasm_encoder::{
    BlockType, CodeSection, ConstExpr, ExportKind, ExportSection, Function, FunctionSection,
    GlobalSection, GlobalType, Instruction, MemArg, MemorySection, MemoryType, Module,
    TypeSection, ValType,
};

/// First address `malloc` hands out after a reset.
pub const HEAP_BASE: u32 = 1024;

/// Pages the fixture memory starts with.
pub const INITIAL_PAGES: u64 = 1;

/// Maximum pages the fixture memory declares.
pub const MAX_PAGES: u64 = 4;

// Type indices
const TYPE_I32_I32: u32 = 0;
const TYPE_VOID_VOID: u32 = 1;
const TYPE_I32X2_I32: u32 = 2;
const TYPE_I32X3_I32: u32 = 3;
const TYPE_VOID_I32: u32 = 4;

// Global indices
const GLOBAL_HEAP_PTR: u32 = 0;
const GLOBAL_INITIALIZED: u32 = 1;

// Function indices
const FN_MALLOC: u32 = 0;
const FN_HEAP_RESET: u32 = 1;
const FN_SUM_WORDS: u32 = 2;
const FN_FILL: u32 = 3;
const FN_BOOM: u32 = 4;
const FN_PEEK: u32 = 5;
const FN_ALLOC_AND_STORE: u32 = 6;
const FN_INITIALIZE: u32 = 7;
const FN_INITIALIZED: u32 = 8;

/// Allocator behaviour of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malloc {
    /// Bump allocator over `GLOBAL_HEAP_PTR`.
    Bump,
    /// Always returns 0.
    Null,
    /// Present but not exported.
    Hidden,
}

/// The standard fixture: bump allocator, every export present.
pub fn fixture_wasm() -> Vec<u8> {
    build(Malloc::Bump)
}

/// Assemble a fixture module.
///
/// Exports:
/// - `memory`
/// - `malloc(size) -> ptr`, `heap_reset()`
/// - `sum_words(ptr, count) -> i32`: wrapping sum of `count` words at `ptr`
/// - `fill(ptr, len, byte) -> len`
/// - `boom() -> i32`: traps
/// - `peek(ptr) -> i32`: one word load
/// - `alloc_and_store(value) -> ptr`: allocates a word internally and stores
///   `value` in it
/// - `_initialize()` and `initialized() -> i32`
pub fn build(malloc: Malloc) -> Vec<u8> {
    let mut module = Module::new();

    let mut types = TypeSection::new();
    types.ty().function(vec![ValType::I32], vec![ValType::I32]);
    types.ty().function(vec![], vec![]);
    types
        .ty()
        .function(vec![ValType::I32, ValType::I32], vec![ValType::I32]);
    types
        .ty()
        .function(vec![ValType::I32, ValType::I32, ValType::I32], vec![ValType::I32]);
    types.ty().function(vec![], vec![ValType::I32]);
    module.section(&types);

    let mut functions = FunctionSection::new();
    for ty in [
        TYPE_I32_I32,    // malloc
        TYPE_VOID_VOID,  // heap_reset
        TYPE_I32X2_I32,  // sum_words
        TYPE_I32X3_I32,  // fill
        TYPE_VOID_I32,   // boom
        TYPE_I32_I32,    // peek
        TYPE_I32_I32,    // alloc_and_store
        TYPE_VOID_VOID,  // _initialize
        TYPE_VOID_I32,   // initialized
    ] {
        functions.function(ty);
    }
    module.section(&functions);

    let mut memory = MemorySection::new();
    memory.memory(MemoryType {
        minimum: INITIAL_PAGES,
        maximum: Some(MAX_PAGES),
        memory64: false,
        shared: false,
        page_size_log2: None,
    });
    module.section(&memory);

    let mut globals = GlobalSection::new();
    for init in [HEAP_BASE as i32, 0] {
        globals.global(
            GlobalType {
                val_type: ValType::I32,
                mutable: true,
                shared: false,
            },
            &ConstExpr::i32_const(init),
        );
    }
    module.section(&globals);

    let mut exports = ExportSection::new();
    exports.export("memory", ExportKind::Memory, 0);
    if malloc != Malloc::Hidden {
        exports.export("malloc", ExportKind::Func, FN_MALLOC);
    }
    exports.export("heap_reset", ExportKind::Func, FN_HEAP_RESET);
    exports.export("sum_words", ExportKind::Func, FN_SUM_WORDS);
    exports.export("fill", ExportKind::Func, FN_FILL);
    exports.export("boom", ExportKind::Func, FN_BOOM);
    exports.export("peek", ExportKind::Func, FN_PEEK);
    exports.export("alloc_and_store", ExportKind::Func, FN_ALLOC_AND_STORE);
    exports.export("_initialize", ExportKind::Func, FN_INITIALIZE);
    exports.export("initialized", ExportKind::Func, FN_INITIALIZED);
    module.section(&exports);

    let mut code = CodeSection::new();
    code.function(&match malloc {
        Malloc::Null => emit_null_malloc(),
        Malloc::Bump | Malloc::Hidden => emit_malloc(),
    });
    code.function(&emit_heap_reset());
    code.function(&emit_sum_words());
    code.function(&emit_fill());
    code.function(&emit_boom());
    code.function(&emit_peek());
    code.function(&emit_alloc_and_store());
    code.function(&emit_initialize());
    code.function(&emit_initialized());
    module.section(&code);

    module.finish()
}

/// Install a test subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ══════════════════════════════════════════════════════════════════════════════
// Function bodies
// ══════════════════════════════════════════════════════════════════════════════

fn memarg(offset: u64, align: u32) -> MemArg {
    MemArg {
        offset,
        align,
        memory_index: 0,
    }
}

/// `malloc(size)`: return the heap pointer, then advance it by `size`.
fn emit_malloc() -> Function {
    let mut f = Function::new(vec![(1, ValType::I32)]); // local 1: old_ptr
    f.instruction(&Instruction::GlobalGet(GLOBAL_HEAP_PTR));
    f.instruction(&Instruction::LocalSet(1));
    f.instruction(&Instruction::GlobalGet(GLOBAL_HEAP_PTR));
    f.instruction(&Instruction::LocalGet(0));
    f.instruction(&Instruction::I32Add);
    f.instruction(&Instruction::GlobalSet(GLOBAL_HEAP_PTR));
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::End);
    f
}

fn emit_null_malloc() -> Function {
    let mut f = Function::new(vec![]);
    f.instruction(&Instruction::I32Const(0));
    f.instruction(&Instruction::End);
    f
}

fn emit_heap_reset() -> Function {
    let mut f = Function::new(vec![]);
    f.instruction(&Instruction::I32Const(HEAP_BASE as i32));
    f.instruction(&Instruction::GlobalSet(GLOBAL_HEAP_PTR));
    f.instruction(&Instruction::End);
    f
}

/// `sum_words(ptr, count)`: loop over `count` words, accumulating in local 2.
fn emit_sum_words() -> Function {
    let mut f = Function::new(vec![(1, ValType::I32)]); // local 2: acc
    f.instruction(&Instruction::Block(BlockType::Empty));
    f.instruction(&Instruction::Loop(BlockType::Empty));
    // count == 0 → exit
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::I32Eqz);
    f.instruction(&Instruction::BrIf(1));
    // acc += load(ptr)
    f.instruction(&Instruction::LocalGet(2));
    f.instruction(&Instruction::LocalGet(0));
    f.instruction(&Instruction::I32Load(memarg(0, 2)));
    f.instruction(&Instruction::I32Add);
    f.instruction(&Instruction::LocalSet(2));
    // ptr += 4
    f.instruction(&Instruction::LocalGet(0));
    f.instruction(&Instruction::I32Const(4));
    f.instruction(&Instruction::I32Add);
    f.instruction(&Instruction::LocalSet(0));
    // count -= 1
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::I32Const(1));
    f.instruction(&Instruction::I32Sub);
    f.instruction(&Instruction::LocalSet(1));
    f.instruction(&Instruction::Br(0));
    f.instruction(&Instruction::End);
    f.instruction(&Instruction::End);
    f.instruction(&Instruction::LocalGet(2));
    f.instruction(&Instruction::End);
    f
}

/// `fill(ptr, len, byte)` via `memory.fill`; returns `len`.
fn emit_fill() -> Function {
    let mut f = Function::new(vec![]);
    f.instruction(&Instruction::LocalGet(0));
    f.instruction(&Instruction::LocalGet(2));
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::MemoryFill(0));
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::End);
    f
}

fn emit_boom() -> Function {
    let mut f = Function::new(vec![]);
    f.instruction(&Instruction::Unreachable);
    f.instruction(&Instruction::End);
    f
}

fn emit_peek() -> Function {
    let mut f = Function::new(vec![]);
    f.instruction(&Instruction::LocalGet(0));
    f.instruction(&Instruction::I32Load(memarg(0, 2)));
    f.instruction(&Instruction::End);
    f
}

/// `alloc_and_store(value)`: `p = malloc(4); *p = value; return p`.
fn emit_alloc_and_store() -> Function {
    let mut f = Function::new(vec![(1, ValType::I32)]); // local 1: p
    f.instruction(&Instruction::I32Const(4));
    f.instruction(&Instruction::Call(FN_MALLOC));
    f.instruction(&Instruction::LocalSet(1));
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::LocalGet(0));
    f.instruction(&Instruction::I32Store(memarg(0, 2)));
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::End);
    f
}

fn emit_initialize() -> Function {
    let mut f = Function::new(vec![]);
    f.instruction(&Instruction::GlobalGet(GLOBAL_INITIALIZED));
    f.instruction(&Instruction::I32Const(1));
    f.instruction(&Instruction::I32Add);
    f.instruction(&Instruction::GlobalSet(GLOBAL_INITIALIZED));
    f.instruction(&Instruction::End);
    f
}

fn emit_initialized() -> Function {
    let mut f = Function::new(vec![]);
    f.instruction(&Instruction::GlobalGet(GLOBAL_INITIALIZED));
    f.instruction(&Instruction::End);
    f
}
