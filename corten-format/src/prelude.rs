//! Prelude module for corten-format.
//!
//! Provides a unified set of imports for both std and `no_std`
//! environments: the alloc types the module tree is built from, the
//! error machinery, and this crate's own public types. Downstream
//! crate preludes chain onto this one.

// Re-export from alloc; the crate is alloc-based in both build modes
pub use alloc::{
    boxed::Box,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

// Re-export from corten-error using its prelude
pub use corten_error::prelude::*;

// Re-export from this crate's modules
pub use crate::{
    binary, ArithmeticOp, BlockType, ComparisonOp, ConversionOp, CustomSection, DataSegment,
    ElemType, ElementSegment, Export, Expr, ExternalKind, FloatBits32, FloatBits64, FuncBody,
    FuncType, Global, GlobalType, Import, ImportDesc, Instruction, Limits, LoadOp, MemArg,
    MemoryType, Module, StoreOp, TableType, Value, ValueType, MAX_MEMORY_PAGES, PAGE_SIZE,
};
pub use crate::instructions::encode_expr;
