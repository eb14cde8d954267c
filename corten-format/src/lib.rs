//! WebAssembly binary format handling for Corten.
//!
//! This crate defines the typed module tree (sections, segments, types,
//! expressions, instructions) produced by the decoder and consumed by the
//! validator and interpreter, together with the binary-format constants
//! and the encoder that serialises a module back to bytes.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod binary;
pub mod instructions;
pub mod module;
pub mod prelude;
pub mod section;
pub mod types;
pub mod values;

pub use instructions::{ArithmeticOp, ComparisonOp, ConversionOp, Expr, Instruction, LoadOp, MemArg, StoreOp};
pub use module::{DataSegment, ElementSegment, Export, FuncBody, Global, Import, ImportDesc, Module};
pub use section::CustomSection;
pub use types::{
    BlockType, ElemType, ExternalKind, FuncType, GlobalType, Limits, MemoryType, TableType,
    ValueType, MAX_MEMORY_PAGES, PAGE_SIZE,
};
pub use values::Value;

// Float bit-pattern wrappers travel with the value model.
pub use corten_math::{FloatBits32, FloatBits64};
