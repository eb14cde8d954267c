//! Prelude module for corten-runtime.
//!
//! Provides a unified set of imports for both std and `no_std`
//! environments: the collection and sync types the store is built
//! from, the format crate's prelude (error machinery included), and
//! this crate's store, instance, and engine types.

// Re-export from alloc; the crate is alloc-based in both build modes
pub use alloc::{boxed::Box, collections::BTreeMap, sync::Arc};

// Re-export from corten-format using its prelude
pub use corten_format::prelude::*;

// Re-export from this crate's modules
pub use crate::{
    func::{FunctionInstance, WasmFunction},
    global::GlobalInstance,
    host::{HostFunction, ImportObject},
    interpreter::{Interpreter, RuntimeConfig},
    memory::MemoryInstance,
    module_instance::ModuleInstance,
    stack::{Frame, Label, ValueStack},
    store::{FuncAddr, GlobalAddr, MemAddr, ModuleAddr, Store, TableAddr},
    table::TableInstance,
};
