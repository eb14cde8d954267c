//! The Corten runtime: store, instances, and the interpreter.
//!
//! The [`Store`] owns every runtime instance — functions, tables,
//! memories, globals, and module instances — behind stable integer
//! addresses. The [`Interpreter`] turns validated modules into module
//! instances (import resolution, allocation, segment initialisation,
//! start invocation) and executes exported functions on a value stack
//! with explicit frame and label stacks.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod func;
pub mod global;
pub mod host;
pub mod interpreter;
pub mod memory;
pub mod module_instance;
pub mod prelude;
pub mod stack;
pub mod store;
pub mod table;

pub use func::{FunctionInstance, WasmFunction};
pub use global::GlobalInstance;
pub use host::{HostFunction, ImportObject};
pub use interpreter::{Interpreter, RuntimeConfig};
pub use memory::MemoryInstance;
pub use module_instance::ModuleInstance;
pub use store::{FuncAddr, GlobalAddr, MemAddr, ModuleAddr, Store, TableAddr};
pub use table::TableInstance;
