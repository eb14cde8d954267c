//! # Corten
//!
//! A standalone WebAssembly (MVP) runtime: it loads a binary module,
//! validates it, instantiates it into a [`Store`], and executes exported
//! functions, with host-provided modules ([`ImportObject`]) exposing
//! functions, tables, memories, and globals to the guest.
//!
//! The two entry points are [`Loader`] (bytes or files → validated
//! [`Module`]) and [`Runtime`] (registration, instantiation,
//! invocation). Every error a caller can see is logged exactly once at
//! this boundary through the `log` facade; inner crates only propagate.
//!
//! ```no_run
//! use corten::{Loader, Runtime, Value};
//!
//! fn run() -> corten::Result<()> {
//!     let module = Loader::new().parse_file("demo.wasm".as_ref())?;
//!     let mut runtime = Runtime::new();
//!     runtime.instantiate(&module, "demo")?;
//!     let results = runtime.invoke_export("add", &[Value::I32(2), Value::I32(3)])?;
//!     assert_eq!(results, vec![Value::I32(5)]);
//!     Ok(())
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

mod loader;
mod runtime;

pub use loader::Loader;
pub use runtime::Runtime;

pub use corten_error::{codes, Error, ErrorCategory, Result};
pub use corten_format::{FuncType, Limits, Module, Value, ValueType};
pub use corten_math::{FloatBits32, FloatBits64};
pub use corten_runtime::{
    FuncAddr, GlobalInstance, HostFunction, ImportObject, Interpreter, MemoryInstance,
    ModuleAddr, RuntimeConfig, Store, TableInstance,
};

/// The runtime version, embedded in compiled-module containers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
