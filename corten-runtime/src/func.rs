//! Function instances: Wasm functions and host functions behind one
//! invocable representation.

use alloc::sync::Arc;
use alloc::vec::Vec;

use corten_format::{Expr, FuncType, ValueType};

use crate::host::HostFunction;
use crate::store::ModuleAddr;

/// A Wasm function: its signature, owning module, locals, and body.
///
/// Stored behind an [`Arc`] in the instance so entering a function is a
/// reference-count bump, not a body copy.
#[derive(Debug, Clone)]
pub struct WasmFunction {
    /// The function signature.
    pub ty: FuncType,
    /// Address of the owning module instance.
    pub module_addr: ModuleAddr,
    /// Declared locals, flattened (parameters not included).
    pub locals: Vec<ValueType>,
    /// The body expression.
    pub body: Expr,
}

/// A function instance in the store.
///
/// Polymorphic over invocation: a Wasm function is interpreted against
/// its owning module, a host function is a call out of the engine.
#[derive(Clone)]
pub enum FunctionInstance {
    /// A function defined by a Wasm module.
    Wasm(Arc<WasmFunction>),
    /// A function provided by the host.
    Host {
        /// The declared signature.
        ty: FuncType,
        /// The invocation handle.
        handler: Arc<dyn HostFunction>,
    },
}

impl FunctionInstance {
    /// Wrap a Wasm function.
    #[must_use]
    pub fn wasm(func: WasmFunction) -> Self {
        Self::Wasm(Arc::new(func))
    }

    /// The function signature, regardless of origin.
    #[must_use]
    pub fn ty(&self) -> &FuncType {
        match self {
            Self::Wasm(func) => &func.ty,
            Self::Host { ty, .. } => ty,
        }
    }

    /// Whether this is a host function.
    #[must_use]
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host { .. })
    }
}

impl core::fmt::Debug for FunctionInstance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Wasm(func) => f.debug_tuple("Wasm").field(&func.ty).finish(),
            Self::Host { ty, .. } => f.debug_struct("Host").field("ty", ty).finish(),
        }
    }
}
