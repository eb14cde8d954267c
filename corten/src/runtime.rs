//! The embedding runtime: registration, instantiation, invocation.

use alloc::vec::Vec;

use corten_error::{codes, Error, Result};
use corten_format::{Module, Value};
use corten_runtime::{FuncAddr, ImportObject, Interpreter, ModuleAddr, RuntimeConfig, Store};
use log::error;

/// A store plus an interpreter, with the active-module bookkeeping the
/// embedding API needs.
///
/// One invocation runs at a time; host functions may re-enter through
/// the store they receive. Every error returned here has already been
/// logged once.
#[derive(Default)]
pub struct Runtime {
    store: Store,
    interp: Interpreter,
    active: Option<ModuleAddr>,
}

impl Runtime {
    /// Create a runtime with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime with explicit engine limits.
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { interp: Interpreter::with_config(config), ..Self::default() }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Register a host-provided module by name.
    pub fn register_import_object(&mut self, object: &ImportObject) -> Result<ModuleAddr> {
        self.interp
            .register_import_object(&mut self.store, object)
            .inspect_err(|err| error!("registering host module {:?} failed: {err}", object.module_name()))
    }

    /// Validate and register a Wasm module under a name, so later
    /// modules can import from it.
    pub fn register_module(&mut self, module: &Module, name: &str) -> Result<ModuleAddr> {
        self.instantiate_checked(module, name)
            .inspect_err(|err| error!("registering module {name:?} failed: {err}"))
    }

    /// Validate and instantiate a module as the active module.
    pub fn instantiate(&mut self, module: &Module, name: &str) -> Result<ModuleAddr> {
        let addr = self
            .instantiate_checked(module, name)
            .inspect_err(|err| error!("instantiating module {name:?} failed: {err}"))?;
        self.active = Some(addr);
        Ok(addr)
    }

    fn instantiate_checked(&mut self, module: &Module, name: &str) -> Result<ModuleAddr> {
        corten_decoder::validate_module(module)?;
        self.interp.instantiate(&mut self.store, module, name)
    }

    /// Invoke the function at a store address.
    pub fn invoke(&mut self, func_addr: FuncAddr, params: &[Value]) -> Result<Vec<Value>> {
        self.interp
            .invoke(&mut self.store, func_addr, params)
            .inspect_err(|err| error!("invocation of function {func_addr} failed: {err}"))
    }

    /// Invoke an export of the active module by name.
    pub fn invoke_export(&mut self, name: &str, params: &[Value]) -> Result<Vec<Value>> {
        let addr = self.active_export(name).inspect_err(|err| error!("{err}"))?;
        self.invoke(addr, params)
    }

    /// Address of a named function export of a registered module.
    pub fn get_export(&self, module_name: &str, export_name: &str) -> Result<FuncAddr> {
        let module_addr = self.store.find_module(module_name).ok_or(Error::instantiation(
            codes::MODULE_NOT_FOUND,
            "module is not registered",
        ))?;
        self.store
            .module(module_addr)?
            .exported_func(export_name)
            .ok_or(Error::instantiation(codes::EXPORT_NOT_FOUND, "export not found"))
    }

    /// Names of the active module's exported functions.
    pub fn exported_functions(&self) -> Vec<alloc::string::String> {
        let Some(addr) = self.active else {
            return Vec::new();
        };
        match self.store.module(addr) {
            Ok(instance) => instance
                .exported_func_names()
                .map(alloc::string::String::from)
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// The active module's address, if one is instantiated.
    #[must_use]
    pub fn active_module(&self) -> Option<ModuleAddr> {
        self.active
    }

    fn active_export(&self, name: &str) -> Result<FuncAddr> {
        let addr = self.active.ok_or(Error::runtime(
            codes::NOT_INSTANTIATED,
            "no active module",
        ))?;
        self.store
            .module(addr)?
            .exported_func(name)
            .ok_or(Error::instantiation(codes::EXPORT_NOT_FOUND, "export not found"))
    }
}
