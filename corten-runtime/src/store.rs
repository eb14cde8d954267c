//! The store: flat, address-indexed pools of runtime instances.
//!
//! Addresses are dense `u32` handles and are never reused within a
//! store's lifetime, so a module instance can refer to anything it needs
//! with plain integers and no ownership cycles exist. A registration
//! that fails partway is undone with [`Store::reset`], which rolls every
//! pool back to the last [`Store::commit`] point.

use crate::prelude::{
    codes, BTreeMap, Error, FunctionInstance, GlobalInstance, MemoryInstance, ModuleInstance,
    Result, String, TableInstance, Vec,
};

/// Address of a function instance.
pub type FuncAddr = u32;
/// Address of a table instance.
pub type TableAddr = u32;
/// Address of a memory instance.
pub type MemAddr = u32;
/// Address of a global instance.
pub type GlobalAddr = u32;
/// Address of a module instance.
pub type ModuleAddr = u32;

const WRONG_ADDRESS: Error =
    Error::runtime(codes::WRONG_INSTANCE_ADDRESS, "address does not resolve in this store");

/// Pool sizes at the last commit point; `reset` truncates back to these.
#[derive(Debug, Clone, Copy, Default)]
struct CommitMarks {
    funcs: usize,
    tables: usize,
    mems: usize,
    globals: usize,
    modules: usize,
}

/// The runtime universe. Owns every instance exclusively.
#[derive(Default)]
pub struct Store {
    funcs: Vec<FunctionInstance>,
    tables: Vec<TableInstance>,
    mems: Vec<MemoryInstance>,
    globals: Vec<GlobalInstance>,
    modules: Vec<ModuleInstance>,
    names: BTreeMap<String, ModuleAddr>,
    marks: CommitMarks,
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function instance, returning its address.
    pub fn push_func(&mut self, instance: FunctionInstance) -> FuncAddr {
        self.funcs.push(instance);
        (self.funcs.len() - 1) as FuncAddr
    }

    /// Add a table instance, returning its address.
    pub fn push_table(&mut self, instance: TableInstance) -> TableAddr {
        self.tables.push(instance);
        (self.tables.len() - 1) as TableAddr
    }

    /// Add a memory instance, returning its address.
    pub fn push_mem(&mut self, instance: MemoryInstance) -> MemAddr {
        self.mems.push(instance);
        (self.mems.len() - 1) as MemAddr
    }

    /// Add a global instance, returning its address.
    pub fn push_global(&mut self, instance: GlobalInstance) -> GlobalAddr {
        self.globals.push(instance);
        (self.globals.len() - 1) as GlobalAddr
    }

    /// Add a module instance, returning its address.
    pub fn push_module(&mut self, instance: ModuleInstance) -> ModuleAddr {
        self.modules.push(instance);
        (self.modules.len() - 1) as ModuleAddr
    }

    /// Resolve a function address.
    pub fn func(&self, addr: FuncAddr) -> Result<&FunctionInstance> {
        self.funcs.get(addr as usize).ok_or(WRONG_ADDRESS)
    }

    /// Resolve a table address.
    pub fn table(&self, addr: TableAddr) -> Result<&TableInstance> {
        self.tables.get(addr as usize).ok_or(WRONG_ADDRESS)
    }

    /// Resolve a table address mutably.
    pub fn table_mut(&mut self, addr: TableAddr) -> Result<&mut TableInstance> {
        self.tables.get_mut(addr as usize).ok_or(WRONG_ADDRESS)
    }

    /// Resolve a memory address.
    pub fn mem(&self, addr: MemAddr) -> Result<&MemoryInstance> {
        self.mems.get(addr as usize).ok_or(WRONG_ADDRESS)
    }

    /// Resolve a memory address mutably.
    pub fn mem_mut(&mut self, addr: MemAddr) -> Result<&mut MemoryInstance> {
        self.mems.get_mut(addr as usize).ok_or(WRONG_ADDRESS)
    }

    /// Resolve a global address.
    pub fn global(&self, addr: GlobalAddr) -> Result<&GlobalInstance> {
        self.globals.get(addr as usize).ok_or(WRONG_ADDRESS)
    }

    /// Resolve a global address mutably.
    pub fn global_mut(&mut self, addr: GlobalAddr) -> Result<&mut GlobalInstance> {
        self.globals.get_mut(addr as usize).ok_or(WRONG_ADDRESS)
    }

    /// Resolve a module address.
    pub fn module(&self, addr: ModuleAddr) -> Result<&ModuleInstance> {
        self.modules.get(addr as usize).ok_or(WRONG_ADDRESS)
    }

    /// Look up a registered module by name.
    #[must_use]
    pub fn find_module(&self, name: &str) -> Option<ModuleAddr> {
        self.names.get(name).copied()
    }

    /// Bind a name to a module address.
    pub fn register_module_name(&mut self, name: &str, addr: ModuleAddr) -> Result<()> {
        if self.names.contains_key(name) {
            return Err(Error::instantiation(
                codes::MODULE_NAME_CONFLICT,
                "module name already registered",
            ));
        }
        self.names.insert(String::from(name), addr);
        Ok(())
    }

    /// Make everything added so far permanent.
    pub fn commit(&mut self) {
        self.marks = CommitMarks {
            funcs: self.funcs.len(),
            tables: self.tables.len(),
            mems: self.mems.len(),
            globals: self.globals.len(),
            modules: self.modules.len(),
        };
    }

    /// Drop everything added since the last commit, including name
    /// bindings to the dropped module instances.
    pub fn reset(&mut self) {
        self.funcs.truncate(self.marks.funcs);
        self.tables.truncate(self.marks.tables);
        self.mems.truncate(self.marks.mems);
        self.globals.truncate(self.marks.globals);
        self.modules.truncate(self.marks.modules);
        let keep = self.marks.modules as ModuleAddr;
        self.names.retain(|_, addr| *addr < keep);
    }

    /// Number of function instances currently in the store.
    #[must_use]
    pub fn func_count(&self) -> usize {
        self.funcs.len()
    }

    /// Number of module instances currently in the store.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global::GlobalInstance;
    use corten_format::{GlobalType, Value, ValueType};

    fn some_global() -> GlobalInstance {
        GlobalInstance::new(
            GlobalType { value_type: ValueType::I32, mutable: true },
            Value::I32(0),
        )
        .unwrap()
    }

    #[test]
    fn test_addresses_are_dense() {
        let mut store = Store::new();
        assert_eq!(store.push_global(some_global()), 0);
        assert_eq!(store.push_global(some_global()), 1);
        assert!(store.global(1).is_ok());
        assert_eq!(store.global(2).unwrap_err().code(), codes::WRONG_INSTANCE_ADDRESS);
    }

    #[test]
    fn test_reset_rolls_back_to_commit() {
        let mut store = Store::new();
        store.push_global(some_global());
        let addr = store.push_module(ModuleInstance::new("env"));
        store.register_module_name("env", addr).unwrap();
        store.commit();

        store.push_global(some_global());
        let addr = store.push_module(ModuleInstance::new("scratch"));
        store.register_module_name("scratch", addr).unwrap();
        store.reset();

        assert_eq!(store.module_count(), 1);
        assert!(store.find_module("env").is_some());
        assert!(store.find_module("scratch").is_none());
        assert!(store.global(1).is_err());
    }

    #[test]
    fn test_name_conflict() {
        let mut store = Store::new();
        let addr = store.push_module(ModuleInstance::new("env"));
        store.register_module_name("env", addr).unwrap();
        assert_eq!(
            store.register_module_name("env", addr).unwrap_err().code(),
            codes::MODULE_NAME_CONFLICT
        );
    }
}
