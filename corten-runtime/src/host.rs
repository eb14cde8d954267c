//! Host-provided modules.
//!
//! An [`ImportObject`] is the host's side of linking: a module name plus
//! name-keyed maps of functions, tables, memories, and globals that
//! guest modules can import. Registering one creates an ordinary module
//! instance in the store whose function instances dispatch to
//! [`HostFunction`] handlers.

use crate::prelude::{
    Arc, BTreeMap, Box, FuncType, GlobalInstance, MemoryInstance, Result, Store, String,
    TableInstance, Value, Vec,
};

/// A function implemented by the host.
///
/// The handler receives the store and the argument vector and returns
/// the result vector. It may re-enter the engine by running another
/// invocation against the same store; the engine's own stacks live on
/// the machine call stack across such a re-entry.
pub trait HostFunction: Send + Sync {
    /// Invoke the host function.
    fn call(&self, store: &mut Store, args: &[Value]) -> Result<Vec<Value>>;
}

impl<F> HostFunction for F
where
    F: Fn(&mut Store, &[Value]) -> Result<Vec<Value>> + Send + Sync,
{
    fn call(&self, store: &mut Store, args: &[Value]) -> Result<Vec<Value>> {
        self(store, args)
    }
}

/// A host-provided module: things the host exposes to guests by name.
pub struct ImportObject {
    name: String,
    pub(crate) funcs: BTreeMap<String, (FuncType, Arc<dyn HostFunction>)>,
    pub(crate) tables: BTreeMap<String, TableInstance>,
    pub(crate) mems: BTreeMap<String, MemoryInstance>,
    pub(crate) globals: BTreeMap<String, GlobalInstance>,
}

impl ImportObject {
    /// Create an import object registered under `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            funcs: BTreeMap::new(),
            tables: BTreeMap::new(),
            mems: BTreeMap::new(),
            globals: BTreeMap::new(),
        }
    }

    /// The module name guests import from.
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.name
    }

    /// Expose a host function.
    pub fn add_func<F>(&mut self, name: &str, ty: FuncType, handler: F)
    where
        F: HostFunction + 'static,
    {
        let boxed: Box<dyn HostFunction> = Box::new(handler);
        self.funcs.insert(String::from(name), (ty, Arc::from(boxed)));
    }

    /// Expose a host table.
    pub fn add_table(&mut self, name: &str, table: TableInstance) {
        self.tables.insert(String::from(name), table);
    }

    /// Expose a host memory.
    pub fn add_memory(&mut self, name: &str, memory: MemoryInstance) {
        self.mems.insert(String::from(name), memory);
    }

    /// Expose a host global.
    pub fn add_global(&mut self, name: &str, global: GlobalInstance) {
        self.globals.insert(String::from(name), global);
    }
}

impl core::fmt::Debug for ImportObject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImportObject")
            .field("name", &self.name)
            .field("funcs", &self.funcs.keys().collect::<Vec<_>>())
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .field("mems", &self.mems.keys().collect::<Vec<_>>())
            .field("globals", &self.globals.keys().collect::<Vec<_>>())
            .finish()
    }
}
