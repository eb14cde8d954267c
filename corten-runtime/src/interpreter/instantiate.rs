//! Module instantiation and host-module registration.

use alloc::vec::Vec;

use corten_error::{codes, Error, Result};
use corten_format::{Expr, ImportDesc, Instruction, Limits, Module, Value};

use crate::func::{FunctionInstance, WasmFunction};
use crate::global::GlobalInstance;
use crate::host::ImportObject;
use crate::memory::MemoryInstance;
use crate::module_instance::ModuleInstance;
use crate::store::{FuncAddr, MemAddr, ModuleAddr, Store, TableAddr};
use crate::table::TableInstance;

use super::Interpreter;

const UNKNOWN_IMPORT: Error =
    Error::instantiation(codes::UNKNOWN_IMPORT, "import does not resolve");
const INCOMPATIBLE: Error = Error::instantiation(
    codes::INCOMPATIBLE_IMPORT_TYPE,
    "import resolves to a different kind or type",
);
const SEGMENT_OOB: Error = Error::instantiation(
    codes::SEGMENT_OUT_OF_BOUNDS,
    "segment does not fit its table or memory",
);

/// Whether provided limits `a` satisfy declared import limits `b`.
fn limits_match(a: Limits, b: Limits) -> bool {
    if a.min < b.min {
        return false;
    }
    match b.max {
        None => true,
        Some(b_max) => matches!(a.max, Some(a_max) if a_max <= b_max),
    }
}

impl Interpreter {
    /// Register a host-provided module in the store.
    ///
    /// All of the object's functions, tables, memories, and globals
    /// become store instances exported under their map keys.
    pub fn register_import_object(
        &mut self,
        store: &mut Store,
        object: &ImportObject,
    ) -> Result<ModuleAddr> {
        // Undo any partial registration a previous failure left behind.
        store.reset();
        if store.find_module(object.module_name()).is_some() {
            return Err(Error::instantiation(
                codes::MODULE_NAME_CONFLICT,
                "module name already registered",
            ));
        }

        let mut instance = ModuleInstance::new(object.module_name());
        for (name, (ty, handler)) in &object.funcs {
            let addr = store.push_func(FunctionInstance::Host {
                ty: ty.clone(),
                handler: handler.clone(),
            });
            instance.func_addrs.push(addr);
            instance.export_func(name, instance.func_addrs.len() as u32 - 1);
        }
        for (name, table) in &object.tables {
            let addr = store.push_table(table.clone());
            instance.table_addrs.push(addr);
            instance.export_table(name, instance.table_addrs.len() as u32 - 1);
        }
        for (name, memory) in &object.mems {
            let addr = store.push_mem(memory.clone());
            instance.mem_addrs.push(addr);
            instance.export_mem(name, instance.mem_addrs.len() as u32 - 1);
        }
        for (name, global) in &object.globals {
            let addr = store.push_global(global.clone());
            instance.global_addrs.push(addr);
            instance.export_global(name, instance.global_addrs.len() as u32 - 1);
        }

        let module_addr = store.push_module(instance);
        match store.register_module_name(object.module_name(), module_addr) {
            Ok(()) => {
                store.commit();
                Ok(module_addr)
            }
            Err(err) => {
                store.reset();
                Err(err)
            }
        }
    }

    /// Instantiate a validated module under `name`.
    ///
    /// An empty name instantiates anonymously (the caller keeps the
    /// returned address); a non-empty name also registers the instance
    /// for import resolution by later modules. On any failure every
    /// instance created here is rolled back, including a trapping start
    /// function, so the store is unchanged.
    pub fn instantiate(
        &mut self,
        store: &mut Store,
        module: &Module,
        name: &str,
    ) -> Result<ModuleAddr> {
        store.reset();
        if !name.is_empty() && store.find_module(name).is_some() {
            return Err(Error::instantiation(
                codes::MODULE_NAME_CONFLICT,
                "module name already registered",
            ));
        }
        match self.instantiate_inner(store, module, name) {
            Ok(addr) => {
                store.commit();
                Ok(addr)
            }
            Err(err) => {
                store.reset();
                Err(err)
            }
        }
    }

    fn instantiate_inner(
        &mut self,
        store: &mut Store,
        module: &Module,
        name: &str,
    ) -> Result<ModuleAddr> {
        let mut instance = ModuleInstance::new(name);
        instance.types = module.types.clone();

        // 1. Resolve imports against registered modules.
        for import in &module.imports {
            let exporter_addr =
                store.find_module(&import.module).ok_or(UNKNOWN_IMPORT)?;
            let exporter = store.module(exporter_addr)?;
            match &import.desc {
                ImportDesc::Func(type_index) => {
                    let addr = exporter.exported_func(&import.name).ok_or(UNKNOWN_IMPORT)?;
                    let expected = module
                        .types
                        .get(*type_index as usize)
                        .ok_or(INCOMPATIBLE)?;
                    if store.func(addr)?.ty() != expected {
                        return Err(INCOMPATIBLE);
                    }
                    instance.func_addrs.push(addr);
                }
                ImportDesc::Table(expected) => {
                    let addr = exporter.exported_table(&import.name).ok_or(UNKNOWN_IMPORT)?;
                    let actual = store.table(addr)?.ty();
                    if actual.element != expected.element
                        || !limits_match(actual.limits, expected.limits)
                    {
                        return Err(INCOMPATIBLE);
                    }
                    instance.table_addrs.push(addr);
                }
                ImportDesc::Memory(expected) => {
                    let addr = exporter.exported_mem(&import.name).ok_or(UNKNOWN_IMPORT)?;
                    let actual = store.mem(addr)?.ty();
                    if !limits_match(actual.limits, expected.limits) {
                        return Err(INCOMPATIBLE);
                    }
                    instance.mem_addrs.push(addr);
                }
                ImportDesc::Global(expected) => {
                    let addr = exporter.exported_global(&import.name).ok_or(UNKNOWN_IMPORT)?;
                    if store.global(addr)?.ty() != *expected {
                        return Err(INCOMPATIBLE);
                    }
                    instance.global_addrs.push(addr);
                }
            }
        }

        // 2. Allocate everything the module defines. The module address
        // is the next slot; nothing else pushes a module before we do.
        let module_addr = store.module_count() as ModuleAddr;

        for (defined_index, type_index) in module.functions.iter().enumerate() {
            let ty = module.types[*type_index as usize].clone();
            let func_body = &module.code[defined_index];
            let mut locals = Vec::new();
            for (count, local_ty) in &func_body.locals {
                for _ in 0..*count {
                    locals.push(*local_ty);
                }
            }
            let addr = store.push_func(FunctionInstance::wasm(WasmFunction {
                ty,
                module_addr,
                locals,
                body: func_body.body.clone(),
            }));
            instance.func_addrs.push(addr);
        }
        for table_ty in &module.tables {
            let addr = store.push_table(TableInstance::new(*table_ty)?);
            instance.table_addrs.push(addr);
        }
        for memory_ty in &module.memories {
            let addr = store.push_mem(MemoryInstance::new(*memory_ty)?);
            instance.mem_addrs.push(addr);
        }
        for global in &module.globals {
            let value = eval_const(store, &instance, &global.init)?;
            let addr = store.push_global(GlobalInstance::new(global.ty, value)?);
            instance.global_addrs.push(addr);
        }

        // 3./4. Two-phase segment initialisation: every bound is checked
        // before the first write, so a failure mutates nothing.
        let mut table_writes: Vec<(TableAddr, u32, Vec<FuncAddr>)> = Vec::new();
        for segment in &module.elements {
            let offset = eval_offset(store, &instance, &segment.offset)?;
            let table_addr = *instance
                .table_addrs
                .get(segment.table_index as usize)
                .ok_or(SEGMENT_OOB)?;
            let table = store.table(table_addr)?;
            if u64::from(offset) + segment.functions.len() as u64 > u64::from(table.size()) {
                return Err(SEGMENT_OOB);
            }
            let mut funcs = Vec::new();
            for func_index in &segment.functions {
                funcs.push(*instance.func_addrs.get(*func_index as usize).ok_or(SEGMENT_OOB)?);
            }
            table_writes.push((table_addr, offset, funcs));
        }
        let mut mem_writes: Vec<(MemAddr, u32, &[u8])> = Vec::new();
        for segment in &module.data {
            let offset = eval_offset(store, &instance, &segment.offset)?;
            let mem_addr = *instance
                .mem_addrs
                .get(segment.memory_index as usize)
                .ok_or(SEGMENT_OOB)?;
            let memory = store.mem(mem_addr)?;
            if u64::from(offset) + segment.bytes.len() as u64 > memory.size_bytes() as u64 {
                return Err(SEGMENT_OOB);
            }
            mem_writes.push((mem_addr, offset, &segment.bytes));
        }
        for (table_addr, offset, funcs) in table_writes {
            let table = store.table_mut(table_addr)?;
            for (i, func_addr) in funcs.into_iter().enumerate() {
                table.set(offset + i as u32, Some(func_addr))?;
            }
        }
        for (mem_addr, offset, bytes) in mem_writes {
            store.mem_mut(mem_addr)?.write(u64::from(offset), bytes)?;
        }

        // 5. Exports.
        for export in &module.exports {
            match export.kind {
                corten_format::ExternalKind::Func => instance.export_func(&export.name, export.index),
                corten_format::ExternalKind::Table => instance.export_table(&export.name, export.index),
                corten_format::ExternalKind::Memory => instance.export_mem(&export.name, export.index),
                corten_format::ExternalKind::Global => instance.export_global(&export.name, export.index),
            }
        }

        log::debug!(
            "instantiated module {name:?}: {} function(s), {} table(s), {} memory(ies), {} global(s)",
            instance.func_addrs.len(),
            instance.table_addrs.len(),
            instance.mem_addrs.len(),
            instance.global_addrs.len(),
        );
        let start = module.start.map(|index| instance.func_addrs.get(index as usize).copied());
        store.push_module(instance);
        if !name.is_empty() {
            store.register_module_name(name, module_addr)?;
        }

        // 6. Start function.
        if let Some(start_addr) = start {
            let start_addr = start_addr.ok_or(Error::validation(
                codes::INVALID_FUNC_INDEX,
                "start function index out of range",
            ))?;
            self.invoke(store, start_addr, &[])?;
        }
        Ok(module_addr)
    }
}

/// Evaluate a constant expression against a (partially built) instance.
fn eval_const(store: &Store, instance: &ModuleInstance, expr: &Expr) -> Result<Value> {
    match expr.first() {
        Some(Instruction::I32Const(v)) => Ok(Value::I32(*v)),
        Some(Instruction::I64Const(v)) => Ok(Value::I64(*v)),
        Some(Instruction::F32Const(v)) => Ok(Value::F32(*v)),
        Some(Instruction::F64Const(v)) => Ok(Value::F64(*v)),
        Some(Instruction::GlobalGet(index)) => {
            let addr = instance.global_addrs.get(*index as usize).ok_or(Error::validation(
                codes::INVALID_GLOBAL_INDEX,
                "constant expression references unknown global",
            ))?;
            Ok(store.global(*addr)?.get())
        }
        _ => Err(Error::validation(
            codes::INVALID_CONST_EXPR,
            "not a constant expression",
        )),
    }
}

/// Evaluate a segment offset: a constant expression yielding i32.
fn eval_offset(store: &Store, instance: &ModuleInstance, expr: &Expr) -> Result<u32> {
    eval_const(store, instance, expr)?.as_u32().ok_or(Error::validation(
        codes::TYPE_MISMATCH,
        "segment offset is not i32",
    ))
}
