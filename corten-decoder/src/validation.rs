//! Static validation.
//!
//! Runs after decoding and before instantiation. Function bodies are
//! checked by abstract interpretation over a type stack with a
//! control-frame stack; code after `unreachable`, `br`, `br_table`, or
//! `return` is polymorphic (an unknown operand satisfies any expected
//! type until the enclosing `end`). Module-level checks cover index
//! ranges, limit well-formedness, the MVP single-table/single-memory
//! restriction, and the constant-expression rules for global
//! initialisers and segment offsets.

use alloc::vec::Vec;

use corten_error::{codes, Error, Result};
use corten_format::{
    BlockType, ExternalKind, Expr, FuncType, GlobalType, ImportDesc, Instruction, MemoryType,
    Module, TableType, ValueType, MAX_MEMORY_PAGES,
};

const TYPE_MISMATCH: Error = Error::validation(codes::TYPE_MISMATCH, "operand type mismatch");

/// Cap on parameters plus declared locals of one function, so a hostile
/// local-count run cannot force a huge allocation before execution.
const MAX_FUNCTION_LOCALS: u64 = 50_000;

/// Validate a decoded module against the typing and structural rules.
///
/// The verdict is deterministic: the walk order is fixed and no check
/// depends on anything but the module itself.
pub fn validate_module(module: &Module) -> Result<()> {
    let ctx = ModuleContext::build(module)?;

    ctx.check_types()?;
    ctx.check_tables()?;
    ctx.check_memories()?;
    ctx.check_globals()?;
    ctx.check_exports()?;
    ctx.check_start()?;
    ctx.check_elements()?;
    ctx.check_data()?;
    ctx.check_code()
}

/// Combined (imported followed by defined) index spaces of a module.
struct ModuleContext<'m> {
    module: &'m Module,
    /// Type index of every function, imports first.
    func_types: Vec<u32>,
    tables: Vec<TableType>,
    memories: Vec<MemoryType>,
    /// Global type plus whether it is imported.
    globals: Vec<(GlobalType, bool)>,
}

impl<'m> ModuleContext<'m> {
    fn build(module: &'m Module) -> Result<Self> {
        let mut func_types = Vec::new();
        let mut tables = Vec::new();
        let mut memories = Vec::new();
        let mut globals = Vec::new();

        for import in &module.imports {
            match &import.desc {
                ImportDesc::Func(type_index) => {
                    if *type_index as usize >= module.types.len() {
                        return Err(Error::validation(
                            codes::INVALID_TYPE_INDEX,
                            "import references unknown type",
                        ));
                    }
                    func_types.push(*type_index);
                }
                ImportDesc::Table(table) => tables.push(*table),
                ImportDesc::Memory(memory) => memories.push(*memory),
                ImportDesc::Global(ty) => globals.push((*ty, true)),
            }
        }
        for type_index in &module.functions {
            if *type_index as usize >= module.types.len() {
                return Err(Error::validation(
                    codes::INVALID_TYPE_INDEX,
                    "function references unknown type",
                ));
            }
            func_types.push(*type_index);
        }
        tables.extend(module.tables.iter().copied());
        memories.extend(module.memories.iter().copied());
        globals.extend(module.globals.iter().map(|g| (g.ty, false)));

        Ok(Self { module, func_types, tables, memories, globals })
    }

    fn func_type(&self, func_index: u32) -> Result<&FuncType> {
        let type_index = self.func_types.get(func_index as usize).ok_or(Error::validation(
            codes::INVALID_FUNC_INDEX,
            "function index out of range",
        ))?;
        Ok(&self.module.types[*type_index as usize])
    }

    fn num_imported_globals(&self) -> usize {
        self.globals.iter().filter(|(_, imported)| *imported).count()
    }

    fn check_types(&self) -> Result<()> {
        for ty in &self.module.types {
            if ty.results.len() > 1 {
                return Err(Error::validation(
                    codes::INVALID_RESULT_ARITY,
                    "multi-value results are not supported",
                ));
            }
        }
        Ok(())
    }

    fn check_tables(&self) -> Result<()> {
        if self.tables.len() > 1 {
            return Err(Error::validation(codes::MULTIPLE_TABLES, "at most one table"));
        }
        for table in &self.tables {
            table.limits.validate(u32::MAX)?;
        }
        Ok(())
    }

    fn check_memories(&self) -> Result<()> {
        if self.memories.len() > 1 {
            return Err(Error::validation(codes::MULTIPLE_MEMORIES, "at most one memory"));
        }
        for memory in &self.memories {
            memory.limits.validate(MAX_MEMORY_PAGES)?;
        }
        Ok(())
    }

    fn check_globals(&self) -> Result<()> {
        for global in &self.module.globals {
            self.check_const_expr(&global.init, global.ty.value_type)?;
        }
        Ok(())
    }

    fn check_exports(&self) -> Result<()> {
        for export in &self.module.exports {
            let (len, code) = match export.kind {
                ExternalKind::Func => (self.func_types.len(), codes::INVALID_FUNC_INDEX),
                ExternalKind::Table => (self.tables.len(), codes::INVALID_TABLE_INDEX),
                ExternalKind::Memory => (self.memories.len(), codes::INVALID_MEMORY_INDEX),
                ExternalKind::Global => (self.globals.len(), codes::INVALID_GLOBAL_INDEX),
            };
            if export.index as usize >= len {
                return Err(Error::validation(code, "export index out of range"));
            }
        }
        Ok(())
    }

    fn check_start(&self) -> Result<()> {
        if let Some(start) = self.module.start {
            let ty = self.func_type(start)?;
            if !ty.params.is_empty() || !ty.results.is_empty() {
                return Err(Error::validation(
                    codes::INVALID_START_FUNCTION,
                    "start function must have an empty signature",
                ));
            }
        }
        Ok(())
    }

    fn check_elements(&self) -> Result<()> {
        for segment in &self.module.elements {
            if segment.table_index as usize >= self.tables.len() {
                return Err(Error::validation(
                    codes::INVALID_TABLE_INDEX,
                    "element segment targets unknown table",
                ));
            }
            self.check_const_expr(&segment.offset, ValueType::I32)?;
            for func_index in &segment.functions {
                if *func_index as usize >= self.func_types.len() {
                    return Err(Error::validation(
                        codes::INVALID_FUNC_INDEX,
                        "element segment references unknown function",
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_data(&self) -> Result<()> {
        for segment in &self.module.data {
            if segment.memory_index as usize >= self.memories.len() {
                return Err(Error::validation(
                    codes::INVALID_MEMORY_INDEX,
                    "data segment targets unknown memory",
                ));
            }
            self.check_const_expr(&segment.offset, ValueType::I32)?;
        }
        Ok(())
    }

    /// A constant expression is a single `t.const`, or a `global.get` of
    /// an imported immutable global, yielding the expected type.
    fn check_const_expr(&self, expr: &Expr, expected: ValueType) -> Result<()> {
        const INVALID: Error =
            Error::validation(codes::INVALID_CONST_EXPR, "not a constant expression");
        if expr.len() != 1 {
            return Err(INVALID);
        }
        let actual = match &expr[0] {
            Instruction::I32Const(_) => ValueType::I32,
            Instruction::I64Const(_) => ValueType::I64,
            Instruction::F32Const(_) => ValueType::F32,
            Instruction::F64Const(_) => ValueType::F64,
            Instruction::GlobalGet(index) => {
                let (ty, imported) = self.globals.get(*index as usize).ok_or(Error::validation(
                    codes::INVALID_GLOBAL_INDEX,
                    "constant expression references unknown global",
                ))?;
                if !imported || ty.mutable {
                    return Err(INVALID);
                }
                ty.value_type
            }
            _ => return Err(INVALID),
        };
        if actual != expected {
            return Err(TYPE_MISMATCH);
        }
        Ok(())
    }

    fn check_code(&self) -> Result<()> {
        let num_imported = self.func_types.len() - self.module.functions.len();
        for (defined_index, body) in self.module.code.iter().enumerate() {
            let type_index = self.func_types[num_imported + defined_index];
            let ty = &self.module.types[type_index as usize];

            if ty.params.len() as u64 + body.local_count() > MAX_FUNCTION_LOCALS {
                return Err(Error::validation(
                    codes::INVALID_LIMITS,
                    "function declares too many locals",
                ));
            }
            let mut locals: Vec<ValueType> = ty.params.clone();
            for (count, local_ty) in &body.locals {
                for _ in 0..*count {
                    locals.push(*local_ty);
                }
            }

            let mut validator = FuncValidator::new(self, locals);
            validator.push_ctrl(CtrlKind::Func, ty.results.clone());
            validator.check_expr(&body.body)?;
            let results = validator.pop_ctrl()?;
            for result in results {
                validator.push_val(Some(result));
            }
        }
        Ok(())
    }
}

/// Kind of an open control frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CtrlKind {
    Func,
    Block,
    Loop,
    If,
}

/// One open control frame during body validation.
struct CtrlFrame {
    kind: CtrlKind,
    /// Types the frame yields at its `end`.
    end_types: Vec<ValueType>,
    /// Operand stack height at entry.
    height: usize,
    /// Whether the rest of the frame is unreachable.
    unreachable: bool,
}

impl CtrlFrame {
    /// Types a branch to this frame's label carries: loops branch to
    /// their start and carry nothing (MVP blocks have no parameters),
    /// every other frame carries its results.
    fn label_types(&self) -> &[ValueType] {
        if self.kind == CtrlKind::Loop {
            &[]
        } else {
            &self.end_types
        }
    }
}

/// Abstract interpreter over operand types. `None` on the stack is the
/// unknown type that arises in polymorphic (unreachable) code.
struct FuncValidator<'a, 'm> {
    ctx: &'a ModuleContext<'m>,
    locals: Vec<ValueType>,
    vals: Vec<Option<ValueType>>,
    ctrls: Vec<CtrlFrame>,
}

impl<'a, 'm> FuncValidator<'a, 'm> {
    fn new(ctx: &'a ModuleContext<'m>, locals: Vec<ValueType>) -> Self {
        Self { ctx, locals, vals: Vec::new(), ctrls: Vec::new() }
    }

    fn push_val(&mut self, ty: Option<ValueType>) {
        self.vals.push(ty);
    }

    fn pop_val(&mut self) -> Result<Option<ValueType>> {
        let frame = self.ctrls.last().ok_or(TYPE_MISMATCH)?;
        if self.vals.len() == frame.height {
            return if frame.unreachable { Ok(None) } else { Err(TYPE_MISMATCH) };
        }
        self.vals.pop().ok_or(TYPE_MISMATCH)
    }

    fn pop_expect(&mut self, expected: ValueType) -> Result<()> {
        match self.pop_val()? {
            Some(actual) if actual != expected => Err(TYPE_MISMATCH),
            _ => Ok(()),
        }
    }

    fn pop_all(&mut self, types: &[ValueType]) -> Result<()> {
        for ty in types.iter().rev() {
            self.pop_expect(*ty)?;
        }
        Ok(())
    }

    fn push_all(&mut self, types: &[ValueType]) {
        for ty in types {
            self.push_val(Some(*ty));
        }
    }

    fn push_ctrl(&mut self, kind: CtrlKind, end_types: Vec<ValueType>) {
        self.ctrls.push(CtrlFrame { kind, end_types, height: self.vals.len(), unreachable: false });
    }

    fn pop_ctrl(&mut self) -> Result<Vec<ValueType>> {
        let frame = self.ctrls.last().ok_or(TYPE_MISMATCH)?;
        let height = frame.height;
        let end_types = frame.end_types.clone();
        self.pop_all(&end_types)?;
        if self.vals.len() != height {
            return Err(TYPE_MISMATCH);
        }
        self.ctrls.pop();
        Ok(end_types)
    }

    /// Mark the rest of the current frame unreachable.
    fn mark_unreachable(&mut self) {
        if let Some(frame) = self.ctrls.last_mut() {
            self.vals.truncate(frame.height);
            frame.unreachable = true;
        }
    }

    fn label(&self, depth: u32) -> Result<&CtrlFrame> {
        let index = self
            .ctrls
            .len()
            .checked_sub(1 + depth as usize)
            .ok_or(Error::validation(codes::INVALID_LABEL_INDEX, "branch label out of range"))?;
        Ok(&self.ctrls[index])
    }

    fn local(&self, index: u32) -> Result<ValueType> {
        self.locals.get(index as usize).copied().ok_or(Error::validation(
            codes::INVALID_LOCAL_INDEX,
            "local index out of range",
        ))
    }

    fn global(&self, index: u32) -> Result<GlobalType> {
        self.ctx
            .globals
            .get(index as usize)
            .map(|(ty, _)| *ty)
            .ok_or(Error::validation(codes::INVALID_GLOBAL_INDEX, "global index out of range"))
    }

    fn require_memory(&self) -> Result<()> {
        if self.ctx.memories.is_empty() {
            return Err(Error::validation(
                codes::INVALID_MEMORY_INDEX,
                "instruction requires a memory",
            ));
        }
        Ok(())
    }

    fn check_alignment(&self, align: u32, access_width: u32) -> Result<()> {
        if align >= 32 || (1u64 << align) > u64::from(access_width) {
            return Err(Error::validation(
                codes::INVALID_ALIGNMENT,
                "alignment exceeds natural alignment",
            ));
        }
        Ok(())
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<()> {
        for instruction in expr {
            self.check_instruction(instruction)?;
        }
        Ok(())
    }

    fn check_instruction(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction {
            Instruction::Unreachable => self.mark_unreachable(),
            Instruction::Nop => {}
            Instruction::Block { block_type, body } => {
                self.push_ctrl(CtrlKind::Block, block_type_results(*block_type));
                self.check_expr(body)?;
                let results = self.pop_ctrl()?;
                self.push_all(&results);
            }
            Instruction::Loop { block_type, body } => {
                self.push_ctrl(CtrlKind::Loop, block_type_results(*block_type));
                self.check_expr(body)?;
                let results = self.pop_ctrl()?;
                self.push_all(&results);
            }
            Instruction::If { block_type, then_body, else_body } => {
                self.pop_expect(ValueType::I32)?;
                self.push_ctrl(CtrlKind::If, block_type_results(*block_type));
                self.check_expr(then_body)?;
                let results = self.pop_ctrl()?;
                self.push_ctrl(CtrlKind::If, results);
                self.check_expr(else_body)?;
                let results = self.pop_ctrl()?;
                self.push_all(&results);
            }
            Instruction::Br(depth) => {
                let types = self.label(*depth)?.label_types().to_vec();
                self.pop_all(&types)?;
                self.mark_unreachable();
            }
            Instruction::BrIf(depth) => {
                self.pop_expect(ValueType::I32)?;
                let types = self.label(*depth)?.label_types().to_vec();
                self.pop_all(&types)?;
                self.push_all(&types);
            }
            Instruction::BrTable { targets, default } => {
                self.pop_expect(ValueType::I32)?;
                let default_types = self.label(*default)?.label_types().to_vec();
                for target in targets {
                    let types = self.label(*target)?.label_types();
                    if types != default_types {
                        return Err(TYPE_MISMATCH);
                    }
                }
                self.pop_all(&default_types)?;
                self.mark_unreachable();
            }
            Instruction::Return => {
                let types = self.ctrls[0].end_types.clone();
                self.pop_all(&types)?;
                self.mark_unreachable();
            }
            Instruction::Call(func_index) => {
                let ty = self.ctx.func_type(*func_index)?.clone();
                self.pop_all(&ty.params)?;
                self.push_all(&ty.results);
            }
            Instruction::CallIndirect { type_index } => {
                if self.ctx.tables.is_empty() {
                    return Err(Error::validation(
                        codes::INVALID_TABLE_INDEX,
                        "call_indirect requires a table",
                    ));
                }
                let ty = self
                    .ctx
                    .module
                    .types
                    .get(*type_index as usize)
                    .ok_or(Error::validation(
                        codes::INVALID_TYPE_INDEX,
                        "call_indirect references unknown type",
                    ))?
                    .clone();
                self.pop_expect(ValueType::I32)?;
                self.pop_all(&ty.params)?;
                self.push_all(&ty.results);
            }
            Instruction::Drop => {
                self.pop_val()?;
            }
            Instruction::Select => {
                self.pop_expect(ValueType::I32)?;
                let first = self.pop_val()?;
                let second = self.pop_val()?;
                match (first, second) {
                    (Some(a), Some(b)) if a != b => return Err(TYPE_MISMATCH),
                    (Some(a), _) => self.push_val(Some(a)),
                    (None, other) => self.push_val(other),
                }
            }
            Instruction::LocalGet(index) => {
                let ty = self.local(*index)?;
                self.push_val(Some(ty));
            }
            Instruction::LocalSet(index) => {
                let ty = self.local(*index)?;
                self.pop_expect(ty)?;
            }
            Instruction::LocalTee(index) => {
                let ty = self.local(*index)?;
                self.pop_expect(ty)?;
                self.push_val(Some(ty));
            }
            Instruction::GlobalGet(index) => {
                let ty = self.global(*index)?;
                self.push_val(Some(ty.value_type));
            }
            Instruction::GlobalSet(index) => {
                let ty = self.global(*index)?;
                if !ty.mutable {
                    return Err(Error::validation(
                        codes::INVALID_MUTATION,
                        "global.set on an immutable global",
                    ));
                }
                self.pop_expect(ty.value_type)?;
            }
            Instruction::Load(op, memarg) => {
                self.require_memory()?;
                self.check_alignment(memarg.align, op.access_width())?;
                self.pop_expect(ValueType::I32)?;
                self.push_val(Some(op.result_type()));
            }
            Instruction::Store(op, memarg) => {
                self.require_memory()?;
                self.check_alignment(memarg.align, op.access_width())?;
                self.pop_expect(op.value_type())?;
                self.pop_expect(ValueType::I32)?;
            }
            Instruction::MemorySize => {
                self.require_memory()?;
                self.push_val(Some(ValueType::I32));
            }
            Instruction::MemoryGrow => {
                self.require_memory()?;
                self.pop_expect(ValueType::I32)?;
                self.push_val(Some(ValueType::I32));
            }
            Instruction::I32Const(_) => self.push_val(Some(ValueType::I32)),
            Instruction::I64Const(_) => self.push_val(Some(ValueType::I64)),
            Instruction::F32Const(_) => self.push_val(Some(ValueType::F32)),
            Instruction::F64Const(_) => self.push_val(Some(ValueType::F64)),
            Instruction::Comparison(op) => {
                self.pop_expect(op.operand_type())?;
                if !op.is_unary() {
                    self.pop_expect(op.operand_type())?;
                }
                self.push_val(Some(ValueType::I32));
            }
            Instruction::Arithmetic(op) => {
                self.pop_expect(op.value_type())?;
                if !op.is_unary() {
                    self.pop_expect(op.value_type())?;
                }
                self.push_val(Some(op.value_type()));
            }
            Instruction::Conversion(op) => {
                self.pop_expect(op.operand_type())?;
                self.push_val(Some(op.result_type()));
            }
        }
        Ok(())
    }
}

fn block_type_results(block_type: BlockType) -> Vec<ValueType> {
    match block_type {
        BlockType::Empty => Vec::new(),
        BlockType::Value(ty) => alloc::vec![ty],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::decode_module;

    fn validate_wat(source: &str) -> Result<()> {
        let bytes = wat::parse_str(source).expect("fixture must assemble");
        validate_module(&decode_module(&bytes)?)
    }

    #[test]
    fn test_valid_module_passes() {
        validate_wat(
            r#"
            (module
              (memory 1)
              (global $g (mut i32) (i32.const 7))
              (func (export "run") (param i32) (result i32)
                (local i64)
                global.get $g
                local.get 0
                i32.add
                global.set $g
                block (result i32)
                  global.get $g
                  i32.const 0
                  br_if 0
                  drop
                  i32.const 9
                end))
            "#,
        )
        .unwrap();
    }

    #[test]
    fn test_loop_branch_carries_no_values() {
        validate_wat(
            r#"
            (module
              (func (export "sum") (result i32)
                (local $i i32) (local $acc i32)
                block
                  loop
                    local.get $i
                    i32.const 1
                    i32.add
                    local.tee $i
                    local.get $acc
                    i32.add
                    local.set $acc
                    local.get $i
                    i32.const 10
                    i32.lt_s
                    br_if 0
                  end
                end
                local.get $acc))
            "#,
        )
        .unwrap();
    }

    // Hand-built invalid bodies; `wat` would refuse to assemble them.

    fn add_body_module(body: Expr, results: Vec<ValueType>) -> Module {
        let mut module = Module::new();
        module.types.push(FuncType::new(Vec::new(), results));
        module.functions.push(0);
        module.code.push(corten_format::FuncBody { locals: Vec::new(), body });
        module
    }

    #[test]
    fn test_operand_type_mismatch() {
        use corten_format::ArithmeticOp;
        let module = add_body_module(
            alloc::vec![
                Instruction::I32Const(1),
                Instruction::I64Const(2),
                Instruction::Arithmetic(ArithmeticOp::I32Add),
            ],
            alloc::vec![ValueType::I32],
        );
        assert_eq!(validate_module(&module), Err(TYPE_MISMATCH));
    }

    #[test]
    fn test_stack_underflow_is_mismatch() {
        use corten_format::ArithmeticOp;
        let module = add_body_module(
            alloc::vec![Instruction::Arithmetic(ArithmeticOp::I32Add)],
            alloc::vec![ValueType::I32],
        );
        assert_eq!(validate_module(&module), Err(TYPE_MISMATCH));
    }

    #[test]
    fn test_unreachable_makes_stack_polymorphic() {
        use corten_format::ArithmeticOp;
        let module = add_body_module(
            alloc::vec![
                Instruction::Unreachable,
                Instruction::Arithmetic(ArithmeticOp::I32Add),
            ],
            alloc::vec![ValueType::I32],
        );
        validate_module(&module).unwrap();
    }

    #[test]
    fn test_branch_label_out_of_range() {
        let module = add_body_module(alloc::vec![Instruction::Br(3)], Vec::new());
        assert_eq!(
            validate_module(&module).unwrap_err().code(),
            codes::INVALID_LABEL_INDEX
        );
    }

    #[test]
    fn test_local_index_out_of_range() {
        let module = add_body_module(alloc::vec![Instruction::LocalGet(0), Instruction::Drop], Vec::new());
        assert_eq!(
            validate_module(&module).unwrap_err().code(),
            codes::INVALID_LOCAL_INDEX
        );
    }

    #[test]
    fn test_set_immutable_global_rejected() {
        let mut module = add_body_module(
            alloc::vec![Instruction::I32Const(1), Instruction::GlobalSet(0)],
            Vec::new(),
        );
        module.globals.push(corten_format::Global {
            ty: GlobalType { value_type: ValueType::I32, mutable: false },
            init: alloc::vec![Instruction::I32Const(0)],
        });
        assert_eq!(
            validate_module(&module).unwrap_err().code(),
            codes::INVALID_MUTATION
        );
    }

    #[test]
    fn test_memory_instruction_without_memory() {
        let module = add_body_module(
            alloc::vec![Instruction::MemorySize, Instruction::Drop],
            Vec::new(),
        );
        assert_eq!(
            validate_module(&module).unwrap_err().code(),
            codes::INVALID_MEMORY_INDEX
        );
    }

    #[test]
    fn test_excessive_alignment_rejected() {
        use corten_format::{LoadOp, MemArg};
        let mut module = add_body_module(
            alloc::vec![
                Instruction::I32Const(0),
                Instruction::Load(LoadOp::I32Load, MemArg { align: 3, offset: 0 }),
                Instruction::Drop,
            ],
            Vec::new(),
        );
        module.memories.push(MemoryType {
            limits: corten_format::Limits { min: 1, max: None },
        });
        assert_eq!(
            validate_module(&module).unwrap_err().code(),
            codes::INVALID_ALIGNMENT
        );
    }

    #[test]
    fn test_multiple_memories_rejected() {
        let mut module = Module::new();
        for _ in 0..2 {
            module.memories.push(MemoryType {
                limits: corten_format::Limits { min: 1, max: None },
            });
        }
        assert_eq!(
            validate_module(&module).unwrap_err().code(),
            codes::MULTIPLE_MEMORIES
        );
    }

    #[test]
    fn test_const_expr_must_use_imported_immutable_global() {
        // A defined global referencing another defined global is rejected.
        let mut module = Module::new();
        module.globals.push(corten_format::Global {
            ty: GlobalType { value_type: ValueType::I32, mutable: false },
            init: alloc::vec![Instruction::I32Const(1)],
        });
        module.globals.push(corten_format::Global {
            ty: GlobalType { value_type: ValueType::I32, mutable: false },
            init: alloc::vec![Instruction::GlobalGet(0)],
        });
        assert_eq!(
            validate_module(&module).unwrap_err().code(),
            codes::INVALID_CONST_EXPR
        );
    }

    #[test]
    fn test_if_without_else_needs_empty_type() {
        let module = add_body_module(
            alloc::vec![
                Instruction::I32Const(1),
                Instruction::If {
                    block_type: BlockType::Value(ValueType::I32),
                    then_body: alloc::vec![Instruction::I32Const(2)],
                    else_body: Vec::new(),
                },
                Instruction::Drop,
            ],
            Vec::new(),
        );
        assert_eq!(validate_module(&module), Err(TYPE_MISMATCH));
    }

    #[test]
    fn test_result_arity_capped() {
        let mut module = Module::new();
        module.types.push(FuncType::new(
            Vec::new(),
            alloc::vec![ValueType::I32, ValueType::I32],
        ));
        assert_eq!(
            validate_module(&module).unwrap_err().code(),
            codes::INVALID_RESULT_ARITY
        );
    }
}
