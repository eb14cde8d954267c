//! The execution engine: opcode dispatch over the instruction AST.
//!
//! Structured control is handled by recursion over the nested
//! expression tree. Each nested body reports how it ended through
//! [`Control`]: fell through, branched to an enclosing label, or
//! returned from the function. Branch fix-up (carrying the label's
//! arity values over the discarded stack region) happens at the label
//! that consumes the branch.

use crate::prelude::{
    codes, Error, Expr, FloatBits32, FloatBits64, Frame, FuncAddr, FuncType, FunctionInstance,
    GlobalAddr, Instruction, Label, LoadOp, MemAddr, MemArg, Result, Store, StoreOp, Value, Vec,
};

use super::Interpreter;

const SIG_MISMATCH: Error =
    Error::runtime(codes::FUNC_SIG_MISMATCH, "arguments do not match the function signature");
const TYPE_CONFUSION: Error =
    Error::runtime(codes::TYPE_MISMATCH, "value stack holds an unexpected type");

/// How a nested expression finished.
pub(super) enum Control {
    /// Fell through its end.
    Next,
    /// Branching to the label this many levels up.
    Branch(u32),
    /// Returning from the current function.
    Return,
}

impl Interpreter {
    /// Invoke the function at `func_addr` with `params`.
    ///
    /// Arguments are checked against the signature
    /// (`FUNC_SIG_MISMATCH`). On success the results are returned in
    /// declaration order. On a trap the engine's stacks are emptied
    /// before the error surfaces; store mutations made before the trap
    /// persist.
    pub fn invoke(
        &mut self,
        store: &mut Store,
        func_addr: FuncAddr,
        params: &[Value],
    ) -> Result<Vec<Value>> {
        let ty = store.func(func_addr)?.ty().clone();
        check_signature(&ty, params)?;

        for param in params {
            self.stack.push(*param);
        }
        match self.call_function(store, func_addr) {
            Ok(()) => {
                let results = self.stack.pop_n(ty.results.len())?;
                Ok(results)
            }
            Err(err) => {
                self.stack.clear();
                self.frames.clear();
                self.labels.clear();
                self.call_depth = 0;
                Err(err)
            }
        }
    }

    /// Call a function whose arguments are on the operand stack.
    pub(super) fn call_function(&mut self, store: &mut Store, func_addr: FuncAddr) -> Result<()> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(Error::trap(codes::CALL_STACK_EXHAUSTED, "call stack exhausted"));
        }
        self.call_depth += 1;
        let result = self.run_function(store, func_addr);
        self.call_depth -= 1;
        result
    }

    fn run_function(&mut self, store: &mut Store, func_addr: FuncAddr) -> Result<()> {
        let instance = store.func(func_addr)?.clone();
        match instance {
            FunctionInstance::Host { ty, handler } => {
                let args = self.stack.pop_n(ty.params.len())?;
                let results = handler.call(store, &args)?;
                if results.len() != ty.results.len() {
                    return Err(SIG_MISMATCH);
                }
                for (result, expected) in results.iter().zip(&ty.results) {
                    if !result.matches_type(*expected) {
                        return Err(SIG_MISMATCH);
                    }
                    self.stack.push(*result);
                }
                Ok(())
            }
            FunctionInstance::Wasm(func) => {
                let mut locals = self.stack.pop_n(func.ty.params.len())?;
                for local_ty in &func.locals {
                    locals.push(Value::default_for_type(*local_ty));
                }
                let arity = func.ty.results.len();
                self.frames.push(Frame {
                    module_addr: func.module_addr,
                    locals,
                    arity,
                    height: self.stack.len(),
                    label_depth: self.labels.len(),
                });
                self.labels.push(Label { arity, height: self.stack.len() });

                let outcome = self.exec_expr(store, &func.body);

                let frame = self.frames.pop().ok_or_else(Error::stack_underflow)?;
                // `end` at function scope, `return`, and a branch to the
                // function label all exit the same way: carry the result
                // arity down to the frame's stack base.
                outcome?;
                let results = self.stack.pop_n(frame.arity)?;
                self.stack.truncate(frame.height);
                for result in results {
                    self.stack.push(result);
                }
                self.labels.truncate(frame.label_depth);
                Ok(())
            }
        }
    }

    fn exec_expr(&mut self, store: &mut Store, expr: &Expr) -> Result<Control> {
        for instruction in expr {
            match self.exec_instruction(store, instruction)? {
                Control::Next => {}
                control => return Ok(control),
            }
        }
        Ok(Control::Next)
    }

    /// Exit handling shared by `block` and `if`: a branch targeting this
    /// label carries its arity values down to the label's base height.
    fn finish_block(&mut self, control: Control) -> Result<Control> {
        match control {
            Control::Next => {
                self.labels.pop();
                Ok(Control::Next)
            }
            Control::Branch(0) => {
                let label = self.labels.pop().ok_or_else(Error::stack_underflow)?;
                let carried = self.stack.pop_n(label.arity)?;
                self.stack.truncate(label.height);
                for value in carried {
                    self.stack.push(value);
                }
                Ok(Control::Next)
            }
            Control::Branch(depth) => {
                self.labels.pop();
                Ok(Control::Branch(depth - 1))
            }
            Control::Return => {
                self.labels.pop();
                Ok(Control::Return)
            }
        }
    }

    fn exec_instruction(&mut self, store: &mut Store, instruction: &Instruction) -> Result<Control> {
        match instruction {
            Instruction::Unreachable => {
                return Err(Error::trap(codes::UNREACHABLE, "unreachable executed"))
            }
            Instruction::Nop => {}
            Instruction::Block { block_type, body } => {
                self.labels.push(Label { arity: block_type.arity(), height: self.stack.len() });
                let control = self.exec_expr(store, body)?;
                return self.finish_block(control);
            }
            Instruction::Loop { body, .. } => {
                // Branches to a loop label carry no values and continue
                // at the loop start.
                self.labels.push(Label { arity: 0, height: self.stack.len() });
                loop {
                    match self.exec_expr(store, body)? {
                        Control::Next => {
                            self.labels.pop();
                            break;
                        }
                        Control::Branch(0) => {
                            if let Some(label) = self.labels.last() {
                                self.stack.truncate(label.height);
                            }
                        }
                        Control::Branch(depth) => {
                            self.labels.pop();
                            return Ok(Control::Branch(depth - 1));
                        }
                        Control::Return => {
                            self.labels.pop();
                            return Ok(Control::Return);
                        }
                    }
                }
            }
            Instruction::If { block_type, then_body, else_body } => {
                let condition = self.stack.pop_i32()?;
                self.labels.push(Label { arity: block_type.arity(), height: self.stack.len() });
                let body = if condition != 0 { then_body } else { else_body };
                let control = self.exec_expr(store, body)?;
                return self.finish_block(control);
            }
            Instruction::Br(depth) => return Ok(Control::Branch(*depth)),
            Instruction::BrIf(depth) => {
                if self.stack.pop_i32()? != 0 {
                    return Ok(Control::Branch(*depth));
                }
            }
            Instruction::BrTable { targets, default } => {
                let index = self.stack.pop_u32()? as usize;
                let depth = targets.get(index).copied().unwrap_or(*default);
                return Ok(Control::Branch(depth));
            }
            Instruction::Return => return Ok(Control::Return),
            Instruction::Call(func_index) => {
                let target = {
                    let module = store.module(self.current_frame()?.module_addr)?;
                    *module.func_addrs.get(*func_index as usize).ok_or(Error::validation(
                        codes::INVALID_FUNC_INDEX,
                        "call target out of range",
                    ))?
                };
                self.call_function(store, target)?;
            }
            Instruction::CallIndirect { type_index } => {
                self.exec_call_indirect(store, *type_index)?;
            }
            Instruction::Drop => {
                self.stack.pop()?;
            }
            Instruction::Select => {
                let condition = self.stack.pop_i32()?;
                let on_zero = self.stack.pop()?;
                let on_nonzero = self.stack.pop()?;
                self.stack.push(if condition != 0 { on_nonzero } else { on_zero });
            }
            Instruction::LocalGet(index) => {
                let value = *self
                    .current_frame()?
                    .locals
                    .get(*index as usize)
                    .ok_or(Error::validation(codes::INVALID_LOCAL_INDEX, "local out of range"))?;
                self.stack.push(value);
            }
            Instruction::LocalSet(index) => {
                let value = self.stack.pop()?;
                self.set_local(*index, value)?;
            }
            Instruction::LocalTee(index) => {
                let value = self.stack.pop()?;
                self.stack.push(value);
                self.set_local(*index, value)?;
            }
            Instruction::GlobalGet(index) => {
                let addr = self.global_addr(store, *index)?;
                self.stack.push(store.global(addr)?.get());
            }
            Instruction::GlobalSet(index) => {
                let addr = self.global_addr(store, *index)?;
                let value = self.stack.pop()?;
                store.global_mut(addr)?.set(value)?;
            }
            Instruction::Load(op, memarg) => self.exec_load(store, *op, *memarg)?,
            Instruction::Store(op, memarg) => self.exec_store(store, *op, *memarg)?,
            Instruction::MemorySize => {
                let addr = self.mem_addr(store)?;
                let pages = store.mem(addr)?.size_pages();
                self.stack.push(Value::I32(pages as i32));
            }
            Instruction::MemoryGrow => {
                let addr = self.mem_addr(store)?;
                let delta = self.stack.pop_u32()?;
                let previous = store.mem_mut(addr)?.grow(delta);
                self.stack.push(Value::I32(previous));
            }
            Instruction::I32Const(v) => self.stack.push(Value::I32(*v)),
            Instruction::I64Const(v) => self.stack.push(Value::I64(*v)),
            Instruction::F32Const(v) => self.stack.push(Value::F32(*v)),
            Instruction::F64Const(v) => self.stack.push(Value::F64(*v)),
            Instruction::Comparison(op) => self.exec_comparison(*op)?,
            Instruction::Arithmetic(op) => self.exec_arithmetic(*op)?,
            Instruction::Conversion(op) => self.exec_conversion(*op)?,
        }
        Ok(Control::Next)
    }

    fn exec_call_indirect(&mut self, store: &mut Store, type_index: u32) -> Result<()> {
        let index = self.stack.pop_u32()?;
        let (table_addr, expected) = {
            let module = store.module(self.current_frame()?.module_addr)?;
            let table_addr = *module.table_addrs.first().ok_or(Error::validation(
                codes::INVALID_TABLE_INDEX,
                "call_indirect requires a table",
            ))?;
            let expected = module
                .types
                .get(type_index as usize)
                .cloned()
                .ok_or(Error::validation(
                    codes::INVALID_TYPE_INDEX,
                    "call_indirect type out of range",
                ))?;
            (table_addr, expected)
        };
        let entry = store.table(table_addr)?.get(index)?;
        let target = entry.ok_or(Error::trap(
            codes::UNINITIALIZED_ELEMENT,
            "indirect call through a null table element",
        ))?;
        if store.func(target)?.ty() != &expected {
            return Err(Error::trap(
                codes::INDIRECT_CALL_TYPE_MISMATCH,
                "indirect call signature mismatch",
            ));
        }
        self.call_function(store, target)
    }

    fn exec_load(&mut self, store: &mut Store, op: LoadOp, memarg: MemArg) -> Result<()> {
        let base = self.stack.pop_u32()?;
        // The sum may exceed u32, so the effective address is 64-bit.
        let addr = u64::from(base) + u64::from(memarg.offset);
        let mem_addr = self.mem_addr(store)?;
        let bytes = store.mem(mem_addr)?.read(addr, op.access_width() as usize)?;
        let value = match op {
            LoadOp::I32Load => Value::I32(i32::from_le_bytes(le4(bytes))),
            LoadOp::I64Load => Value::I64(i64::from_le_bytes(le8(bytes))),
            LoadOp::F32Load => Value::F32(FloatBits32::from_bits(u32::from_le_bytes(le4(bytes)))),
            LoadOp::F64Load => Value::F64(FloatBits64::from_bits(u64::from_le_bytes(le8(bytes)))),
            LoadOp::I32Load8S => Value::I32(i32::from(bytes[0] as i8)),
            LoadOp::I32Load8U => Value::I32(i32::from(bytes[0])),
            LoadOp::I32Load16S => Value::I32(i32::from(i16::from_le_bytes(le2(bytes)))),
            LoadOp::I32Load16U => Value::I32(i32::from(u16::from_le_bytes(le2(bytes)))),
            LoadOp::I64Load8S => Value::I64(i64::from(bytes[0] as i8)),
            LoadOp::I64Load8U => Value::I64(i64::from(bytes[0])),
            LoadOp::I64Load16S => Value::I64(i64::from(i16::from_le_bytes(le2(bytes)))),
            LoadOp::I64Load16U => Value::I64(i64::from(u16::from_le_bytes(le2(bytes)))),
            LoadOp::I64Load32S => Value::I64(i64::from(i32::from_le_bytes(le4(bytes)))),
            LoadOp::I64Load32U => Value::I64(i64::from(u32::from_le_bytes(le4(bytes)))),
        };
        self.stack.push(value);
        Ok(())
    }

    fn exec_store(&mut self, store: &mut Store, op: StoreOp, memarg: MemArg) -> Result<()> {
        let value = self.stack.pop()?;
        let base = self.stack.pop_u32()?;
        let addr = u64::from(base) + u64::from(memarg.offset);
        let mem_addr = self.mem_addr(store)?;
        let memory = store.mem_mut(mem_addr)?;
        match op {
            StoreOp::I32Store => {
                memory.write(addr, &int_operand_32(value)?.to_le_bytes())?;
            }
            StoreOp::I64Store => {
                memory.write(addr, &int_operand_64(value)?.to_le_bytes())?;
            }
            StoreOp::F32Store => {
                let bits = value.as_f32().ok_or(TYPE_CONFUSION)?;
                memory.write(addr, &bits.to_bits().to_le_bytes())?;
            }
            StoreOp::F64Store => {
                let bits = value.as_f64().ok_or(TYPE_CONFUSION)?;
                memory.write(addr, &bits.to_bits().to_le_bytes())?;
            }
            StoreOp::I32Store8 => {
                memory.write(addr, &[int_operand_32(value)? as u8])?;
            }
            StoreOp::I32Store16 => {
                memory.write(addr, &(int_operand_32(value)? as u16).to_le_bytes())?;
            }
            StoreOp::I64Store8 => {
                memory.write(addr, &[int_operand_64(value)? as u8])?;
            }
            StoreOp::I64Store16 => {
                memory.write(addr, &(int_operand_64(value)? as u16).to_le_bytes())?;
            }
            StoreOp::I64Store32 => {
                memory.write(addr, &(int_operand_64(value)? as u32).to_le_bytes())?;
            }
        }
        Ok(())
    }

    pub(super) fn current_frame(&self) -> Result<&Frame> {
        self.frames.last().ok_or_else(Error::stack_underflow)
    }

    fn set_local(&mut self, index: u32, value: Value) -> Result<()> {
        let frame = self.frames.last_mut().ok_or_else(Error::stack_underflow)?;
        let slot = frame.locals.get_mut(index as usize).ok_or(Error::validation(
            codes::INVALID_LOCAL_INDEX,
            "local out of range",
        ))?;
        *slot = value;
        Ok(())
    }

    fn global_addr(&self, store: &Store, index: u32) -> Result<GlobalAddr> {
        let module = store.module(self.current_frame()?.module_addr)?;
        module.global_addrs.get(index as usize).copied().ok_or(Error::validation(
            codes::INVALID_GLOBAL_INDEX,
            "global out of range",
        ))
    }

    fn mem_addr(&self, store: &Store) -> Result<MemAddr> {
        let module = store.module(self.current_frame()?.module_addr)?;
        module.mem_addrs.first().copied().ok_or(Error::validation(
            codes::INVALID_MEMORY_INDEX,
            "instruction requires a memory",
        ))
    }
}

fn check_signature(ty: &FuncType, params: &[Value]) -> Result<()> {
    if ty.params.len() != params.len() {
        return Err(SIG_MISMATCH);
    }
    for (param, expected) in params.iter().zip(&ty.params) {
        if !param.matches_type(*expected) {
            return Err(SIG_MISMATCH);
        }
    }
    Ok(())
}

fn int_operand_32(value: Value) -> Result<i32> {
    value.as_i32().ok_or(TYPE_CONFUSION)
}

fn int_operand_64(value: Value) -> Result<i64> {
    value.as_i64().ok_or(TYPE_CONFUSION)
}

fn le2(bytes: &[u8]) -> [u8; 2] {
    let mut arr = [0u8; 2];
    arr.copy_from_slice(bytes);
    arr
}

fn le4(bytes: &[u8]) -> [u8; 4] {
    let mut arr = [0u8; 4];
    arr.copy_from_slice(bytes);
    arr
}

fn le8(bytes: &[u8]) -> [u8; 8] {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(bytes);
    arr
}
