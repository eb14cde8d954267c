//! Numeric opcode implementations.
//!
//! Comparison and integer bit operations are inlined here; division,
//! truncation, and every floating-point operation delegate to
//! `corten_math` so the trap conditions and NaN rules live in one
//! tested place.

use corten_error::Result;
use corten_format::{ArithmeticOp, ComparisonOp, ConversionOp, Value};
use corten_math::ops;
use corten_math::{FloatBits32, FloatBits64};

use super::Interpreter;

fn bool_val(condition: bool) -> Value {
    Value::I32(i32::from(condition))
}

impl Interpreter {
    pub(super) fn exec_comparison(&mut self, op: ComparisonOp) -> Result<()> {
        use ComparisonOp::*;
        let result = match op {
            I32Eqz => bool_val(self.stack.pop_i32()? == 0),
            I64Eqz => bool_val(self.stack.pop_i64()? == 0),
            I32Eq | I32Ne | I32LtS | I32LtU | I32GtS | I32GtU | I32LeS | I32LeU | I32GeS
            | I32GeU => {
                let rhs = self.stack.pop_i32()?;
                let lhs = self.stack.pop_i32()?;
                let (ul, ur) = (lhs as u32, rhs as u32);
                bool_val(match op {
                    I32Eq => lhs == rhs,
                    I32Ne => lhs != rhs,
                    I32LtS => lhs < rhs,
                    I32LtU => ul < ur,
                    I32GtS => lhs > rhs,
                    I32GtU => ul > ur,
                    I32LeS => lhs <= rhs,
                    I32LeU => ul <= ur,
                    I32GeS => lhs >= rhs,
                    _ => ul >= ur,
                })
            }
            I64Eq | I64Ne | I64LtS | I64LtU | I64GtS | I64GtU | I64LeS | I64LeU | I64GeS
            | I64GeU => {
                let rhs = self.stack.pop_i64()?;
                let lhs = self.stack.pop_i64()?;
                let (ul, ur) = (lhs as u64, rhs as u64);
                bool_val(match op {
                    I64Eq => lhs == rhs,
                    I64Ne => lhs != rhs,
                    I64LtS => lhs < rhs,
                    I64LtU => ul < ur,
                    I64GtS => lhs > rhs,
                    I64GtU => ul > ur,
                    I64LeS => lhs <= rhs,
                    I64LeU => ul <= ur,
                    I64GeS => lhs >= rhs,
                    _ => ul >= ur,
                })
            }
            F32Eq | F32Ne | F32Lt | F32Gt | F32Le | F32Ge => {
                let rhs = self.stack.pop_f32()?.value();
                let lhs = self.stack.pop_f32()?.value();
                bool_val(match op {
                    F32Eq => lhs == rhs,
                    F32Ne => lhs != rhs,
                    F32Lt => lhs < rhs,
                    F32Gt => lhs > rhs,
                    F32Le => lhs <= rhs,
                    _ => lhs >= rhs,
                })
            }
            _ => {
                let rhs = self.stack.pop_f64()?.value();
                let lhs = self.stack.pop_f64()?.value();
                bool_val(match op {
                    F64Eq => lhs == rhs,
                    F64Ne => lhs != rhs,
                    F64Lt => lhs < rhs,
                    F64Gt => lhs > rhs,
                    F64Le => lhs <= rhs,
                    _ => lhs >= rhs,
                })
            }
        };
        self.stack.push(result);
        Ok(())
    }

    pub(super) fn exec_arithmetic(&mut self, op: ArithmeticOp) -> Result<()> {
        use ArithmeticOp::*;
        let result = match op {
            // i32 unary
            I32Clz => Value::I32(self.stack.pop_i32()?.leading_zeros() as i32),
            I32Ctz => Value::I32(self.stack.pop_i32()?.trailing_zeros() as i32),
            I32Popcnt => Value::I32(self.stack.pop_i32()?.count_ones() as i32),
            // i32 binary
            I32Add | I32Sub | I32Mul | I32DivS | I32DivU | I32RemS | I32RemU | I32And | I32Or
            | I32Xor | I32Shl | I32ShrS | I32ShrU | I32Rotl | I32Rotr => {
                let rhs = self.stack.pop_i32()?;
                let lhs = self.stack.pop_i32()?;
                Value::I32(match op {
                    I32Add => lhs.wrapping_add(rhs),
                    I32Sub => lhs.wrapping_sub(rhs),
                    I32Mul => lhs.wrapping_mul(rhs),
                    I32DivS => ops::i32_div_s(lhs, rhs)?,
                    I32DivU => ops::i32_div_u(lhs as u32, rhs as u32)? as i32,
                    I32RemS => ops::i32_rem_s(lhs, rhs)?,
                    I32RemU => ops::i32_rem_u(lhs as u32, rhs as u32)? as i32,
                    I32And => lhs & rhs,
                    I32Or => lhs | rhs,
                    I32Xor => lhs ^ rhs,
                    // Shift counts are taken modulo the bit width.
                    I32Shl => lhs.wrapping_shl(rhs as u32),
                    I32ShrS => lhs.wrapping_shr(rhs as u32),
                    I32ShrU => ((lhs as u32).wrapping_shr(rhs as u32)) as i32,
                    I32Rotl => lhs.rotate_left(rhs as u32 & 31),
                    _ => lhs.rotate_right(rhs as u32 & 31),
                })
            }
            // i64 unary
            I64Clz => Value::I64(i64::from(self.stack.pop_i64()?.leading_zeros())),
            I64Ctz => Value::I64(i64::from(self.stack.pop_i64()?.trailing_zeros())),
            I64Popcnt => Value::I64(i64::from(self.stack.pop_i64()?.count_ones())),
            // i64 binary
            I64Add | I64Sub | I64Mul | I64DivS | I64DivU | I64RemS | I64RemU | I64And | I64Or
            | I64Xor | I64Shl | I64ShrS | I64ShrU | I64Rotl | I64Rotr => {
                let rhs = self.stack.pop_i64()?;
                let lhs = self.stack.pop_i64()?;
                Value::I64(match op {
                    I64Add => lhs.wrapping_add(rhs),
                    I64Sub => lhs.wrapping_sub(rhs),
                    I64Mul => lhs.wrapping_mul(rhs),
                    I64DivS => ops::i64_div_s(lhs, rhs)?,
                    I64DivU => ops::i64_div_u(lhs as u64, rhs as u64)? as i64,
                    I64RemS => ops::i64_rem_s(lhs, rhs)?,
                    I64RemU => ops::i64_rem_u(lhs as u64, rhs as u64)? as i64,
                    I64And => lhs & rhs,
                    I64Or => lhs | rhs,
                    I64Xor => lhs ^ rhs,
                    I64Shl => lhs.wrapping_shl(rhs as u32),
                    I64ShrS => lhs.wrapping_shr(rhs as u32),
                    I64ShrU => ((lhs as u64).wrapping_shr(rhs as u32)) as i64,
                    I64Rotl => lhs.rotate_left(rhs as u32 & 63),
                    _ => lhs.rotate_right(rhs as u32 & 63),
                })
            }
            // f32 unary
            F32Abs => Value::F32(ops::f32_abs(self.stack.pop_f32()?)),
            F32Neg => Value::F32(ops::f32_neg(self.stack.pop_f32()?)),
            F32Ceil => Value::F32(ops::f32_ceil(self.stack.pop_f32()?)),
            F32Floor => Value::F32(ops::f32_floor(self.stack.pop_f32()?)),
            F32Trunc => Value::F32(ops::f32_trunc(self.stack.pop_f32()?)),
            F32Nearest => Value::F32(ops::f32_nearest(self.stack.pop_f32()?)),
            F32Sqrt => Value::F32(ops::f32_sqrt(self.stack.pop_f32()?)),
            // f32 binary
            F32Add | F32Sub | F32Mul | F32Div | F32Min | F32Max | F32Copysign => {
                let rhs = self.stack.pop_f32()?;
                let lhs = self.stack.pop_f32()?;
                Value::F32(match op {
                    F32Add => ops::f32_add(lhs, rhs),
                    F32Sub => ops::f32_sub(lhs, rhs),
                    F32Mul => ops::f32_mul(lhs, rhs),
                    F32Div => ops::f32_div(lhs, rhs),
                    F32Min => ops::f32_min(lhs, rhs),
                    F32Max => ops::f32_max(lhs, rhs),
                    _ => ops::f32_copysign(lhs, rhs),
                })
            }
            // f64 unary
            F64Abs => Value::F64(ops::f64_abs(self.stack.pop_f64()?)),
            F64Neg => Value::F64(ops::f64_neg(self.stack.pop_f64()?)),
            F64Ceil => Value::F64(ops::f64_ceil(self.stack.pop_f64()?)),
            F64Floor => Value::F64(ops::f64_floor(self.stack.pop_f64()?)),
            F64Trunc => Value::F64(ops::f64_trunc(self.stack.pop_f64()?)),
            F64Nearest => Value::F64(ops::f64_nearest(self.stack.pop_f64()?)),
            F64Sqrt => Value::F64(ops::f64_sqrt(self.stack.pop_f64()?)),
            // f64 binary
            _ => {
                let rhs = self.stack.pop_f64()?;
                let lhs = self.stack.pop_f64()?;
                Value::F64(match op {
                    F64Add => ops::f64_add(lhs, rhs),
                    F64Sub => ops::f64_sub(lhs, rhs),
                    F64Mul => ops::f64_mul(lhs, rhs),
                    F64Div => ops::f64_div(lhs, rhs),
                    F64Min => ops::f64_min(lhs, rhs),
                    F64Max => ops::f64_max(lhs, rhs),
                    _ => ops::f64_copysign(lhs, rhs),
                })
            }
        };
        self.stack.push(result);
        Ok(())
    }

    pub(super) fn exec_conversion(&mut self, op: ConversionOp) -> Result<()> {
        use ConversionOp::*;
        let result = match op {
            I32WrapI64 => Value::I32(self.stack.pop_i64()? as i32),
            I32TruncF32S => Value::I32(ops::trunc_f32_to_i32_s(self.stack.pop_f32()?)?),
            I32TruncF32U => Value::I32(ops::trunc_f32_to_i32_u(self.stack.pop_f32()?)? as i32),
            I32TruncF64S => Value::I32(ops::trunc_f64_to_i32_s(self.stack.pop_f64()?)?),
            I32TruncF64U => Value::I32(ops::trunc_f64_to_i32_u(self.stack.pop_f64()?)? as i32),
            I64ExtendI32S => Value::I64(i64::from(self.stack.pop_i32()?)),
            I64ExtendI32U => Value::I64(i64::from(self.stack.pop_u32()?)),
            I64TruncF32S => Value::I64(ops::trunc_f32_to_i64_s(self.stack.pop_f32()?)?),
            I64TruncF32U => Value::I64(ops::trunc_f32_to_i64_u(self.stack.pop_f32()?)? as i64),
            I64TruncF64S => Value::I64(ops::trunc_f64_to_i64_s(self.stack.pop_f64()?)?),
            I64TruncF64U => Value::I64(ops::trunc_f64_to_i64_u(self.stack.pop_f64()?)? as i64),
            F32ConvertI32S => Value::F32(ops::convert_i32_s_to_f32(self.stack.pop_i32()?)),
            F32ConvertI32U => Value::F32(ops::convert_i32_u_to_f32(self.stack.pop_u32()?)),
            F32ConvertI64S => Value::F32(ops::convert_i64_s_to_f32(self.stack.pop_i64()?)),
            F32ConvertI64U => Value::F32(ops::convert_i64_u_to_f32(self.stack.pop_i64()? as u64)),
            F32DemoteF64 => Value::F32(ops::f32_demote_f64(self.stack.pop_f64()?)),
            F64ConvertI32S => Value::F64(ops::convert_i32_s_to_f64(self.stack.pop_i32()?)),
            F64ConvertI32U => Value::F64(ops::convert_i32_u_to_f64(self.stack.pop_u32()?)),
            F64ConvertI64S => Value::F64(ops::convert_i64_s_to_f64(self.stack.pop_i64()?)),
            F64ConvertI64U => Value::F64(ops::convert_i64_u_to_f64(self.stack.pop_i64()? as u64)),
            F64PromoteF32 => Value::F64(ops::f64_promote_f32(self.stack.pop_f32()?)),
            I32ReinterpretF32 => Value::I32(self.stack.pop_f32()?.to_bits() as i32),
            I64ReinterpretF64 => Value::I64(self.stack.pop_f64()?.to_bits() as i64),
            F32ReinterpretI32 => Value::F32(FloatBits32::from_bits(self.stack.pop_i32()? as u32)),
            F64ReinterpretI64 => Value::F64(FloatBits64::from_bits(self.stack.pop_i64()? as u64)),
        };
        self.stack.push(result);
        Ok(())
    }
}
