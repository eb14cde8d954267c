//! Instruction and expression decoding.
//!
//! An expression is a sequence of instructions terminated by `end` at
//! the current nesting level; `block` and `loop` bodies are nested
//! expressions, and `if` bodies split at `else`. The single factory
//! below maps each opcode byte to its instruction variant, so opcodes
//! outside the MVP set are rejected here, before validation.

use corten_error::{codes, Error, Result};
use corten_format::binary;
use corten_format::{
    ArithmeticOp, BlockType, ComparisonOp, ConversionOp, Expr, Instruction, LoadOp, MemArg,
    StoreOp,
};

use crate::reader::ByteReader;

const INVALID_OPCODE: Error = Error::parse(codes::INVALID_OPCODE, "unknown opcode byte");

/// What ended an expression at the current nesting level.
enum Terminator {
    /// The `end` opcode.
    End,
    /// The `else` opcode; only valid directly inside an `if`.
    Else,
}

/// Decode an expression and consume its terminating `end`.
pub fn decode_expr(reader: &mut ByteReader<'_>) -> Result<Expr> {
    let (expr, terminator) = decode_expr_until(reader)?;
    match terminator {
        Terminator::End => Ok(expr),
        Terminator::Else => Err(Error::parse(
            codes::INVALID_GRAMMAR,
            "else outside of an if body",
        )),
    }
}

fn decode_expr_until(reader: &mut ByteReader<'_>) -> Result<(Expr, Terminator)> {
    let mut expr = Expr::new();
    loop {
        let opcode = reader.read_u8()?;
        match opcode {
            binary::END => return Ok((expr, Terminator::End)),
            binary::ELSE => return Ok((expr, Terminator::Else)),
            _ => expr.push(decode_instruction(reader, opcode)?),
        }
    }
}

fn read_block_type(reader: &mut ByteReader<'_>) -> Result<BlockType> {
    BlockType::from_byte(reader.read_u8()?)
}

fn read_mem_arg(reader: &mut ByteReader<'_>) -> Result<MemArg> {
    let align = reader.read_u32_leb()?;
    let offset = reader.read_u32_leb()?;
    Ok(MemArg { align, offset })
}

fn read_reserved_zero(reader: &mut ByteReader<'_>) -> Result<()> {
    if reader.read_u8()? != 0 {
        return Err(Error::parse(
            codes::INVALID_GRAMMAR,
            "reserved byte must be zero",
        ));
    }
    Ok(())
}

/// Build the instruction for `opcode`, consuming its immediates (and,
/// for block-bearing instructions, its nested bodies).
fn decode_instruction(reader: &mut ByteReader<'_>, opcode: u8) -> Result<Instruction> {
    let instr = match opcode {
        binary::UNREACHABLE => Instruction::Unreachable,
        binary::NOP => Instruction::Nop,
        binary::BLOCK => {
            let block_type = read_block_type(reader)?;
            let body = decode_expr(reader)?;
            Instruction::Block { block_type, body }
        }
        binary::LOOP => {
            let block_type = read_block_type(reader)?;
            let body = decode_expr(reader)?;
            Instruction::Loop { block_type, body }
        }
        binary::IF => {
            let block_type = read_block_type(reader)?;
            let (then_body, terminator) = decode_expr_until(reader)?;
            let else_body = match terminator {
                Terminator::End => Expr::new(),
                Terminator::Else => decode_expr(reader)?,
            };
            Instruction::If { block_type, then_body, else_body }
        }
        binary::BR => Instruction::Br(reader.read_u32_leb()?),
        binary::BR_IF => Instruction::BrIf(reader.read_u32_leb()?),
        binary::BR_TABLE => {
            let count = reader.read_u32_leb()?;
            let mut targets = alloc::vec::Vec::new();
            for _ in 0..count {
                targets.push(reader.read_u32_leb()?);
            }
            let default = reader.read_u32_leb()?;
            Instruction::BrTable { targets, default }
        }
        binary::RETURN => Instruction::Return,
        binary::CALL => Instruction::Call(reader.read_u32_leb()?),
        binary::CALL_INDIRECT => {
            let type_index = reader.read_u32_leb()?;
            // The table index is reserved zero in MVP.
            read_reserved_zero(reader)?;
            Instruction::CallIndirect { type_index }
        }
        binary::DROP => Instruction::Drop,
        binary::SELECT => Instruction::Select,
        binary::LOCAL_GET => Instruction::LocalGet(reader.read_u32_leb()?),
        binary::LOCAL_SET => Instruction::LocalSet(reader.read_u32_leb()?),
        binary::LOCAL_TEE => Instruction::LocalTee(reader.read_u32_leb()?),
        binary::GLOBAL_GET => Instruction::GlobalGet(reader.read_u32_leb()?),
        binary::GLOBAL_SET => Instruction::GlobalSet(reader.read_u32_leb()?),
        binary::I32_LOAD..=binary::I64_LOAD32_U => {
            Instruction::Load(load_op(opcode), read_mem_arg(reader)?)
        }
        binary::I32_STORE..=binary::I64_STORE32 => {
            Instruction::Store(store_op(opcode), read_mem_arg(reader)?)
        }
        binary::MEMORY_SIZE => {
            read_reserved_zero(reader)?;
            Instruction::MemorySize
        }
        binary::MEMORY_GROW => {
            read_reserved_zero(reader)?;
            Instruction::MemoryGrow
        }
        binary::I32_CONST => Instruction::I32Const(reader.read_s32_leb()?),
        binary::I64_CONST => Instruction::I64Const(reader.read_s64_leb()?),
        binary::F32_CONST => Instruction::F32Const(reader.read_f32()?),
        binary::F64_CONST => Instruction::F64Const(reader.read_f64()?),
        binary::I32_EQZ..=binary::F64_GE => Instruction::Comparison(comparison_op(opcode)),
        binary::I32_CLZ..=binary::F64_COPYSIGN => Instruction::Arithmetic(arithmetic_op(opcode)),
        binary::I32_WRAP_I64..=binary::F64_REINTERPRET_I64 => {
            Instruction::Conversion(conversion_op(opcode))
        }
        _ => return Err(INVALID_OPCODE),
    };
    Ok(instr)
}

fn load_op(opcode: u8) -> LoadOp {
    match opcode {
        binary::I32_LOAD => LoadOp::I32Load,
        binary::I64_LOAD => LoadOp::I64Load,
        binary::F32_LOAD => LoadOp::F32Load,
        binary::F64_LOAD => LoadOp::F64Load,
        binary::I32_LOAD8_S => LoadOp::I32Load8S,
        binary::I32_LOAD8_U => LoadOp::I32Load8U,
        binary::I32_LOAD16_S => LoadOp::I32Load16S,
        binary::I32_LOAD16_U => LoadOp::I32Load16U,
        binary::I64_LOAD8_S => LoadOp::I64Load8S,
        binary::I64_LOAD8_U => LoadOp::I64Load8U,
        binary::I64_LOAD16_S => LoadOp::I64Load16S,
        binary::I64_LOAD16_U => LoadOp::I64Load16U,
        binary::I64_LOAD32_S => LoadOp::I64Load32S,
        _ => LoadOp::I64Load32U,
    }
}

fn store_op(opcode: u8) -> StoreOp {
    match opcode {
        binary::I32_STORE => StoreOp::I32Store,
        binary::I64_STORE => StoreOp::I64Store,
        binary::F32_STORE => StoreOp::F32Store,
        binary::F64_STORE => StoreOp::F64Store,
        binary::I32_STORE8 => StoreOp::I32Store8,
        binary::I32_STORE16 => StoreOp::I32Store16,
        binary::I64_STORE8 => StoreOp::I64Store8,
        binary::I64_STORE16 => StoreOp::I64Store16,
        _ => StoreOp::I64Store32,
    }
}

fn comparison_op(opcode: u8) -> ComparisonOp {
    match opcode {
        binary::I32_EQZ => ComparisonOp::I32Eqz,
        binary::I32_EQ => ComparisonOp::I32Eq,
        binary::I32_NE => ComparisonOp::I32Ne,
        binary::I32_LT_S => ComparisonOp::I32LtS,
        binary::I32_LT_U => ComparisonOp::I32LtU,
        binary::I32_GT_S => ComparisonOp::I32GtS,
        binary::I32_GT_U => ComparisonOp::I32GtU,
        binary::I32_LE_S => ComparisonOp::I32LeS,
        binary::I32_LE_U => ComparisonOp::I32LeU,
        binary::I32_GE_S => ComparisonOp::I32GeS,
        binary::I32_GE_U => ComparisonOp::I32GeU,
        binary::I64_EQZ => ComparisonOp::I64Eqz,
        binary::I64_EQ => ComparisonOp::I64Eq,
        binary::I64_NE => ComparisonOp::I64Ne,
        binary::I64_LT_S => ComparisonOp::I64LtS,
        binary::I64_LT_U => ComparisonOp::I64LtU,
        binary::I64_GT_S => ComparisonOp::I64GtS,
        binary::I64_GT_U => ComparisonOp::I64GtU,
        binary::I64_LE_S => ComparisonOp::I64LeS,
        binary::I64_LE_U => ComparisonOp::I64LeU,
        binary::I64_GE_S => ComparisonOp::I64GeS,
        binary::I64_GE_U => ComparisonOp::I64GeU,
        binary::F32_EQ => ComparisonOp::F32Eq,
        binary::F32_NE => ComparisonOp::F32Ne,
        binary::F32_LT => ComparisonOp::F32Lt,
        binary::F32_GT => ComparisonOp::F32Gt,
        binary::F32_LE => ComparisonOp::F32Le,
        binary::F32_GE => ComparisonOp::F32Ge,
        binary::F64_EQ => ComparisonOp::F64Eq,
        binary::F64_NE => ComparisonOp::F64Ne,
        binary::F64_LT => ComparisonOp::F64Lt,
        binary::F64_GT => ComparisonOp::F64Gt,
        binary::F64_LE => ComparisonOp::F64Le,
        _ => ComparisonOp::F64Ge,
    }
}

fn arithmetic_op(opcode: u8) -> ArithmeticOp {
    match opcode {
        binary::I32_CLZ => ArithmeticOp::I32Clz,
        binary::I32_CTZ => ArithmeticOp::I32Ctz,
        binary::I32_POPCNT => ArithmeticOp::I32Popcnt,
        binary::I32_ADD => ArithmeticOp::I32Add,
        binary::I32_SUB => ArithmeticOp::I32Sub,
        binary::I32_MUL => ArithmeticOp::I32Mul,
        binary::I32_DIV_S => ArithmeticOp::I32DivS,
        binary::I32_DIV_U => ArithmeticOp::I32DivU,
        binary::I32_REM_S => ArithmeticOp::I32RemS,
        binary::I32_REM_U => ArithmeticOp::I32RemU,
        binary::I32_AND => ArithmeticOp::I32And,
        binary::I32_OR => ArithmeticOp::I32Or,
        binary::I32_XOR => ArithmeticOp::I32Xor,
        binary::I32_SHL => ArithmeticOp::I32Shl,
        binary::I32_SHR_S => ArithmeticOp::I32ShrS,
        binary::I32_SHR_U => ArithmeticOp::I32ShrU,
        binary::I32_ROTL => ArithmeticOp::I32Rotl,
        binary::I32_ROTR => ArithmeticOp::I32Rotr,
        binary::I64_CLZ => ArithmeticOp::I64Clz,
        binary::I64_CTZ => ArithmeticOp::I64Ctz,
        binary::I64_POPCNT => ArithmeticOp::I64Popcnt,
        binary::I64_ADD => ArithmeticOp::I64Add,
        binary::I64_SUB => ArithmeticOp::I64Sub,
        binary::I64_MUL => ArithmeticOp::I64Mul,
        binary::I64_DIV_S => ArithmeticOp::I64DivS,
        binary::I64_DIV_U => ArithmeticOp::I64DivU,
        binary::I64_REM_S => ArithmeticOp::I64RemS,
        binary::I64_REM_U => ArithmeticOp::I64RemU,
        binary::I64_AND => ArithmeticOp::I64And,
        binary::I64_OR => ArithmeticOp::I64Or,
        binary::I64_XOR => ArithmeticOp::I64Xor,
        binary::I64_SHL => ArithmeticOp::I64Shl,
        binary::I64_SHR_S => ArithmeticOp::I64ShrS,
        binary::I64_SHR_U => ArithmeticOp::I64ShrU,
        binary::I64_ROTL => ArithmeticOp::I64Rotl,
        binary::I64_ROTR => ArithmeticOp::I64Rotr,
        binary::F32_ABS => ArithmeticOp::F32Abs,
        binary::F32_NEG => ArithmeticOp::F32Neg,
        binary::F32_CEIL => ArithmeticOp::F32Ceil,
        binary::F32_FLOOR => ArithmeticOp::F32Floor,
        binary::F32_TRUNC => ArithmeticOp::F32Trunc,
        binary::F32_NEAREST => ArithmeticOp::F32Nearest,
        binary::F32_SQRT => ArithmeticOp::F32Sqrt,
        binary::F32_ADD => ArithmeticOp::F32Add,
        binary::F32_SUB => ArithmeticOp::F32Sub,
        binary::F32_MUL => ArithmeticOp::F32Mul,
        binary::F32_DIV => ArithmeticOp::F32Div,
        binary::F32_MIN => ArithmeticOp::F32Min,
        binary::F32_MAX => ArithmeticOp::F32Max,
        binary::F32_COPYSIGN => ArithmeticOp::F32Copysign,
        binary::F64_ABS => ArithmeticOp::F64Abs,
        binary::F64_NEG => ArithmeticOp::F64Neg,
        binary::F64_CEIL => ArithmeticOp::F64Ceil,
        binary::F64_FLOOR => ArithmeticOp::F64Floor,
        binary::F64_TRUNC => ArithmeticOp::F64Trunc,
        binary::F64_NEAREST => ArithmeticOp::F64Nearest,
        binary::F64_SQRT => ArithmeticOp::F64Sqrt,
        binary::F64_ADD => ArithmeticOp::F64Add,
        binary::F64_SUB => ArithmeticOp::F64Sub,
        binary::F64_MUL => ArithmeticOp::F64Mul,
        binary::F64_DIV => ArithmeticOp::F64Div,
        binary::F64_MIN => ArithmeticOp::F64Min,
        binary::F64_MAX => ArithmeticOp::F64Max,
        _ => ArithmeticOp::F64Copysign,
    }
}

fn conversion_op(opcode: u8) -> ConversionOp {
    match opcode {
        binary::I32_WRAP_I64 => ConversionOp::I32WrapI64,
        binary::I32_TRUNC_F32_S => ConversionOp::I32TruncF32S,
        binary::I32_TRUNC_F32_U => ConversionOp::I32TruncF32U,
        binary::I32_TRUNC_F64_S => ConversionOp::I32TruncF64S,
        binary::I32_TRUNC_F64_U => ConversionOp::I32TruncF64U,
        binary::I64_EXTEND_I32_S => ConversionOp::I64ExtendI32S,
        binary::I64_EXTEND_I32_U => ConversionOp::I64ExtendI32U,
        binary::I64_TRUNC_F32_S => ConversionOp::I64TruncF32S,
        binary::I64_TRUNC_F32_U => ConversionOp::I64TruncF32U,
        binary::I64_TRUNC_F64_S => ConversionOp::I64TruncF64S,
        binary::I64_TRUNC_F64_U => ConversionOp::I64TruncF64U,
        binary::F32_CONVERT_I32_S => ConversionOp::F32ConvertI32S,
        binary::F32_CONVERT_I32_U => ConversionOp::F32ConvertI32U,
        binary::F32_CONVERT_I64_S => ConversionOp::F32ConvertI64S,
        binary::F32_CONVERT_I64_U => ConversionOp::F32ConvertI64U,
        binary::F32_DEMOTE_F64 => ConversionOp::F32DemoteF64,
        binary::F64_CONVERT_I32_S => ConversionOp::F64ConvertI32S,
        binary::F64_CONVERT_I32_U => ConversionOp::F64ConvertI32U,
        binary::F64_CONVERT_I64_S => ConversionOp::F64ConvertI64S,
        binary::F64_CONVERT_I64_U => ConversionOp::F64ConvertI64U,
        binary::F64_PROMOTE_F32 => ConversionOp::F64PromoteF32,
        binary::I32_REINTERPRET_F32 => ConversionOp::I32ReinterpretF32,
        binary::I64_REINTERPRET_F64 => ConversionOp::I64ReinterpretF64,
        binary::F32_REINTERPRET_I32 => ConversionOp::F32ReinterpretI32,
        _ => ConversionOp::F64ReinterpretI64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<Expr> {
        let mut reader = ByteReader::new(bytes);
        decode_expr(&mut reader)
    }

    #[test]
    fn test_decode_flat_expression() {
        let expr = decode(&[0x20, 0x00, 0x20, 0x01, 0x6A, 0x0B]).unwrap();
        assert_eq!(
            expr,
            alloc::vec![
                Instruction::LocalGet(0),
                Instruction::LocalGet(1),
                Instruction::Arithmetic(ArithmeticOp::I32Add),
            ]
        );
    }

    #[test]
    fn test_decode_nested_blocks() {
        // block (result empty) { loop { br 1 } } end
        let expr = decode(&[0x02, 0x40, 0x03, 0x40, 0x0C, 0x01, 0x0B, 0x0B, 0x0B]).unwrap();
        match &expr[0] {
            Instruction::Block { body, .. } => match &body[0] {
                Instruction::Loop { body, .. } => assert_eq!(body[0], Instruction::Br(1)),
                other => panic!("expected loop, got {other:?}"),
            },
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_if_with_and_without_else() {
        // if (result i32) i32.const 1 else i32.const 2 end
        let expr = decode(&[0x04, 0x7F, 0x41, 0x01, 0x05, 0x41, 0x02, 0x0B, 0x0B]).unwrap();
        match &expr[0] {
            Instruction::If { then_body, else_body, .. } => {
                assert_eq!(then_body[0], Instruction::I32Const(1));
                assert_eq!(else_body[0], Instruction::I32Const(2));
            }
            other => panic!("expected if, got {other:?}"),
        }

        let expr = decode(&[0x04, 0x40, 0x01, 0x0B, 0x0B]).unwrap();
        match &expr[0] {
            Instruction::If { else_body, .. } => assert!(else_body.is_empty()),
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_br_table() {
        let expr = decode(&[0x0E, 0x02, 0x00, 0x01, 0x02, 0x0B]).unwrap();
        assert_eq!(
            expr[0],
            Instruction::BrTable { targets: alloc::vec![0, 1], default: 2 }
        );
    }

    #[test]
    fn test_unknown_opcode_rejected() {
        // 0xC0 is sign-extension (post-MVP), 0xFC the misc prefix.
        assert_eq!(decode(&[0xC0, 0x0B]), Err(INVALID_OPCODE));
        assert_eq!(decode(&[0xFC, 0x00, 0x0B]), Err(INVALID_OPCODE));
    }

    #[test]
    fn test_else_outside_if_rejected() {
        let err = decode(&[0x05, 0x0B]).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_GRAMMAR);
    }

    #[test]
    fn test_call_indirect_reserved_byte() {
        let expr = decode(&[0x11, 0x00, 0x00, 0x0B]).unwrap();
        assert_eq!(expr[0], Instruction::CallIndirect { type_index: 0 });
        let err = decode(&[0x11, 0x00, 0x01, 0x0B]).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_GRAMMAR);
    }

    #[test]
    fn test_missing_end_is_unexpected_end() {
        assert_eq!(decode(&[0x01, 0x01]), Err(Error::unexpected_end()));
    }
}
