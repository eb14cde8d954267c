//! The instruction AST.
//!
//! Instructions are one tagged enum; each variant carries exactly the
//! payload its group needs (spec-level grouping: control, block, branch,
//! call, parametric, variable, memory, const, numeric). The numeric
//! groups are nested enums so decode and dispatch can share one
//! opcode-to-variant mapping without a three-hundred-arm outer match.
//!
//! An [`Expr`] is a finite instruction sequence; the terminating `end`
//! byte is consumed by the decoder and not represented as a node.

use crate::binary;
use crate::prelude::{BlockType, FloatBits32, FloatBits64, ValueType, Vec};

/// A decoded expression: instructions up to (but not including) `end`.
pub type Expr = Vec<Instruction>;

/// Immediate operands of a memory access instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemArg {
    /// Alignment exponent hint (log2 of the alignment, not enforced).
    pub align: u32,
    /// Static byte offset added to the dynamic address operand.
    pub offset: u32,
}

/// A memory load instruction, by source width and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LoadOp {
    I32Load,
    I64Load,
    F32Load,
    F64Load,
    I32Load8S,
    I32Load8U,
    I32Load16S,
    I32Load16U,
    I64Load8S,
    I64Load8U,
    I64Load16S,
    I64Load16U,
    I64Load32S,
    I64Load32U,
}

impl LoadOp {
    /// The opcode byte.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::I32Load => binary::I32_LOAD,
            Self::I64Load => binary::I64_LOAD,
            Self::F32Load => binary::F32_LOAD,
            Self::F64Load => binary::F64_LOAD,
            Self::I32Load8S => binary::I32_LOAD8_S,
            Self::I32Load8U => binary::I32_LOAD8_U,
            Self::I32Load16S => binary::I32_LOAD16_S,
            Self::I32Load16U => binary::I32_LOAD16_U,
            Self::I64Load8S => binary::I64_LOAD8_S,
            Self::I64Load8U => binary::I64_LOAD8_U,
            Self::I64Load16S => binary::I64_LOAD16_S,
            Self::I64Load16U => binary::I64_LOAD16_U,
            Self::I64Load32S => binary::I64_LOAD32_S,
            Self::I64Load32U => binary::I64_LOAD32_U,
        }
    }

    /// Type of the value the load pushes.
    #[must_use]
    pub const fn result_type(self) -> ValueType {
        match self {
            Self::I32Load | Self::I32Load8S | Self::I32Load8U | Self::I32Load16S | Self::I32Load16U => ValueType::I32,
            Self::F32Load => ValueType::F32,
            Self::F64Load => ValueType::F64,
            _ => ValueType::I64,
        }
    }

    /// Number of bytes read from memory.
    #[must_use]
    pub const fn access_width(self) -> u32 {
        match self {
            Self::I32Load8S | Self::I32Load8U | Self::I64Load8S | Self::I64Load8U => 1,
            Self::I32Load16S | Self::I32Load16U | Self::I64Load16S | Self::I64Load16U => 2,
            Self::I32Load | Self::F32Load | Self::I64Load32S | Self::I64Load32U => 4,
            Self::I64Load | Self::F64Load => 8,
        }
    }
}

/// A memory store instruction, by destination width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum StoreOp {
    I32Store,
    I64Store,
    F32Store,
    F64Store,
    I32Store8,
    I32Store16,
    I64Store8,
    I64Store16,
    I64Store32,
}

impl StoreOp {
    /// The opcode byte.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::I32Store => binary::I32_STORE,
            Self::I64Store => binary::I64_STORE,
            Self::F32Store => binary::F32_STORE,
            Self::F64Store => binary::F64_STORE,
            Self::I32Store8 => binary::I32_STORE8,
            Self::I32Store16 => binary::I32_STORE16,
            Self::I64Store8 => binary::I64_STORE8,
            Self::I64Store16 => binary::I64_STORE16,
            Self::I64Store32 => binary::I64_STORE32,
        }
    }

    /// Type of the value operand.
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::I32Store | Self::I32Store8 | Self::I32Store16 => ValueType::I32,
            Self::F32Store => ValueType::F32,
            Self::F64Store => ValueType::F64,
            _ => ValueType::I64,
        }
    }

    /// Number of bytes written to memory.
    #[must_use]
    pub const fn access_width(self) -> u32 {
        match self {
            Self::I32Store8 | Self::I64Store8 => 1,
            Self::I32Store16 | Self::I64Store16 => 2,
            Self::I32Store | Self::F32Store | Self::I64Store32 => 4,
            Self::I64Store | Self::F64Store => 8,
        }
    }
}

/// Comparison instructions. All push an `i32` boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ComparisonOp {
    I32Eqz,
    I32Eq,
    I32Ne,
    I32LtS,
    I32LtU,
    I32GtS,
    I32GtU,
    I32LeS,
    I32LeU,
    I32GeS,
    I32GeU,
    I64Eqz,
    I64Eq,
    I64Ne,
    I64LtS,
    I64LtU,
    I64GtS,
    I64GtU,
    I64LeS,
    I64LeU,
    I64GeS,
    I64GeU,
    F32Eq,
    F32Ne,
    F32Lt,
    F32Gt,
    F32Le,
    F32Ge,
    F64Eq,
    F64Ne,
    F64Lt,
    F64Gt,
    F64Le,
    F64Ge,
}

impl ComparisonOp {
    /// The opcode byte.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::I32Eqz => binary::I32_EQZ,
            Self::I32Eq => binary::I32_EQ,
            Self::I32Ne => binary::I32_NE,
            Self::I32LtS => binary::I32_LT_S,
            Self::I32LtU => binary::I32_LT_U,
            Self::I32GtS => binary::I32_GT_S,
            Self::I32GtU => binary::I32_GT_U,
            Self::I32LeS => binary::I32_LE_S,
            Self::I32LeU => binary::I32_LE_U,
            Self::I32GeS => binary::I32_GE_S,
            Self::I32GeU => binary::I32_GE_U,
            Self::I64Eqz => binary::I64_EQZ,
            Self::I64Eq => binary::I64_EQ,
            Self::I64Ne => binary::I64_NE,
            Self::I64LtS => binary::I64_LT_S,
            Self::I64LtU => binary::I64_LT_U,
            Self::I64GtS => binary::I64_GT_S,
            Self::I64GtU => binary::I64_GT_U,
            Self::I64LeS => binary::I64_LE_S,
            Self::I64LeU => binary::I64_LE_U,
            Self::I64GeS => binary::I64_GE_S,
            Self::I64GeU => binary::I64_GE_U,
            Self::F32Eq => binary::F32_EQ,
            Self::F32Ne => binary::F32_NE,
            Self::F32Lt => binary::F32_LT,
            Self::F32Gt => binary::F32_GT,
            Self::F32Le => binary::F32_LE,
            Self::F32Ge => binary::F32_GE,
            Self::F64Eq => binary::F64_EQ,
            Self::F64Ne => binary::F64_NE,
            Self::F64Lt => binary::F64_LT,
            Self::F64Gt => binary::F64_GT,
            Self::F64Le => binary::F64_LE,
            Self::F64Ge => binary::F64_GE,
        }
    }

    /// Type of the compared operands.
    #[must_use]
    pub const fn operand_type(self) -> ValueType {
        match self {
            Self::I32Eqz
            | Self::I32Eq
            | Self::I32Ne
            | Self::I32LtS
            | Self::I32LtU
            | Self::I32GtS
            | Self::I32GtU
            | Self::I32LeS
            | Self::I32LeU
            | Self::I32GeS
            | Self::I32GeU => ValueType::I32,
            Self::I64Eqz
            | Self::I64Eq
            | Self::I64Ne
            | Self::I64LtS
            | Self::I64LtU
            | Self::I64GtS
            | Self::I64GtU
            | Self::I64LeS
            | Self::I64LeU
            | Self::I64GeS
            | Self::I64GeU => ValueType::I64,
            Self::F32Eq | Self::F32Ne | Self::F32Lt | Self::F32Gt | Self::F32Le | Self::F32Ge => {
                ValueType::F32
            }
            Self::F64Eq | Self::F64Ne | Self::F64Lt | Self::F64Gt | Self::F64Le | Self::F64Ge => {
                ValueType::F64
            }
        }
    }

    /// Whether the operation takes one operand (`eqz`) rather than two.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::I32Eqz | Self::I64Eqz)
    }
}

/// Arithmetic and bit instructions. Operands and result share one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ArithmeticOp {
    I32Clz,
    I32Ctz,
    I32Popcnt,
    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32DivU,
    I32RemS,
    I32RemU,
    I32And,
    I32Or,
    I32Xor,
    I32Shl,
    I32ShrS,
    I32ShrU,
    I32Rotl,
    I32Rotr,
    I64Clz,
    I64Ctz,
    I64Popcnt,
    I64Add,
    I64Sub,
    I64Mul,
    I64DivS,
    I64DivU,
    I64RemS,
    I64RemU,
    I64And,
    I64Or,
    I64Xor,
    I64Shl,
    I64ShrS,
    I64ShrU,
    I64Rotl,
    I64Rotr,
    F32Abs,
    F32Neg,
    F32Ceil,
    F32Floor,
    F32Trunc,
    F32Nearest,
    F32Sqrt,
    F32Add,
    F32Sub,
    F32Mul,
    F32Div,
    F32Min,
    F32Max,
    F32Copysign,
    F64Abs,
    F64Neg,
    F64Ceil,
    F64Floor,
    F64Trunc,
    F64Nearest,
    F64Sqrt,
    F64Add,
    F64Sub,
    F64Mul,
    F64Div,
    F64Min,
    F64Max,
    F64Copysign,
}

impl ArithmeticOp {
    /// The opcode byte.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::I32Clz => binary::I32_CLZ,
            Self::I32Ctz => binary::I32_CTZ,
            Self::I32Popcnt => binary::I32_POPCNT,
            Self::I32Add => binary::I32_ADD,
            Self::I32Sub => binary::I32_SUB,
            Self::I32Mul => binary::I32_MUL,
            Self::I32DivS => binary::I32_DIV_S,
            Self::I32DivU => binary::I32_DIV_U,
            Self::I32RemS => binary::I32_REM_S,
            Self::I32RemU => binary::I32_REM_U,
            Self::I32And => binary::I32_AND,
            Self::I32Or => binary::I32_OR,
            Self::I32Xor => binary::I32_XOR,
            Self::I32Shl => binary::I32_SHL,
            Self::I32ShrS => binary::I32_SHR_S,
            Self::I32ShrU => binary::I32_SHR_U,
            Self::I32Rotl => binary::I32_ROTL,
            Self::I32Rotr => binary::I32_ROTR,
            Self::I64Clz => binary::I64_CLZ,
            Self::I64Ctz => binary::I64_CTZ,
            Self::I64Popcnt => binary::I64_POPCNT,
            Self::I64Add => binary::I64_ADD,
            Self::I64Sub => binary::I64_SUB,
            Self::I64Mul => binary::I64_MUL,
            Self::I64DivS => binary::I64_DIV_S,
            Self::I64DivU => binary::I64_DIV_U,
            Self::I64RemS => binary::I64_REM_S,
            Self::I64RemU => binary::I64_REM_U,
            Self::I64And => binary::I64_AND,
            Self::I64Or => binary::I64_OR,
            Self::I64Xor => binary::I64_XOR,
            Self::I64Shl => binary::I64_SHL,
            Self::I64ShrS => binary::I64_SHR_S,
            Self::I64ShrU => binary::I64_SHR_U,
            Self::I64Rotl => binary::I64_ROTL,
            Self::I64Rotr => binary::I64_ROTR,
            Self::F32Abs => binary::F32_ABS,
            Self::F32Neg => binary::F32_NEG,
            Self::F32Ceil => binary::F32_CEIL,
            Self::F32Floor => binary::F32_FLOOR,
            Self::F32Trunc => binary::F32_TRUNC,
            Self::F32Nearest => binary::F32_NEAREST,
            Self::F32Sqrt => binary::F32_SQRT,
            Self::F32Add => binary::F32_ADD,
            Self::F32Sub => binary::F32_SUB,
            Self::F32Mul => binary::F32_MUL,
            Self::F32Div => binary::F32_DIV,
            Self::F32Min => binary::F32_MIN,
            Self::F32Max => binary::F32_MAX,
            Self::F32Copysign => binary::F32_COPYSIGN,
            Self::F64Abs => binary::F64_ABS,
            Self::F64Neg => binary::F64_NEG,
            Self::F64Ceil => binary::F64_CEIL,
            Self::F64Floor => binary::F64_FLOOR,
            Self::F64Trunc => binary::F64_TRUNC,
            Self::F64Nearest => binary::F64_NEAREST,
            Self::F64Sqrt => binary::F64_SQRT,
            Self::F64Add => binary::F64_ADD,
            Self::F64Sub => binary::F64_SUB,
            Self::F64Mul => binary::F64_MUL,
            Self::F64Div => binary::F64_DIV,
            Self::F64Min => binary::F64_MIN,
            Self::F64Max => binary::F64_MAX,
            Self::F64Copysign => binary::F64_COPYSIGN,
        }
    }

    /// The shared operand/result type.
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self.opcode() {
            binary::I32_CLZ..=binary::I32_ROTR => ValueType::I32,
            binary::I64_CLZ..=binary::I64_ROTR => ValueType::I64,
            binary::F32_ABS..=binary::F32_COPYSIGN => ValueType::F32,
            _ => ValueType::F64,
        }
    }

    /// Whether the operation takes one operand rather than two.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(
            self,
            Self::I32Clz
                | Self::I32Ctz
                | Self::I32Popcnt
                | Self::I64Clz
                | Self::I64Ctz
                | Self::I64Popcnt
                | Self::F32Abs
                | Self::F32Neg
                | Self::F32Ceil
                | Self::F32Floor
                | Self::F32Trunc
                | Self::F32Nearest
                | Self::F32Sqrt
                | Self::F64Abs
                | Self::F64Neg
                | Self::F64Ceil
                | Self::F64Floor
                | Self::F64Trunc
                | Self::F64Nearest
                | Self::F64Sqrt
        )
    }
}

/// Conversion instructions between the four numeric types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ConversionOp {
    I32WrapI64,
    I32TruncF32S,
    I32TruncF32U,
    I32TruncF64S,
    I32TruncF64U,
    I64ExtendI32S,
    I64ExtendI32U,
    I64TruncF32S,
    I64TruncF32U,
    I64TruncF64S,
    I64TruncF64U,
    F32ConvertI32S,
    F32ConvertI32U,
    F32ConvertI64S,
    F32ConvertI64U,
    F32DemoteF64,
    F64ConvertI32S,
    F64ConvertI32U,
    F64ConvertI64S,
    F64ConvertI64U,
    F64PromoteF32,
    I32ReinterpretF32,
    I64ReinterpretF64,
    F32ReinterpretI32,
    F64ReinterpretI64,
}

impl ConversionOp {
    /// The opcode byte.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::I32WrapI64 => binary::I32_WRAP_I64,
            Self::I32TruncF32S => binary::I32_TRUNC_F32_S,
            Self::I32TruncF32U => binary::I32_TRUNC_F32_U,
            Self::I32TruncF64S => binary::I32_TRUNC_F64_S,
            Self::I32TruncF64U => binary::I32_TRUNC_F64_U,
            Self::I64ExtendI32S => binary::I64_EXTEND_I32_S,
            Self::I64ExtendI32U => binary::I64_EXTEND_I32_U,
            Self::I64TruncF32S => binary::I64_TRUNC_F32_S,
            Self::I64TruncF32U => binary::I64_TRUNC_F32_U,
            Self::I64TruncF64S => binary::I64_TRUNC_F64_S,
            Self::I64TruncF64U => binary::I64_TRUNC_F64_U,
            Self::F32ConvertI32S => binary::F32_CONVERT_I32_S,
            Self::F32ConvertI32U => binary::F32_CONVERT_I32_U,
            Self::F32ConvertI64S => binary::F32_CONVERT_I64_S,
            Self::F32ConvertI64U => binary::F32_CONVERT_I64_U,
            Self::F32DemoteF64 => binary::F32_DEMOTE_F64,
            Self::F64ConvertI32S => binary::F64_CONVERT_I32_S,
            Self::F64ConvertI32U => binary::F64_CONVERT_I32_U,
            Self::F64ConvertI64S => binary::F64_CONVERT_I64_S,
            Self::F64ConvertI64U => binary::F64_CONVERT_I64_U,
            Self::F64PromoteF32 => binary::F64_PROMOTE_F32,
            Self::I32ReinterpretF32 => binary::I32_REINTERPRET_F32,
            Self::I64ReinterpretF64 => binary::I64_REINTERPRET_F64,
            Self::F32ReinterpretI32 => binary::F32_REINTERPRET_I32,
            Self::F64ReinterpretI64 => binary::F64_REINTERPRET_I64,
        }
    }

    /// Type consumed from the stack.
    #[must_use]
    pub const fn operand_type(self) -> ValueType {
        match self {
            Self::I64ExtendI32S
            | Self::I64ExtendI32U
            | Self::F32ConvertI32S
            | Self::F32ConvertI32U
            | Self::F64ConvertI32S
            | Self::F64ConvertI32U
            | Self::F32ReinterpretI32 => ValueType::I32,
            Self::I32WrapI64
            | Self::F32ConvertI64S
            | Self::F32ConvertI64U
            | Self::F64ConvertI64S
            | Self::F64ConvertI64U
            | Self::F64ReinterpretI64 => ValueType::I64,
            Self::I32TruncF32S
            | Self::I32TruncF32U
            | Self::I64TruncF32S
            | Self::I64TruncF32U
            | Self::F64PromoteF32
            | Self::I32ReinterpretF32 => ValueType::F32,
            Self::I32TruncF64S
            | Self::I32TruncF64U
            | Self::I64TruncF64S
            | Self::I64TruncF64U
            | Self::F32DemoteF64
            | Self::I64ReinterpretF64 => ValueType::F64,
        }
    }

    /// Type pushed to the stack.
    #[must_use]
    pub const fn result_type(self) -> ValueType {
        match self {
            Self::I32WrapI64
            | Self::I32TruncF32S
            | Self::I32TruncF32U
            | Self::I32TruncF64S
            | Self::I32TruncF64U
            | Self::I32ReinterpretF32 => ValueType::I32,
            Self::I64ExtendI32S
            | Self::I64ExtendI32U
            | Self::I64TruncF32S
            | Self::I64TruncF32U
            | Self::I64TruncF64S
            | Self::I64TruncF64U
            | Self::I64ReinterpretF64 => ValueType::I64,
            Self::F32ConvertI32S
            | Self::F32ConvertI32U
            | Self::F32ConvertI64S
            | Self::F32ConvertI64U
            | Self::F32DemoteF64
            | Self::F32ReinterpretI32 => ValueType::F32,
            Self::F64ConvertI32S
            | Self::F64ConvertI32U
            | Self::F64ConvertI64S
            | Self::F64ConvertI64U
            | Self::F64PromoteF32
            | Self::F64ReinterpretI64 => ValueType::F64,
        }
    }
}

/// A single decoded instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `unreachable`: trap immediately.
    Unreachable,
    /// `nop`
    Nop,
    /// `block`: structured block with a result type.
    Block {
        /// Result type of the block.
        block_type: BlockType,
        /// Nested body.
        body: Expr,
    },
    /// `loop`: like a block, but branches target the start.
    Loop {
        /// Result type of the loop.
        block_type: BlockType,
        /// Nested body.
        body: Expr,
    },
    /// `if`/`else`.
    If {
        /// Result type of both arms.
        block_type: BlockType,
        /// Taken when the condition is non-zero.
        then_body: Expr,
        /// Taken otherwise; may be empty.
        else_body: Expr,
    },
    /// `br`: unconditional branch to a label.
    Br(u32),
    /// `br_if`: conditional branch to a label.
    BrIf(u32),
    /// `br_table`: indexed branch.
    BrTable {
        /// Branch targets selected by the operand.
        targets: Vec<u32>,
        /// Target when the operand is out of range.
        default: u32,
    },
    /// `return`
    Return,
    /// `call`: direct call by function index.
    Call(u32),
    /// `call_indirect`: call through table 0 with a declared type.
    CallIndirect {
        /// Index of the expected function type.
        type_index: u32,
    },
    /// `drop`
    Drop,
    /// `select`
    Select,
    /// `local.get`
    LocalGet(u32),
    /// `local.set`
    LocalSet(u32),
    /// `local.tee`
    LocalTee(u32),
    /// `global.get`
    GlobalGet(u32),
    /// `global.set`
    GlobalSet(u32),
    /// A memory load.
    Load(LoadOp, MemArg),
    /// A memory store.
    Store(StoreOp, MemArg),
    /// `memory.size`
    MemorySize,
    /// `memory.grow`
    MemoryGrow,
    /// `i32.const`
    I32Const(i32),
    /// `i64.const`
    I64Const(i64),
    /// `f32.const`
    F32Const(FloatBits32),
    /// `f64.const`
    F64Const(FloatBits64),
    /// A comparison.
    Comparison(ComparisonOp),
    /// An arithmetic or bit operation.
    Arithmetic(ArithmeticOp),
    /// A numeric conversion.
    Conversion(ConversionOp),
}

impl Instruction {
    /// The opcode byte this instruction decodes from and encodes to.
    #[must_use]
    pub fn opcode(&self) -> u8 {
        match self {
            Self::Unreachable => binary::UNREACHABLE,
            Self::Nop => binary::NOP,
            Self::Block { .. } => binary::BLOCK,
            Self::Loop { .. } => binary::LOOP,
            Self::If { .. } => binary::IF,
            Self::Br(_) => binary::BR,
            Self::BrIf(_) => binary::BR_IF,
            Self::BrTable { .. } => binary::BR_TABLE,
            Self::Return => binary::RETURN,
            Self::Call(_) => binary::CALL,
            Self::CallIndirect { .. } => binary::CALL_INDIRECT,
            Self::Drop => binary::DROP,
            Self::Select => binary::SELECT,
            Self::LocalGet(_) => binary::LOCAL_GET,
            Self::LocalSet(_) => binary::LOCAL_SET,
            Self::LocalTee(_) => binary::LOCAL_TEE,
            Self::GlobalGet(_) => binary::GLOBAL_GET,
            Self::GlobalSet(_) => binary::GLOBAL_SET,
            Self::Load(op, _) => op.opcode(),
            Self::Store(op, _) => op.opcode(),
            Self::MemorySize => binary::MEMORY_SIZE,
            Self::MemoryGrow => binary::MEMORY_GROW,
            Self::I32Const(_) => binary::I32_CONST,
            Self::I64Const(_) => binary::I64_CONST,
            Self::F32Const(_) => binary::F32_CONST,
            Self::F64Const(_) => binary::F64_CONST,
            Self::Comparison(op) => op.opcode(),
            Self::Arithmetic(op) => op.opcode(),
            Self::Conversion(op) => op.opcode(),
        }
    }

    /// Serialise this instruction, including nested bodies and their
    /// terminating `end` bytes.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode());
        match self {
            Self::Block { block_type, body } | Self::Loop { block_type, body } => {
                out.push(block_type.to_byte());
                encode_expr(body, out);
                out.push(binary::END);
            }
            Self::If { block_type, then_body, else_body } => {
                out.push(block_type.to_byte());
                encode_expr(then_body, out);
                if !else_body.is_empty() {
                    out.push(binary::ELSE);
                    encode_expr(else_body, out);
                }
                out.push(binary::END);
            }
            Self::Br(label) | Self::BrIf(label) => {
                out.extend(binary::write_leb128_u32(*label));
            }
            Self::BrTable { targets, default } => {
                out.extend(binary::write_vector(targets, |t| binary::write_leb128_u32(*t)));
                out.extend(binary::write_leb128_u32(*default));
            }
            Self::Call(index) => {
                out.extend(binary::write_leb128_u32(*index));
            }
            Self::CallIndirect { type_index } => {
                out.extend(binary::write_leb128_u32(*type_index));
                // Reserved table index, zero in MVP.
                out.push(0x00);
            }
            Self::LocalGet(index)
            | Self::LocalSet(index)
            | Self::LocalTee(index)
            | Self::GlobalGet(index)
            | Self::GlobalSet(index) => {
                out.extend(binary::write_leb128_u32(*index));
            }
            Self::Load(_, memarg) | Self::Store(_, memarg) => {
                out.extend(binary::write_leb128_u32(memarg.align));
                out.extend(binary::write_leb128_u32(memarg.offset));
            }
            Self::MemorySize | Self::MemoryGrow => {
                // Reserved memory index, zero in MVP.
                out.push(0x00);
            }
            Self::I32Const(v) => {
                out.extend(binary::write_leb128_s32(*v));
            }
            Self::I64Const(v) => {
                out.extend(binary::write_leb128_s64(*v));
            }
            Self::F32Const(v) => {
                out.extend_from_slice(&v.to_bits().to_le_bytes());
            }
            Self::F64Const(v) => {
                out.extend_from_slice(&v.to_bits().to_le_bytes());
            }
            _ => {}
        }
    }
}

/// Serialise an expression without its terminating `end` byte.
pub fn encode_expr(expr: &Expr, out: &mut Vec<u8>) {
    for instr in expr {
        instr.encode(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_mapping_is_consistent() {
        assert_eq!(Instruction::Unreachable.opcode(), 0x00);
        assert_eq!(Instruction::Arithmetic(ArithmeticOp::I32Add).opcode(), 0x6A);
        assert_eq!(Instruction::Comparison(ComparisonOp::F64Ge).opcode(), 0x66);
        assert_eq!(Instruction::Conversion(ConversionOp::F64ReinterpretI64).opcode(), 0xBF);
        assert_eq!(LoadOp::I64Load32U.opcode(), 0x35);
        assert_eq!(StoreOp::I64Store32.opcode(), 0x3E);
    }

    #[test]
    fn test_encode_nested_block() {
        let instr = Instruction::Block {
            block_type: BlockType::Empty,
            body: alloc::vec![Instruction::Nop],
        };
        let mut out = Vec::new();
        instr.encode(&mut out);
        assert_eq!(out, alloc::vec![0x02, 0x40, 0x01, 0x0B]);
    }

    #[test]
    fn test_encode_if_without_else_omits_else_byte() {
        let instr = Instruction::If {
            block_type: BlockType::Empty,
            then_body: alloc::vec![Instruction::Nop],
            else_body: Vec::new(),
        };
        let mut out = Vec::new();
        instr.encode(&mut out);
        assert!(!out.contains(&binary::ELSE));
        assert_eq!(*out.last().unwrap(), binary::END);
    }

    #[test]
    fn test_arithmetic_value_types() {
        assert_eq!(ArithmeticOp::I32Rotr.value_type(), ValueType::I32);
        assert_eq!(ArithmeticOp::I64Clz.value_type(), ValueType::I64);
        assert_eq!(ArithmeticOp::F32Copysign.value_type(), ValueType::F32);
        assert_eq!(ArithmeticOp::F64Sqrt.value_type(), ValueType::F64);
        assert!(ArithmeticOp::F64Sqrt.is_unary());
        assert!(!ArithmeticOp::F64Add.is_unary());
    }
}
