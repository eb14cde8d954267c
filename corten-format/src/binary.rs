//! WebAssembly binary format constants and low-level writers.
//!
//! The opcode table mirrors the MVP instruction set byte-for-byte; the
//! decoder and the execution dispatch are both driven from it. The
//! `write_*` helpers are the primitives the module encoder is built on;
//! they always emit minimal LEB128 encodings.

use alloc::{vec, vec::Vec};

/// Magic bytes for WebAssembly modules: `\0asm`.
pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];

/// WebAssembly binary format version (1, little-endian).
pub const WASM_VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// WebAssembly section IDs.
pub const CUSTOM_SECTION_ID: u8 = 0x00;
/// Type section id.
pub const TYPE_SECTION_ID: u8 = 0x01;
/// Import section id.
pub const IMPORT_SECTION_ID: u8 = 0x02;
/// Function section id.
pub const FUNCTION_SECTION_ID: u8 = 0x03;
/// Table section id.
pub const TABLE_SECTION_ID: u8 = 0x04;
/// Memory section id.
pub const MEMORY_SECTION_ID: u8 = 0x05;
/// Global section id.
pub const GLOBAL_SECTION_ID: u8 = 0x06;
/// Export section id.
pub const EXPORT_SECTION_ID: u8 = 0x07;
/// Start section id.
pub const START_SECTION_ID: u8 = 0x08;
/// Element section id.
pub const ELEMENT_SECTION_ID: u8 = 0x09;
/// Code section id.
pub const CODE_SECTION_ID: u8 = 0x0A;
/// Data section id.
pub const DATA_SECTION_ID: u8 = 0x0B;
/// Largest section id recognised by the MVP grammar.
pub const MAX_SECTION_ID: u8 = DATA_SECTION_ID;

/// WebAssembly value type bytes.
pub const I32_TYPE: u8 = 0x7F;
/// i64 type byte.
pub const I64_TYPE: u8 = 0x7E;
/// f32 type byte.
pub const F32_TYPE: u8 = 0x7D;
/// f64 type byte.
pub const F64_TYPE: u8 = 0x7C;
/// funcref element type byte.
pub const FUNCREF_TYPE: u8 = 0x70;
/// Function type constructor byte.
pub const FUNC_TYPE: u8 = 0x60;
/// Empty block result type byte.
pub const EMPTY_BLOCK_TYPE: u8 = 0x40;

// Control instructions
/// `unreachable`
pub const UNREACHABLE: u8 = 0x00;
/// `nop`
pub const NOP: u8 = 0x01;
/// `block`
pub const BLOCK: u8 = 0x02;
/// `loop`
pub const LOOP: u8 = 0x03;
/// `if`
pub const IF: u8 = 0x04;
/// `else`
pub const ELSE: u8 = 0x05;
/// `end`
pub const END: u8 = 0x0B;
/// `br`
pub const BR: u8 = 0x0C;
/// `br_if`
pub const BR_IF: u8 = 0x0D;
/// `br_table`
pub const BR_TABLE: u8 = 0x0E;
/// `return`
pub const RETURN: u8 = 0x0F;
/// `call`
pub const CALL: u8 = 0x10;
/// `call_indirect`
pub const CALL_INDIRECT: u8 = 0x11;

// Parametric instructions
/// `drop`
pub const DROP: u8 = 0x1A;
/// `select`
pub const SELECT: u8 = 0x1B;

// Variable instructions
/// `local.get`
pub const LOCAL_GET: u8 = 0x20;
/// `local.set`
pub const LOCAL_SET: u8 = 0x21;
/// `local.tee`
pub const LOCAL_TEE: u8 = 0x22;
/// `global.get`
pub const GLOBAL_GET: u8 = 0x23;
/// `global.set`
pub const GLOBAL_SET: u8 = 0x24;

// Memory instructions
/// `i32.load`
pub const I32_LOAD: u8 = 0x28;
/// `i64.load`
pub const I64_LOAD: u8 = 0x29;
/// `f32.load`
pub const F32_LOAD: u8 = 0x2A;
/// `f64.load`
pub const F64_LOAD: u8 = 0x2B;
/// `i32.load8_s`
pub const I32_LOAD8_S: u8 = 0x2C;
/// `i32.load8_u`
pub const I32_LOAD8_U: u8 = 0x2D;
/// `i32.load16_s`
pub const I32_LOAD16_S: u8 = 0x2E;
/// `i32.load16_u`
pub const I32_LOAD16_U: u8 = 0x2F;
/// `i64.load8_s`
pub const I64_LOAD8_S: u8 = 0x30;
/// `i64.load8_u`
pub const I64_LOAD8_U: u8 = 0x31;
/// `i64.load16_s`
pub const I64_LOAD16_S: u8 = 0x32;
/// `i64.load16_u`
pub const I64_LOAD16_U: u8 = 0x33;
/// `i64.load32_s`
pub const I64_LOAD32_S: u8 = 0x34;
/// `i64.load32_u`
pub const I64_LOAD32_U: u8 = 0x35;
/// `i32.store`
pub const I32_STORE: u8 = 0x36;
/// `i64.store`
pub const I64_STORE: u8 = 0x37;
/// `f32.store`
pub const F32_STORE: u8 = 0x38;
/// `f64.store`
pub const F64_STORE: u8 = 0x39;
/// `i32.store8`
pub const I32_STORE8: u8 = 0x3A;
/// `i32.store16`
pub const I32_STORE16: u8 = 0x3B;
/// `i64.store8`
pub const I64_STORE8: u8 = 0x3C;
/// `i64.store16`
pub const I64_STORE16: u8 = 0x3D;
/// `i64.store32`
pub const I64_STORE32: u8 = 0x3E;
/// `memory.size`
pub const MEMORY_SIZE: u8 = 0x3F;
/// `memory.grow`
pub const MEMORY_GROW: u8 = 0x40;

// Constant instructions
/// `i32.const`
pub const I32_CONST: u8 = 0x41;
/// `i64.const`
pub const I64_CONST: u8 = 0x42;
/// `f32.const`
pub const F32_CONST: u8 = 0x43;
/// `f64.const`
pub const F64_CONST: u8 = 0x44;

// Comparison instructions
/// `i32.eqz`
pub const I32_EQZ: u8 = 0x45;
/// `i32.eq`
pub const I32_EQ: u8 = 0x46;
/// `i32.ne`
pub const I32_NE: u8 = 0x47;
/// `i32.lt_s`
pub const I32_LT_S: u8 = 0x48;
/// `i32.lt_u`
pub const I32_LT_U: u8 = 0x49;
/// `i32.gt_s`
pub const I32_GT_S: u8 = 0x4A;
/// `i32.gt_u`
pub const I32_GT_U: u8 = 0x4B;
/// `i32.le_s`
pub const I32_LE_S: u8 = 0x4C;
/// `i32.le_u`
pub const I32_LE_U: u8 = 0x4D;
/// `i32.ge_s`
pub const I32_GE_S: u8 = 0x4E;
/// `i32.ge_u`
pub const I32_GE_U: u8 = 0x4F;
/// `i64.eqz`
pub const I64_EQZ: u8 = 0x50;
/// `i64.eq`
pub const I64_EQ: u8 = 0x51;
/// `i64.ne`
pub const I64_NE: u8 = 0x52;
/// `i64.lt_s`
pub const I64_LT_S: u8 = 0x53;
/// `i64.lt_u`
pub const I64_LT_U: u8 = 0x54;
/// `i64.gt_s`
pub const I64_GT_S: u8 = 0x55;
/// `i64.gt_u`
pub const I64_GT_U: u8 = 0x56;
/// `i64.le_s`
pub const I64_LE_S: u8 = 0x57;
/// `i64.le_u`
pub const I64_LE_U: u8 = 0x58;
/// `i64.ge_s`
pub const I64_GE_S: u8 = 0x59;
/// `i64.ge_u`
pub const I64_GE_U: u8 = 0x5A;
/// `f32.eq`
pub const F32_EQ: u8 = 0x5B;
/// `f32.ne`
pub const F32_NE: u8 = 0x5C;
/// `f32.lt`
pub const F32_LT: u8 = 0x5D;
/// `f32.gt`
pub const F32_GT: u8 = 0x5E;
/// `f32.le`
pub const F32_LE: u8 = 0x5F;
/// `f32.ge`
pub const F32_GE: u8 = 0x60;
/// `f64.eq`
pub const F64_EQ: u8 = 0x61;
/// `f64.ne`
pub const F64_NE: u8 = 0x62;
/// `f64.lt`
pub const F64_LT: u8 = 0x63;
/// `f64.gt`
pub const F64_GT: u8 = 0x64;
/// `f64.le`
pub const F64_LE: u8 = 0x65;
/// `f64.ge`
pub const F64_GE: u8 = 0x66;

// Numeric instructions
/// `i32.clz`
pub const I32_CLZ: u8 = 0x67;
/// `i32.ctz`
pub const I32_CTZ: u8 = 0x68;
/// `i32.popcnt`
pub const I32_POPCNT: u8 = 0x69;
/// `i32.add`
pub const I32_ADD: u8 = 0x6A;
/// `i32.sub`
pub const I32_SUB: u8 = 0x6B;
/// `i32.mul`
pub const I32_MUL: u8 = 0x6C;
/// `i32.div_s`
pub const I32_DIV_S: u8 = 0x6D;
/// `i32.div_u`
pub const I32_DIV_U: u8 = 0x6E;
/// `i32.rem_s`
pub const I32_REM_S: u8 = 0x6F;
/// `i32.rem_u`
pub const I32_REM_U: u8 = 0x70;
/// `i32.and`
pub const I32_AND: u8 = 0x71;
/// `i32.or`
pub const I32_OR: u8 = 0x72;
/// `i32.xor`
pub const I32_XOR: u8 = 0x73;
/// `i32.shl`
pub const I32_SHL: u8 = 0x74;
/// `i32.shr_s`
pub const I32_SHR_S: u8 = 0x75;
/// `i32.shr_u`
pub const I32_SHR_U: u8 = 0x76;
/// `i32.rotl`
pub const I32_ROTL: u8 = 0x77;
/// `i32.rotr`
pub const I32_ROTR: u8 = 0x78;
/// `i64.clz`
pub const I64_CLZ: u8 = 0x79;
/// `i64.ctz`
pub const I64_CTZ: u8 = 0x7A;
/// `i64.popcnt`
pub const I64_POPCNT: u8 = 0x7B;
/// `i64.add`
pub const I64_ADD: u8 = 0x7C;
/// `i64.sub`
pub const I64_SUB: u8 = 0x7D;
/// `i64.mul`
pub const I64_MUL: u8 = 0x7E;
/// `i64.div_s`
pub const I64_DIV_S: u8 = 0x7F;
/// `i64.div_u`
pub const I64_DIV_U: u8 = 0x80;
/// `i64.rem_s`
pub const I64_REM_S: u8 = 0x81;
/// `i64.rem_u`
pub const I64_REM_U: u8 = 0x82;
/// `i64.and`
pub const I64_AND: u8 = 0x83;
/// `i64.or`
pub const I64_OR: u8 = 0x84;
/// `i64.xor`
pub const I64_XOR: u8 = 0x85;
/// `i64.shl`
pub const I64_SHL: u8 = 0x86;
/// `i64.shr_s`
pub const I64_SHR_S: u8 = 0x87;
/// `i64.shr_u`
pub const I64_SHR_U: u8 = 0x88;
/// `i64.rotl`
pub const I64_ROTL: u8 = 0x89;
/// `i64.rotr`
pub const I64_ROTR: u8 = 0x8A;
/// `f32.abs`
pub const F32_ABS: u8 = 0x8B;
/// `f32.neg`
pub const F32_NEG: u8 = 0x8C;
/// `f32.ceil`
pub const F32_CEIL: u8 = 0x8D;
/// `f32.floor`
pub const F32_FLOOR: u8 = 0x8E;
/// `f32.trunc`
pub const F32_TRUNC: u8 = 0x8F;
/// `f32.nearest`
pub const F32_NEAREST: u8 = 0x90;
/// `f32.sqrt`
pub const F32_SQRT: u8 = 0x91;
/// `f32.add`
pub const F32_ADD: u8 = 0x92;
/// `f32.sub`
pub const F32_SUB: u8 = 0x93;
/// `f32.mul`
pub const F32_MUL: u8 = 0x94;
/// `f32.div`
pub const F32_DIV: u8 = 0x95;
/// `f32.min`
pub const F32_MIN: u8 = 0x96;
/// `f32.max`
pub const F32_MAX: u8 = 0x97;
/// `f32.copysign`
pub const F32_COPYSIGN: u8 = 0x98;
/// `f64.abs`
pub const F64_ABS: u8 = 0x99;
/// `f64.neg`
pub const F64_NEG: u8 = 0x9A;
/// `f64.ceil`
pub const F64_CEIL: u8 = 0x9B;
/// `f64.floor`
pub const F64_FLOOR: u8 = 0x9C;
/// `f64.trunc`
pub const F64_TRUNC: u8 = 0x9D;
/// `f64.nearest`
pub const F64_NEAREST: u8 = 0x9E;
/// `f64.sqrt`
pub const F64_SQRT: u8 = 0x9F;
/// `f64.add`
pub const F64_ADD: u8 = 0xA0;
/// `f64.sub`
pub const F64_SUB: u8 = 0xA1;
/// `f64.mul`
pub const F64_MUL: u8 = 0xA2;
/// `f64.div`
pub const F64_DIV: u8 = 0xA3;
/// `f64.min`
pub const F64_MIN: u8 = 0xA4;
/// `f64.max`
pub const F64_MAX: u8 = 0xA5;
/// `f64.copysign`
pub const F64_COPYSIGN: u8 = 0xA6;

// Conversion instructions
/// `i32.wrap_i64`
pub const I32_WRAP_I64: u8 = 0xA7;
/// `i32.trunc_f32_s`
pub const I32_TRUNC_F32_S: u8 = 0xA8;
/// `i32.trunc_f32_u`
pub const I32_TRUNC_F32_U: u8 = 0xA9;
/// `i32.trunc_f64_s`
pub const I32_TRUNC_F64_S: u8 = 0xAA;
/// `i32.trunc_f64_u`
pub const I32_TRUNC_F64_U: u8 = 0xAB;
/// `i64.extend_i32_s`
pub const I64_EXTEND_I32_S: u8 = 0xAC;
/// `i64.extend_i32_u`
pub const I64_EXTEND_I32_U: u8 = 0xAD;
/// `i64.trunc_f32_s`
pub const I64_TRUNC_F32_S: u8 = 0xAE;
/// `i64.trunc_f32_u`
pub const I64_TRUNC_F32_U: u8 = 0xAF;
/// `i64.trunc_f64_s`
pub const I64_TRUNC_F64_S: u8 = 0xB0;
/// `i64.trunc_f64_u`
pub const I64_TRUNC_F64_U: u8 = 0xB1;
/// `f32.convert_i32_s`
pub const F32_CONVERT_I32_S: u8 = 0xB2;
/// `f32.convert_i32_u`
pub const F32_CONVERT_I32_U: u8 = 0xB3;
/// `f32.convert_i64_s`
pub const F32_CONVERT_I64_S: u8 = 0xB4;
/// `f32.convert_i64_u`
pub const F32_CONVERT_I64_U: u8 = 0xB5;
/// `f32.demote_f64`
pub const F32_DEMOTE_F64: u8 = 0xB6;
/// `f64.convert_i32_s`
pub const F64_CONVERT_I32_S: u8 = 0xB7;
/// `f64.convert_i32_u`
pub const F64_CONVERT_I32_U: u8 = 0xB8;
/// `f64.convert_i64_s`
pub const F64_CONVERT_I64_S: u8 = 0xB9;
/// `f64.convert_i64_u`
pub const F64_CONVERT_I64_U: u8 = 0xBA;
/// `f64.promote_f32`
pub const F64_PROMOTE_F32: u8 = 0xBB;
/// `i32.reinterpret_f32`
pub const I32_REINTERPRET_F32: u8 = 0xBC;
/// `i64.reinterpret_f64`
pub const I64_REINTERPRET_F64: u8 = 0xBD;
/// `f32.reinterpret_i32`
pub const F32_REINTERPRET_I32: u8 = 0xBE;
/// `f64.reinterpret_i64`
pub const F64_REINTERPRET_I64: u8 = 0xBF;

/// Write a LEB128 unsigned 32-bit integer (minimal encoding).
#[must_use]
pub fn write_leb128_u32(value: u32) -> Vec<u8> {
    if value == 0 {
        return vec![0];
    }
    let mut result = Vec::new();
    let mut value = value;
    while value != 0 {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        result.push(byte);
    }
    result
}

/// Write a LEB128 unsigned 64-bit integer (minimal encoding).
#[must_use]
pub fn write_leb128_u64(value: u64) -> Vec<u8> {
    if value == 0 {
        return vec![0];
    }
    let mut result = Vec::new();
    let mut value = value;
    while value != 0 {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        result.push(byte);
    }
    result
}

/// Write a LEB128 signed 32-bit integer (minimal encoding).
#[must_use]
pub fn write_leb128_s32(value: i32) -> Vec<u8> {
    write_leb128_s64(i64::from(value))
}

/// Write a LEB128 signed 64-bit integer (minimal encoding).
#[must_use]
pub fn write_leb128_s64(value: i64) -> Vec<u8> {
    let mut result = Vec::new();
    let mut value = value;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        let sign_bit_clear = byte & 0x40 == 0;
        let done = (value == 0 && sign_bit_clear) || (value == -1 && !sign_bit_clear);
        if done {
            result.push(byte);
            return result;
        }
        result.push(byte | 0x80);
    }
}

/// Write a length-prefixed UTF-8 name.
#[must_use]
pub fn write_string(value: &str) -> Vec<u8> {
    let mut result = write_leb128_u32(value.len() as u32);
    result.extend_from_slice(value.as_bytes());
    result
}

/// Write a section header: id byte followed by the content size.
#[must_use]
pub fn write_section_header(id: u8, content_size: u32) -> Vec<u8> {
    let mut result = vec![id];
    result.extend(write_leb128_u32(content_size));
    result
}

/// Write a vector: element count followed by each encoded element.
#[must_use]
pub fn write_vector<T, F>(elements: &[T], mut write_elem: F) -> Vec<u8>
where
    F: FnMut(&T) -> Vec<u8>,
{
    let mut result = write_leb128_u32(elements.len() as u32);
    for elem in elements {
        result.extend(write_elem(elem));
    }
    result
}

/// Whether a buffer starts with the Wasm magic and MVP version.
#[must_use]
pub fn is_valid_wasm_header(bytes: &[u8]) -> bool {
    bytes.len() >= 8 && bytes[0..4] == WASM_MAGIC && bytes[4..8] == WASM_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_leb128_u32_minimal() {
        assert_eq!(write_leb128_u32(0), vec![0x00]);
        assert_eq!(write_leb128_u32(127), vec![0x7F]);
        assert_eq!(write_leb128_u32(128), vec![0x80, 0x01]);
        assert_eq!(write_leb128_u32(624_485), vec![0xE5, 0x8E, 0x26]);
        assert_eq!(write_leb128_u32(u32::MAX), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_write_leb128_s64_sign_handling() {
        assert_eq!(write_leb128_s64(0), vec![0x00]);
        assert_eq!(write_leb128_s64(-1), vec![0x7F]);
        assert_eq!(write_leb128_s64(63), vec![0x3F]);
        assert_eq!(write_leb128_s64(64), vec![0xC0, 0x00]);
        assert_eq!(write_leb128_s64(-64), vec![0x40]);
        assert_eq!(write_leb128_s64(-65), vec![0xBF, 0x7F]);
    }

    #[test]
    fn test_write_string() {
        assert_eq!(write_string("add"), vec![0x03, b'a', b'd', b'd']);
    }

    #[test]
    fn test_header_check() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&WASM_MAGIC);
        bytes.extend_from_slice(&WASM_VERSION);
        assert!(is_valid_wasm_header(&bytes));
        bytes[4] = 0x02;
        assert!(!is_valid_wasm_header(&bytes));
    }
}
