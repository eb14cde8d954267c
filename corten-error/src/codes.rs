//! Flat error code table.
//!
//! Codes are grouped by concern: loading 1xxx, validation 2xxx,
//! linking/instantiation 3xxx, execution traps 4xxx, engine misuse 5xxx.
//! The numeric values are stable; embedders may match on them.

// Loading error codes (1000-1999)
/// File path does not exist or cannot be opened
pub const INVALID_PATH: u16 = 1000;
/// I/O failure while reading module bytes
pub const READ_ERROR: u16 = 1001;
/// Unexpected end of input mid-read
pub const UNEXPECTED_END: u16 = 1002;
/// Magic header is not `\0asm`
pub const INVALID_MAGIC: u16 = 1003;
/// Binary version field is not the MVP version (or a compiled-module
/// container was produced by a different runtime version)
pub const INVALID_VERSION: u16 = 1004;
/// Malformed module grammar
pub const INVALID_GRAMMAR: u16 = 1005;
/// Non-custom section out of canonical order
pub const INVALID_SECTION_ORDER: u16 = 1006;
/// Non-custom section appears twice
pub const DUPLICATE_SECTION: u16 = 1007;
/// Declared section size does not match consumed bytes
pub const SECTION_SIZE_MISMATCH: u16 = 1008;
/// Unknown or unsupported opcode byte
pub const INVALID_OPCODE: u16 = 1009;
/// LEB128 encoding uses more bytes than its bit width permits
pub const INTEGER_TOO_LONG: u16 = 1010;
/// LEB128 final byte sets bits beyond the target bit width
pub const INTEGER_TOO_LARGE: u16 = 1011;
/// Name payload is not valid UTF-8
pub const INVALID_UTF8: u16 = 1012;

// Validation error codes (2000-2999)
/// Operand stack type does not match the instruction signature
pub const TYPE_MISMATCH: u16 = 2000;
/// Function index out of range
pub const INVALID_FUNC_INDEX: u16 = 2001;
/// Table index out of range
pub const INVALID_TABLE_INDEX: u16 = 2002;
/// Memory index out of range
pub const INVALID_MEMORY_INDEX: u16 = 2003;
/// Global index out of range
pub const INVALID_GLOBAL_INDEX: u16 = 2004;
/// Local index out of range
pub const INVALID_LOCAL_INDEX: u16 = 2005;
/// Branch label index out of range
pub const INVALID_LABEL_INDEX: u16 = 2006;
/// Type index out of range
pub const INVALID_TYPE_INDEX: u16 = 2007;
/// More than one memory defined or imported
pub const MULTIPLE_MEMORIES: u16 = 2008;
/// More than one table defined or imported
pub const MULTIPLE_TABLES: u16 = 2009;
/// Write to an immutable global
pub const INVALID_MUTATION: u16 = 2010;
/// Initializer is not a permitted constant expression
pub const INVALID_CONST_EXPR: u16 = 2011;
/// Limits are malformed (min > max, or past the hard ceiling)
pub const INVALID_LIMITS: u16 = 2012;
/// Function type declares more than one result
pub const INVALID_RESULT_ARITY: u16 = 2013;
/// Start function has a non-empty signature
pub const INVALID_START_FUNCTION: u16 = 2014;
/// Alignment hint exceeds the natural alignment of the access
pub const INVALID_ALIGNMENT: u16 = 2015;

// Linking and instantiation error codes (3000-3999)
/// Imported module or export name not found in the store
pub const UNKNOWN_IMPORT: u16 = 3000;
/// Import resolved, but kind or type does not match
pub const INCOMPATIBLE_IMPORT_TYPE: u16 = 3001;
/// A module with the same name is already registered
pub const MODULE_NAME_CONFLICT: u16 = 3002;
/// Element or data segment falls outside its table or memory
pub const SEGMENT_OUT_OF_BOUNDS: u16 = 3003;
/// Named module not present in the store
pub const MODULE_NOT_FOUND: u16 = 3004;
/// Named export not present in the module instance
pub const EXPORT_NOT_FOUND: u16 = 3005;

// Execution trap codes (4000-4999)
/// The `unreachable` instruction was executed
pub const UNREACHABLE: u16 = 4000;
/// Integer division or remainder by zero
pub const DIVISION_BY_ZERO: u16 = 4001;
/// Signed overflow on division (INT_MIN / -1)
pub const INTEGER_OVERFLOW: u16 = 4002;
/// Float-to-integer truncation of NaN or an out-of-range value
pub const INVALID_CONVERSION_TO_INTEGER: u16 = 4003;
/// Linear memory access outside the current memory size
pub const MEMORY_OUT_OF_BOUNDS: u16 = 4004;
/// Table access outside the current table size
pub const TABLE_OUT_OF_BOUNDS: u16 = 4005;
/// Indirect call target signature does not match the declared type
pub const INDIRECT_CALL_TYPE_MISMATCH: u16 = 4006;
/// Indirect call through a null table element
pub const UNINITIALIZED_ELEMENT: u16 = 4007;
/// Call depth exceeded the configured limit
pub const CALL_STACK_EXHAUSTED: u16 = 4008;

// Engine misuse error codes (5000-5999)
/// Address does not resolve to an instance in the store
pub const WRONG_INSTANCE_ADDRESS: u16 = 5000;
/// Invocation arguments do not match the function signature
pub const FUNC_SIG_MISMATCH: u16 = 5001;
/// Internal engine invariant: operand stack underflow
pub const STACK_UNDERFLOW: u16 = 5002;
/// Invoked an operation that needs an instantiated active module
pub const NOT_INSTANTIATED: u16 = 5003;
