//! The module AST: the root of the decoded section tree, plus the
//! binary encoder.
//!
//! A [`Module`] is plain data. The decoder fills it section by section;
//! the validator and the interpreter only ever read it. [`Module::encode`]
//! re-serialises it; for a module decoded by this workspace the output is
//! byte-identical per section (custom sections verbatim), since the
//! decoder enforces canonical section order and the encoder emits minimal
//! LEB128 encodings.

use crate::binary;
use crate::prelude::{
    encode_expr, CustomSection, Expr, ExternalKind, FuncType, GlobalType, Limits, MemoryType,
    String, TableType, ValueType, Vec,
};

/// One import: source module and field names plus a kind descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    /// Name of the exporting module.
    pub module: String,
    /// Name of the export inside that module.
    pub name: String,
    /// What is imported.
    pub desc: ImportDesc,
}

/// Descriptor of an imported entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportDesc {
    /// Function, by type index.
    Func(u32),
    /// Table with its declared type.
    Table(TableType),
    /// Memory with its declared type.
    Memory(MemoryType),
    /// Global with its declared type.
    Global(GlobalType),
}

impl ImportDesc {
    /// The external kind of this import.
    #[must_use]
    pub const fn kind(&self) -> ExternalKind {
        match self {
            Self::Func(_) => ExternalKind::Func,
            Self::Table(_) => ExternalKind::Table,
            Self::Memory(_) => ExternalKind::Memory,
            Self::Global(_) => ExternalKind::Global,
        }
    }
}

/// One export: a name bound to an index of the given kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Export name.
    pub name: String,
    /// Kind of the exported entity.
    pub kind: ExternalKind,
    /// Index into the corresponding index space.
    pub index: u32,
}

/// One defined global: type plus constant initializer expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    /// Declared type.
    pub ty: GlobalType,
    /// Constant initializer.
    pub init: Expr,
}

/// One element segment for table initialisation.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSegment {
    /// Target table index (0 in MVP).
    pub table_index: u32,
    /// Constant offset expression.
    pub offset: Expr,
    /// Function indices written at the offset.
    pub functions: Vec<u32>,
}

/// One data segment for memory initialisation.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSegment {
    /// Target memory index (0 in MVP).
    pub memory_index: u32,
    /// Constant offset expression.
    pub offset: Expr,
    /// Bytes written at the offset.
    pub bytes: Vec<u8>,
}

/// A function body from the code section.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncBody {
    /// Local declarations as (count, type) runs.
    pub locals: Vec<(u32, ValueType)>,
    /// The body expression.
    pub body: Expr,
}

impl FuncBody {
    /// Total number of declared locals (excluding parameters).
    #[must_use]
    pub fn local_count(&self) -> u64 {
        self.locals.iter().map(|(count, _)| u64::from(*count)).sum()
    }
}

/// A decoded WebAssembly module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    /// Function types, indexed by the type section.
    pub types: Vec<FuncType>,
    /// Imports, in declaration order.
    pub imports: Vec<Import>,
    /// Type indices of locally defined functions.
    pub functions: Vec<u32>,
    /// Locally defined tables.
    pub tables: Vec<TableType>,
    /// Locally defined memories.
    pub memories: Vec<MemoryType>,
    /// Locally defined globals.
    pub globals: Vec<Global>,
    /// Exports.
    pub exports: Vec<Export>,
    /// Optional start function index.
    pub start: Option<u32>,
    /// Element segments.
    pub elements: Vec<ElementSegment>,
    /// Function bodies, parallel to `functions`.
    pub code: Vec<FuncBody>,
    /// Data segments.
    pub data: Vec<DataSegment>,
    /// Custom sections, preserved verbatim.
    pub customs: Vec<CustomSection>,
}

impl Module {
    /// Create an empty module.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of imports of a given kind.
    #[must_use]
    pub fn num_imports_of(&self, kind: ExternalKind) -> u32 {
        self.imports.iter().filter(|imp| imp.desc.kind() == kind).count() as u32
    }

    /// Total number of functions (imported + defined).
    #[must_use]
    pub fn num_funcs(&self) -> u32 {
        self.num_imports_of(ExternalKind::Func) + self.functions.len() as u32
    }

    /// Total number of tables (imported + defined).
    #[must_use]
    pub fn num_tables(&self) -> u32 {
        self.num_imports_of(ExternalKind::Table) + self.tables.len() as u32
    }

    /// Total number of memories (imported + defined).
    #[must_use]
    pub fn num_memories(&self) -> u32 {
        self.num_imports_of(ExternalKind::Memory) + self.memories.len() as u32
    }

    /// Total number of globals (imported + defined).
    #[must_use]
    pub fn num_globals(&self) -> u32 {
        self.num_imports_of(ExternalKind::Global) + self.globals.len() as u32
    }

    /// Serialise the module to WebAssembly binary format.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&binary::WASM_MAGIC);
        out.extend_from_slice(&binary::WASM_VERSION);

        self.emit_customs(&mut out, 0);
        for id in binary::TYPE_SECTION_ID..=binary::MAX_SECTION_ID {
            if let Some(content) = self.section_content(id) {
                out.extend(binary::write_section_header(id, content.len() as u32));
                out.extend(content);
            }
            self.emit_customs(&mut out, id);
        }
        out
    }

    fn emit_customs(&self, out: &mut Vec<u8>, placed_after: u8) {
        for custom in self.customs.iter().filter(|c| c.placed_after == placed_after) {
            let mut content = binary::write_string(&custom.name);
            content.extend_from_slice(&custom.data);
            out.extend(binary::write_section_header(
                binary::CUSTOM_SECTION_ID,
                content.len() as u32,
            ));
            out.extend(content);
        }
    }

    /// Encoded content of a non-custom section, or `None` if the section
    /// is absent (empty vectors and a missing start function produce no
    /// section, matching what standard toolchains emit).
    fn section_content(&self, id: u8) -> Option<Vec<u8>> {
        match id {
            binary::TYPE_SECTION_ID if !self.types.is_empty() => {
                Some(binary::write_vector(&self.types, encode_func_type))
            }
            binary::IMPORT_SECTION_ID if !self.imports.is_empty() => {
                Some(binary::write_vector(&self.imports, encode_import))
            }
            binary::FUNCTION_SECTION_ID if !self.functions.is_empty() => {
                Some(binary::write_vector(&self.functions, |idx| {
                    binary::write_leb128_u32(*idx)
                }))
            }
            binary::TABLE_SECTION_ID if !self.tables.is_empty() => {
                Some(binary::write_vector(&self.tables, encode_table_type))
            }
            binary::MEMORY_SECTION_ID if !self.memories.is_empty() => {
                Some(binary::write_vector(&self.memories, |mem| encode_limits(&mem.limits)))
            }
            binary::GLOBAL_SECTION_ID if !self.globals.is_empty() => {
                Some(binary::write_vector(&self.globals, encode_global))
            }
            binary::EXPORT_SECTION_ID if !self.exports.is_empty() => {
                Some(binary::write_vector(&self.exports, encode_export))
            }
            binary::START_SECTION_ID => self.start.map(binary::write_leb128_u32),
            binary::ELEMENT_SECTION_ID if !self.elements.is_empty() => {
                Some(binary::write_vector(&self.elements, encode_element))
            }
            binary::CODE_SECTION_ID if !self.code.is_empty() => {
                Some(binary::write_vector(&self.code, encode_func_body))
            }
            binary::DATA_SECTION_ID if !self.data.is_empty() => {
                Some(binary::write_vector(&self.data, encode_data))
            }
            _ => None,
        }
    }
}

fn encode_func_type(ty: &FuncType) -> Vec<u8> {
    let mut out = alloc::vec![binary::FUNC_TYPE];
    out.extend(binary::write_vector(&ty.params, |p| alloc::vec![p.to_byte()]));
    out.extend(binary::write_vector(&ty.results, |r| alloc::vec![r.to_byte()]));
    out
}

fn encode_limits(limits: &Limits) -> Vec<u8> {
    let mut out = Vec::new();
    match limits.max {
        Some(max) => {
            out.push(0x01);
            out.extend(binary::write_leb128_u32(limits.min));
            out.extend(binary::write_leb128_u32(max));
        }
        None => {
            out.push(0x00);
            out.extend(binary::write_leb128_u32(limits.min));
        }
    }
    out
}

fn encode_table_type(table: &TableType) -> Vec<u8> {
    let mut out = alloc::vec![table.element.to_byte()];
    out.extend(encode_limits(&table.limits));
    out
}

fn encode_global_type(ty: &GlobalType) -> Vec<u8> {
    alloc::vec![ty.value_type.to_byte(), u8::from(ty.mutable)]
}

fn encode_import(import: &Import) -> Vec<u8> {
    let mut out = binary::write_string(&import.module);
    out.extend(binary::write_string(&import.name));
    out.push(import.desc.kind().to_byte());
    match &import.desc {
        ImportDesc::Func(type_index) => out.extend(binary::write_leb128_u32(*type_index)),
        ImportDesc::Table(table) => out.extend(encode_table_type(table)),
        ImportDesc::Memory(mem) => out.extend(encode_limits(&mem.limits)),
        ImportDesc::Global(ty) => out.extend(encode_global_type(ty)),
    }
    out
}

fn encode_export(export: &Export) -> Vec<u8> {
    let mut out = binary::write_string(&export.name);
    out.push(export.kind.to_byte());
    out.extend(binary::write_leb128_u32(export.index));
    out
}

fn encode_terminated_expr(expr: &Expr) -> Vec<u8> {
    let mut out = Vec::new();
    encode_expr(expr, &mut out);
    out.push(binary::END);
    out
}

fn encode_global(global: &Global) -> Vec<u8> {
    let mut out = encode_global_type(&global.ty);
    out.extend(encode_terminated_expr(&global.init));
    out
}

fn encode_element(segment: &ElementSegment) -> Vec<u8> {
    let mut out = binary::write_leb128_u32(segment.table_index);
    out.extend(encode_terminated_expr(&segment.offset));
    out.extend(binary::write_vector(&segment.functions, |f| {
        binary::write_leb128_u32(*f)
    }));
    out
}

fn encode_data(segment: &DataSegment) -> Vec<u8> {
    let mut out = binary::write_leb128_u32(segment.memory_index);
    out.extend(encode_terminated_expr(&segment.offset));
    out.extend(binary::write_leb128_u32(segment.bytes.len() as u32));
    out.extend_from_slice(&segment.bytes);
    out
}

fn encode_func_body(body: &FuncBody) -> Vec<u8> {
    let mut content = binary::write_vector(&body.locals, |(count, ty)| {
        let mut run = binary::write_leb128_u32(*count);
        run.push(ty.to_byte());
        run
    });
    content.extend(encode_terminated_expr(&body.body));
    let mut out = binary::write_leb128_u32(content.len() as u32);
    out.extend(content);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::Instruction;
    use crate::types::FuncType;

    fn add_module() -> Module {
        let mut module = Module::new();
        module.types.push(FuncType::new(
            alloc::vec![ValueType::I32, ValueType::I32],
            alloc::vec![ValueType::I32],
        ));
        module.functions.push(0);
        module.exports.push(Export {
            name: String::from("add"),
            kind: ExternalKind::Func,
            index: 0,
        });
        module.code.push(FuncBody {
            locals: Vec::new(),
            body: alloc::vec![
                Instruction::LocalGet(0),
                Instruction::LocalGet(1),
                Instruction::Arithmetic(crate::instructions::ArithmeticOp::I32Add),
            ],
        });
        module
    }

    #[test]
    fn test_encode_add_module_bytes() {
        // The hand-assembled reference for an exported i32 add function.
        let expected: &[u8] = &[
            0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00, // header
            0x01, 0x07, 0x01, 0x60, 0x02, 0x7F, 0x7F, 0x01, 0x7F, // type
            0x03, 0x02, 0x01, 0x00, // function
            0x07, 0x07, 0x01, 0x03, b'a', b'd', b'd', 0x00, 0x00, // export
            0x0A, 0x09, 0x01, 0x07, 0x00, 0x20, 0x00, 0x20, 0x01, 0x6A, 0x0B, // code
        ];
        assert_eq!(add_module().encode(), expected);
    }

    #[test]
    fn test_custom_sections_keep_position() {
        let mut module = add_module();
        module.customs.push(CustomSection {
            name: String::from("head"),
            data: alloc::vec![1, 2, 3],
            placed_after: 0,
        });
        module.customs.push(CustomSection {
            name: String::from("tail"),
            data: alloc::vec![9],
            placed_after: binary::DATA_SECTION_ID,
        });
        let bytes = module.encode();
        // "head" appears right after the version, "tail" at the end.
        assert_eq!(bytes[8], binary::CUSTOM_SECTION_ID);
        assert_eq!(&bytes[10..15], [0x04, b'h', b'e', b'a', b'd']);
        assert_eq!(bytes[bytes.len() - 1], 9);
    }

    #[test]
    fn test_import_counts() {
        let mut module = Module::new();
        module.imports.push(Import {
            module: String::from("env"),
            name: String::from("print"),
            desc: ImportDesc::Func(0),
        });
        module.functions.push(0);
        assert_eq!(module.num_funcs(), 2);
        assert_eq!(module.num_imports_of(ExternalKind::Func), 1);
        assert_eq!(module.num_memories(), 0);
    }
}
