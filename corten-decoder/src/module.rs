//! Module decoding: header check, section walk, and per-section payload
//! parsing.
//!
//! Sections are parsed in appearance order. Non-custom sections must
//! appear at most once and in canonical id order; each section's
//! declared byte size must match exactly what its payload consumes.
//! Custom sections are consumed verbatim and recorded with enough
//! position information to re-emit them in place.

use crate::instructions::decode_expr;
use crate::prelude::{
    binary, codes, ByteReader, CustomSection, DataSegment, ElemType, ElementSegment, Error,
    Export, ExternalKind, FuncBody, FuncType, Global, GlobalType, Import, ImportDesc, Limits,
    MemoryType, Module, Result, TableType, ValueType, Vec,
};

const SIZE_MISMATCH: Error = Error::parse(
    codes::SECTION_SIZE_MISMATCH,
    "section size does not match content",
);

/// Decode a module from its binary encoding.
pub fn decode_module(bytes: &[u8]) -> Result<Module> {
    let mut reader = ByteReader::new(bytes);

    if reader.read_bytes(4)? != binary::WASM_MAGIC {
        return Err(Error::parse(codes::INVALID_MAGIC, "magic header is not \\0asm"));
    }
    if reader.read_bytes(4)? != binary::WASM_VERSION {
        return Err(Error::parse(codes::INVALID_VERSION, "unsupported binary version"));
    }

    let mut module = Module::new();
    let mut last_section = binary::CUSTOM_SECTION_ID;

    while reader.has_more() {
        let id = reader.read_u8()?;
        let size = reader.read_u32_leb()? as usize;
        let content = reader.read_bytes(size)?;
        let mut section = ByteReader::new(content);

        if id == binary::CUSTOM_SECTION_ID {
            let name = section.read_name()?;
            let data = Vec::from(section.read_bytes(content.len() - section.tell())?);
            log::debug!("preserving custom section {name:?} ({} bytes)", data.len());
            module.customs.push(CustomSection { name, data, placed_after: last_section });
            continue;
        }

        if id > binary::MAX_SECTION_ID {
            return Err(Error::parse(codes::INVALID_GRAMMAR, "unknown section id"));
        }
        if id == last_section {
            return Err(Error::parse(codes::DUPLICATE_SECTION, "section appears twice"));
        }
        if id < last_section {
            return Err(Error::parse(
                codes::INVALID_SECTION_ORDER,
                "section out of canonical order",
            ));
        }
        last_section = id;

        let parsed = parse_section(&mut section, id, &mut module);
        match parsed {
            Ok(()) => {
                if section.has_more() {
                    return Err(SIZE_MISMATCH);
                }
            }
            // The payload asked for more bytes than the declared size.
            Err(err) if err == Error::unexpected_end() => return Err(SIZE_MISMATCH),
            Err(err) => return Err(err),
        }
    }

    if module.functions.len() != module.code.len() {
        return Err(Error::parse(
            codes::INVALID_GRAMMAR,
            "function and code section lengths differ",
        ));
    }
    Ok(module)
}

fn parse_section(section: &mut ByteReader<'_>, id: u8, module: &mut Module) -> Result<()> {
    match id {
        binary::TYPE_SECTION_ID => parse_type_section(section, module),
        binary::IMPORT_SECTION_ID => parse_import_section(section, module),
        binary::FUNCTION_SECTION_ID => parse_function_section(section, module),
        binary::TABLE_SECTION_ID => parse_table_section(section, module),
        binary::MEMORY_SECTION_ID => parse_memory_section(section, module),
        binary::GLOBAL_SECTION_ID => parse_global_section(section, module),
        binary::EXPORT_SECTION_ID => parse_export_section(section, module),
        binary::START_SECTION_ID => {
            module.start = Some(section.read_u32_leb()?);
            Ok(())
        }
        binary::ELEMENT_SECTION_ID => parse_element_section(section, module),
        binary::CODE_SECTION_ID => parse_code_section(section, module),
        binary::DATA_SECTION_ID => parse_data_section(section, module),
        _ => Err(Error::parse(codes::INVALID_GRAMMAR, "unknown section id")),
    }
}

fn parse_type_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        if section.read_u8()? != binary::FUNC_TYPE {
            return Err(Error::parse(codes::INVALID_GRAMMAR, "expected function type tag"));
        }
        let params = parse_value_types(section)?;
        let results = parse_value_types(section)?;
        module.types.push(FuncType::new(params, results));
    }
    Ok(())
}

fn parse_value_types(section: &mut ByteReader<'_>) -> Result<Vec<ValueType>> {
    let count = section.read_u32_leb()?;
    let mut types = Vec::new();
    for _ in 0..count {
        types.push(ValueType::from_byte(section.read_u8()?)?);
    }
    Ok(types)
}

fn parse_limits(section: &mut ByteReader<'_>) -> Result<Limits> {
    let flag = section.read_u8()?;
    let min = section.read_u32_leb()?;
    let max = match flag {
        0x00 => None,
        0x01 => Some(section.read_u32_leb()?),
        _ => return Err(Error::parse(codes::INVALID_GRAMMAR, "unknown limits flag")),
    };
    Ok(Limits { min, max })
}

fn parse_table_type(section: &mut ByteReader<'_>) -> Result<TableType> {
    let element = ElemType::from_byte(section.read_u8()?)?;
    let limits = parse_limits(section)?;
    Ok(TableType { element, limits })
}

fn parse_global_type(section: &mut ByteReader<'_>) -> Result<GlobalType> {
    let value_type = ValueType::from_byte(section.read_u8()?)?;
    let mutable = match section.read_u8()? {
        0x00 => false,
        0x01 => true,
        _ => return Err(Error::parse(codes::INVALID_GRAMMAR, "unknown mutability flag")),
    };
    Ok(GlobalType { value_type, mutable })
}

fn parse_import_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        let module_name = section.read_name()?;
        let name = section.read_name()?;
        let desc = match ExternalKind::from_byte(section.read_u8()?)? {
            ExternalKind::Func => ImportDesc::Func(section.read_u32_leb()?),
            ExternalKind::Table => ImportDesc::Table(parse_table_type(section)?),
            ExternalKind::Memory => ImportDesc::Memory(MemoryType { limits: parse_limits(section)? }),
            ExternalKind::Global => ImportDesc::Global(parse_global_type(section)?),
        };
        module.imports.push(Import { module: module_name, name, desc });
    }
    Ok(())
}

fn parse_function_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        module.functions.push(section.read_u32_leb()?);
    }
    Ok(())
}

fn parse_table_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        module.tables.push(parse_table_type(section)?);
    }
    Ok(())
}

fn parse_memory_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        module.memories.push(MemoryType { limits: parse_limits(section)? });
    }
    Ok(())
}

fn parse_global_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        let ty = parse_global_type(section)?;
        let init = decode_expr(section)?;
        module.globals.push(Global { ty, init });
    }
    Ok(())
}

fn parse_export_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        let name = section.read_name()?;
        let kind = ExternalKind::from_byte(section.read_u8()?)?;
        let index = section.read_u32_leb()?;
        module.exports.push(Export { name, kind, index });
    }
    Ok(())
}

fn parse_element_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        let table_index = section.read_u32_leb()?;
        let offset = decode_expr(section)?;
        let fn_count = section.read_u32_leb()?;
        let mut functions = Vec::new();
        for _ in 0..fn_count {
            functions.push(section.read_u32_leb()?);
        }
        module.elements.push(ElementSegment { table_index, offset, functions });
    }
    Ok(())
}

fn parse_code_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        let body_size = section.read_u32_leb()? as usize;
        let body_bytes = section.read_bytes(body_size)?;
        let mut body_reader = ByteReader::new(body_bytes);

        let run_count = body_reader.read_u32_leb()?;
        let mut locals = Vec::new();
        for _ in 0..run_count {
            let repeat = body_reader.read_u32_leb()?;
            let ty = ValueType::from_byte(body_reader.read_u8()?)?;
            locals.push((repeat, ty));
        }
        let body = decode_expr(&mut body_reader)?;
        if body_reader.has_more() {
            return Err(SIZE_MISMATCH);
        }
        module.code.push(FuncBody { locals, body });
    }
    Ok(())
}

fn parse_data_section(section: &mut ByteReader<'_>, module: &mut Module) -> Result<()> {
    let count = section.read_u32_leb()?;
    for _ in 0..count {
        let memory_index = section.read_u32_leb()?;
        let offset = decode_expr(section)?;
        let len = section.read_u32_leb()? as usize;
        let bytes = Vec::from(section.read_bytes(len)?);
        module.data.push(DataSegment { memory_index, offset, bytes });
    }
    Ok(())
}
