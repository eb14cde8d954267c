//! Decoder integration tests over real assembled modules.

use corten_decoder::{decode_module, validate_module};
use corten_error::codes;
use corten_format::{ExternalKind, ValueType};

fn decode_wat(source: &str) -> corten_format::Module {
    let bytes = wat::parse_str(source).expect("fixture must assemble");
    decode_module(&bytes).expect("fixture must decode")
}

#[test]
fn test_basic_module_decoding() {
    let module = decode_wat(
        r#"
        (module
          (import "env" "log" (func $log (param i32)))
          (memory (export "memory") 1)
          (global (export "counter") (mut i32) (i32.const 42))
          (func (export "add") (param i32 i32) (result i32)
            local.get 0
            local.get 1
            i32.add))
        "#,
    );

    assert_eq!(module.imports.len(), 1);
    assert_eq!(module.imports[0].module, "env");
    assert_eq!(module.imports[0].name, "log");
    assert_eq!(module.memories.len(), 1);
    assert_eq!(module.globals.len(), 1);
    assert_eq!(module.functions.len(), 1);
    assert_eq!(module.code.len(), 1);
    assert_eq!(module.exports.len(), 3);
    assert!(module
        .exports
        .iter()
        .any(|e| e.name == "add" && e.kind == ExternalKind::Func && e.index == 1));

    validate_module(&module).unwrap();
}

#[test]
fn test_empty_module_decoding() {
    let module = decode_wat("(module)");
    assert_eq!(module.types.len(), 0);
    assert_eq!(module.functions.len(), 0);
    validate_module(&module).unwrap();
}

#[test]
fn test_locals_are_run_length_encoded() {
    let module = decode_wat(
        r#"(module (func (local i32 i32) (local i64) (local f32)))"#,
    );
    let body = &module.code[0];
    assert_eq!(
        body.locals,
        vec![(2, ValueType::I32), (1, ValueType::I64), (1, ValueType::F32)]
    );
    assert_eq!(body.local_count(), 4);
}

#[test]
fn test_start_and_element_sections() {
    let module = decode_wat(
        r#"
        (module
          (table 4 funcref)
          (func $a)
          (func $b)
          (elem (i32.const 1) $a $b)
          (start $a))
        "#,
    );
    assert_eq!(module.start, Some(0));
    assert_eq!(module.elements.len(), 1);
    assert_eq!(module.elements[0].functions, vec![0, 1]);
    validate_module(&module).unwrap();
}

#[test]
fn test_truncated_module_is_rejected() {
    let bytes = wat::parse_str(r#"(module (func (export "f")))"#).unwrap();
    let err = decode_module(&bytes[..bytes.len() - 3]).unwrap_err();
    assert!(
        err.code() == codes::UNEXPECTED_END || err.code() == codes::SECTION_SIZE_MISMATCH,
        "unexpected error: {err}"
    );
}

#[test]
fn test_garbage_after_magic_is_rejected() {
    let mut bytes = wat::parse_str("(module)").unwrap();
    bytes.extend_from_slice(&[0xFF, 0x00]); // section id 255, size 0
    assert_eq!(decode_module(&bytes).unwrap_err().code(), codes::INVALID_GRAMMAR);
}

#[cfg(feature = "std")]
mod files {
    use super::*;
    use corten_decoder::read_file;

    #[test]
    fn test_read_file_roundtrip() {
        let bytes = wat::parse_str("(module)").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wasm");
        std::fs::write(&path, &bytes).unwrap();
        assert_eq!(read_file(&path).unwrap(), bytes);
        decode_module(&read_file(&path).unwrap()).unwrap();
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file(std::path::Path::new("no/such/module.wasm")).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_PATH);
    }
}
