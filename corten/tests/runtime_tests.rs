//! End-to-end scenarios through the embedding API.

use corten::{codes, FuncType, ImportObject, Loader, Runtime, Store, Value, ValueType};

fn parse(wat_source: &str) -> corten::Module {
    let bytes = wat::parse_str(wat_source).expect("fixture must assemble");
    Loader::new().parse_bytes(&bytes).expect("fixture must decode")
}

#[test]
fn test_add_scenario() {
    let module = parse(
        r#"(module
             (func (export "add") (param i32 i32) (result i32)
               local.get 0
               local.get 1
               i32.add))"#,
    );
    let mut runtime = Runtime::new();
    runtime.instantiate(&module, "calc").unwrap();
    assert_eq!(
        runtime.invoke_export("add", &[Value::I32(2), Value::I32(3)]).unwrap(),
        vec![Value::I32(5)]
    );
    assert_eq!(
        runtime.invoke_export("add", &[Value::I32(-1), Value::I32(1)]).unwrap(),
        vec![Value::I32(0)]
    );
}

#[test]
fn test_memory_bounds_scenario() {
    // One page of memory; reading four bytes at 65533 crosses the end.
    let module = parse(
        r#"(module
             (memory 1)
             (func (export "main") (result i32)
               i32.const 65533
               i32.load))"#,
    );
    let mut runtime = Runtime::new();
    runtime.instantiate(&module, "m").unwrap();
    let err = runtime.invoke_export("main", &[]).unwrap_err();
    assert_eq!(err.code(), codes::MEMORY_OUT_OF_BOUNDS);
    assert!(err.is_trap());
}

#[test]
fn test_import_resolution_and_name_conflict() {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    let printed = Arc::new(AtomicI32::new(0));
    let sink = printed.clone();

    let mut env = ImportObject::new("env");
    env.add_func(
        "print",
        FuncType::new(vec![ValueType::I32], vec![]),
        move |_store: &mut Store, args: &[Value]| {
            sink.store(args[0].as_i32().unwrap(), Ordering::SeqCst);
            Ok(vec![])
        },
    );

    let mut runtime = Runtime::new();
    runtime.register_import_object(&env).unwrap();

    let module = parse(
        r#"(module
             (import "env" "print" (func $print (param i32)))
             (func (export "main")
               i32.const 7
               call $print))"#,
    );
    runtime.instantiate(&module, "app").unwrap();
    runtime.invoke_export("main", &[]).unwrap();
    assert_eq!(printed.load(Ordering::SeqCst), 7);

    // A second module under the name "env" is rejected.
    let other = ImportObject::new("env");
    assert_eq!(
        runtime.register_import_object(&other).unwrap_err().code(),
        codes::MODULE_NAME_CONFLICT
    );
}

#[test]
fn test_unknown_and_incompatible_imports() {
    let mut runtime = Runtime::new();

    let needs_missing = parse(r#"(module (import "nowhere" "f" (func)))"#);
    assert_eq!(
        runtime.instantiate(&needs_missing, "a").unwrap_err().code(),
        codes::UNKNOWN_IMPORT
    );

    let mut env = ImportObject::new("env");
    env.add_func(
        "f",
        FuncType::new(vec![ValueType::I32], vec![]),
        |_store: &mut Store, _args: &[Value]| Ok(vec![]),
    );
    runtime.register_import_object(&env).unwrap();

    let wrong_sig = parse(r#"(module (import "env" "f" (func (param i64))))"#);
    assert_eq!(
        runtime.instantiate(&wrong_sig, "b").unwrap_err().code(),
        codes::INCOMPATIBLE_IMPORT_TYPE
    );
}

#[test]
fn test_leb_overflow_scenario() {
    // A module whose function-count LEB takes six bytes.
    let mut bytes = vec![
        0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00, // header
        0x01, 0x04, 0x01, 0x60, 0x00, 0x00, // type section
        0x03, 0x07, // function section, size 7
    ];
    bytes.extend_from_slice(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00]);
    assert_eq!(
        Loader::new().parse_bytes(&bytes).unwrap_err().code(),
        codes::INTEGER_TOO_LONG
    );
}

#[test]
fn test_decode_encode_roundtrip_with_custom_sections() {
    let mut bytes = wat::parse_str(
        r#"(module
             (memory 1)
             (global (mut i64) (i64.const -9))
             (table 2 4 funcref)
             (func $f (export "f") (result f64) f64.const 2.5)
             (elem (i32.const 0) $f)
             (data (i32.const 8) "corten"))"#,
    )
    .unwrap();
    // Append a custom section after the data section.
    bytes.extend_from_slice(&[0x00, 0x07, 0x04, b'n', b'o', b't', b'e', 0xDE, 0xAD]);

    let loader = Loader::new();
    let module = loader.parse_bytes(&bytes).unwrap();
    assert_eq!(module.encode(), bytes);
}

#[test]
fn test_get_export_across_registered_modules() {
    let library = parse(
        r#"(module
             (func (export "three") (result i32) i32.const 3))"#,
    );
    let mut runtime = Runtime::new();
    runtime.register_module(&library, "lib").unwrap();

    let addr = runtime.get_export("lib", "three").unwrap();
    assert_eq!(runtime.invoke(addr, &[]).unwrap(), vec![Value::I32(3)]);
    assert_eq!(
        runtime.get_export("lib", "missing").unwrap_err().code(),
        codes::EXPORT_NOT_FOUND
    );
    assert_eq!(
        runtime.get_export("nope", "three").unwrap_err().code(),
        codes::MODULE_NOT_FOUND
    );
}

#[test]
fn test_wasm_module_imports_another_wasm_module() {
    let library = parse(
        r#"(module
             (func (export "double") (param i32) (result i32)
               local.get 0
               i32.const 2
               i32.mul))"#,
    );
    let app = parse(
        r#"(module
             (import "math" "double" (func $double (param i32) (result i32)))
             (func (export "quad") (param i32) (result i32)
               local.get 0
               call $double
               call $double))"#,
    );
    let mut runtime = Runtime::new();
    runtime.register_module(&library, "math").unwrap();
    runtime.instantiate(&app, "app").unwrap();
    assert_eq!(
        runtime.invoke_export("quad", &[Value::I32(5)]).unwrap(),
        vec![Value::I32(20)]
    );
}

#[test]
fn test_host_function_reenters_the_engine() {
    use corten::Interpreter;

    // The host function invokes the guest's "inc" export twice on the
    // same store through a fresh engine.
    let mut env = ImportObject::new("env");
    env.add_func(
        "twice",
        FuncType::new(vec![], vec![]),
        |store: &mut Store, _args: &[Value]| {
            let module_addr = store.find_module("app").expect("app is registered");
            let inc = store
                .module(module_addr)?
                .exported_func("inc")
                .expect("inc is exported");
            let mut engine = Interpreter::new();
            engine.invoke(store, inc, &[])?;
            engine.invoke(store, inc, &[])?;
            Ok(vec![])
        },
    );

    let module = parse(
        r#"(module
             (import "env" "twice" (func $twice))
             (global $count (mut i32) (i32.const 0))
             (func (export "inc")
               global.get $count
               i32.const 1
               i32.add
               global.set $count)
             (func (export "run") (result i32)
               call $twice
               global.get $count))"#,
    );
    let mut runtime = Runtime::new();
    runtime.register_import_object(&env).unwrap();
    runtime.instantiate(&module, "app").unwrap();
    assert_eq!(runtime.invoke_export("run", &[]).unwrap(), vec![Value::I32(2)]);
}

#[test]
fn test_invoke_without_active_module() {
    let mut runtime = Runtime::new();
    assert_eq!(
        runtime.invoke_export("anything", &[]).unwrap_err().code(),
        codes::NOT_INSTANTIATED
    );
}

#[cfg(feature = "std")]
mod files {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_wasm_file() {
        let bytes = wat::parse_str(r#"(module (func (export "nop")))"#).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.wasm");
        std::fs::write(&path, &bytes).unwrap();

        let module = Loader::new().parse_file(&path).unwrap();
        let mut runtime = Runtime::new();
        runtime.instantiate(&module, "m").unwrap();
        runtime.invoke_export("nop", &[]).unwrap();
    }

    #[test]
    fn test_missing_file_is_invalid_path() {
        let err = Loader::new().parse_file("does/not/exist.wasm".as_ref()).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_PATH);
    }

    #[test]
    fn test_compiled_container_version_gate() {
        let wasm = wat::parse_str(r#"(module (func (export "nop")))"#).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.so");
        let mut file = std::fs::File::create(&good).unwrap();
        file.write_all(&corten_decoder::compiled::encode_compiled(&wasm, corten::VERSION)).unwrap();
        drop(file);
        Loader::new().parse_file(&good).unwrap();

        let stale = dir.path().join("stale.so");
        std::fs::write(&stale, corten_decoder::compiled::encode_compiled(&wasm, "0.0.1")).unwrap();
        assert_eq!(
            Loader::new().parse_file(&stale).unwrap_err().code(),
            codes::INVALID_VERSION
        );
    }
}
