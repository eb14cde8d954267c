//! End-to-end engine tests: decode, validate, instantiate, invoke.

use corten_decoder::{decode_module, validate_module};
use corten_error::codes;
use corten_format::{FuncType, Value, ValueType};
use corten_runtime::{
    GlobalInstance, ImportObject, Interpreter, MemoryInstance, ModuleAddr, RuntimeConfig, Store,
};

fn instantiate(store: &mut Store, interp: &mut Interpreter, wat_source: &str) -> ModuleAddr {
    let bytes = wat::parse_str(wat_source).expect("fixture must assemble");
    let module = decode_module(&bytes).expect("fixture must decode");
    validate_module(&module).expect("fixture must validate");
    interp.instantiate(store, &module, "").expect("fixture must instantiate")
}

fn invoke_export(
    store: &mut Store,
    interp: &mut Interpreter,
    addr: ModuleAddr,
    name: &str,
    params: &[Value],
) -> corten_error::Result<Vec<Value>> {
    let func_addr = store
        .module(addr)
        .unwrap()
        .exported_func(name)
        .expect("export must exist");
    interp.invoke(store, func_addr, params)
}

#[test]
fn test_add() {
    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (func (export "add") (param i32 i32) (result i32)
               local.get 0
               local.get 1
               i32.add))"#,
    );
    let results = invoke_export(&mut store, &mut interp, addr, "add", &[Value::I32(2), Value::I32(3)]).unwrap();
    assert_eq!(results, vec![Value::I32(5)]);
    let results = invoke_export(&mut store, &mut interp, addr, "add", &[Value::I32(-1), Value::I32(1)]).unwrap();
    assert_eq!(results, vec![Value::I32(0)]);
}

#[test]
fn test_loop_sum_one_to_ten() {
    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (func (export "sum") (result i32)
               (local $i i32) (local $acc i32)
               loop $again
                 local.get $i
                 i32.const 1
                 i32.add
                 local.tee $i
                 local.get $acc
                 i32.add
                 local.set $acc
                 local.get $i
                 i32.const 10
                 i32.lt_s
                 br_if $again
               end
               local.get $acc))"#,
    );
    let results = invoke_export(&mut store, &mut interp, addr, "sum", &[]).unwrap();
    assert_eq!(results, vec![Value::I32(55)]);
}

#[test]
fn test_block_branch_carries_value() {
    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (func (export "pick") (param i32) (result i32)
               block (result i32)
                 i32.const 7
                 local.get 0
                 br_if 0
                 drop
                 i32.const 42
               end))"#,
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "pick", &[Value::I32(1)]).unwrap(),
        vec![Value::I32(7)]
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "pick", &[Value::I32(0)]).unwrap(),
        vec![Value::I32(42)]
    );
}

#[test]
fn test_memory_store_load_and_grow() {
    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (memory 1 2)
             (func (export "poke") (param i32 i32)
               local.get 0
               local.get 1
               i32.store)
             (func (export "peek8s") (param i32) (result i32)
               local.get 0
               i32.load8_s)
             (func (export "grow") (param i32) (result i32)
               local.get 0
               memory.grow))"#,
    );
    invoke_export(&mut store, &mut interp, addr, "poke", &[Value::I32(16), Value::I32(-2)]).unwrap();
    // -2 is FE FF FF FF little-endian: byte 16 sign-extends back to -2.
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "peek8s", &[Value::I32(16)]).unwrap(),
        vec![Value::I32(-2)]
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "grow", &[Value::I32(1)]).unwrap(),
        vec![Value::I32(1)]
    );
    // Past the declared max: -1, no trap.
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "grow", &[Value::I32(1)]).unwrap(),
        vec![Value::I32(-1)]
    );
}

#[test]
fn test_memory_bounds_trap() {
    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (memory 1)
             (func (export "read_end") (result i32)
               i32.const 65533
               i32.load))"#,
    );
    let err = invoke_export(&mut store, &mut interp, addr, "read_end", &[]).unwrap_err();
    assert_eq!(err.code(), codes::MEMORY_OUT_OF_BOUNDS);
    assert!(err.is_trap());
    // The store survives the trap and the engine can run again.
    let err = invoke_export(&mut store, &mut interp, addr, "read_end", &[]).unwrap_err();
    assert_eq!(err.code(), codes::MEMORY_OUT_OF_BOUNDS);
}

#[test]
fn test_div_traps() {
    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (func (export "div") (param i32 i32) (result i32)
               local.get 0
               local.get 1
               i32.div_s))"#,
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "div", &[Value::I32(-7), Value::I32(2)]).unwrap(),
        vec![Value::I32(-3)]
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "div", &[Value::I32(1), Value::I32(0)])
            .unwrap_err()
            .code(),
        codes::DIVISION_BY_ZERO
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "div", &[Value::I32(i32::MIN), Value::I32(-1)])
            .unwrap_err()
            .code(),
        codes::INTEGER_OVERFLOW
    );
}

#[test]
fn test_indirect_call_dispatch_and_type_mismatch() {
    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (type $as_i32 (func (result i32)))
             (type $as_i64 (func (result i64)))
             (table 2 funcref)
             (elem (i32.const 0) $answer)
             (func $answer (result i32) i32.const 41)
             (func (export "good") (result i32)
               i32.const 0
               call_indirect (type $as_i32))
             (func (export "wrong_type") (result i64)
               i32.const 0
               call_indirect (type $as_i64))
             (func (export "null_entry") (result i32)
               i32.const 1
               call_indirect (type $as_i32))
             (func (export "out_of_range") (result i32)
               i32.const 9
               call_indirect (type $as_i32)))"#,
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "good", &[]).unwrap(),
        vec![Value::I32(41)]
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "wrong_type", &[]).unwrap_err().code(),
        codes::INDIRECT_CALL_TYPE_MISMATCH
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "null_entry", &[]).unwrap_err().code(),
        codes::UNINITIALIZED_ELEMENT
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "out_of_range", &[]).unwrap_err().code(),
        codes::TABLE_OUT_OF_BOUNDS
    );
}

#[test]
fn test_call_stack_exhaustion() {
    let mut store = Store::new();
    let mut interp = Interpreter::with_config(RuntimeConfig { max_call_depth: 64 });
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (func $spin (export "spin") call $spin))"#,
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "spin", &[]).unwrap_err().code(),
        codes::CALL_STACK_EXHAUSTED
    );
}

#[test]
fn test_host_function_receives_arguments() {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    let seen = Arc::new(AtomicI32::new(0));
    let seen_in_host = seen.clone();

    let mut env = ImportObject::new("env");
    env.add_func(
        "record",
        FuncType::new(vec![ValueType::I32], vec![]),
        move |_store: &mut Store, args: &[Value]| {
            seen_in_host.store(args[0].as_i32().unwrap(), Ordering::SeqCst);
            Ok(vec![])
        },
    );

    let mut store = Store::new();
    let mut interp = Interpreter::new();
    interp.register_import_object(&mut store, &env).unwrap();

    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (import "env" "record" (func $record (param i32)))
             (func (export "main")
               i32.const 123
               call $record))"#,
    );
    invoke_export(&mut store, &mut interp, addr, "main", &[]).unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 123);
}

#[test]
fn test_imported_global_and_start_function() {
    let mut env = ImportObject::new("env");
    env.add_global(
        "base",
        GlobalInstance::new(
            corten_format::GlobalType { value_type: ValueType::I32, mutable: false },
            Value::I32(1000),
        )
        .unwrap(),
    );
    env.add_memory(
        "mem",
        MemoryInstance::new(corten_format::MemoryType {
            limits: corten_format::Limits { min: 1, max: None },
        })
        .unwrap(),
    );

    let mut store = Store::new();
    let mut interp = Interpreter::new();
    interp.register_import_object(&mut store, &env).unwrap();

    // The data segment offset comes from the imported global; the start
    // function bumps a defined global so we can observe it ran.
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (import "env" "base" (global $base i32))
             (import "env" "mem" (memory 1))
             (global $ran (mut i32) (i32.const 0))
             (data (global.get $base) "\2A")
             (func $init
               i32.const 1
               global.set $ran)
             (start $init)
             (func (export "ran") (result i32)
               global.get $ran)
             (func (export "first_byte") (result i32)
               global.get $base
               i32.load8_u))"#,
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "ran", &[]).unwrap(),
        vec![Value::I32(1)]
    );
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "first_byte", &[]).unwrap(),
        vec![Value::I32(42)]
    );
}

#[test]
fn test_invoke_signature_checking() {
    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module (func (export "id") (param i32) (result i32) local.get 0))"#,
    );
    let func_addr = store.module(addr).unwrap().exported_func("id").unwrap();
    assert_eq!(
        interp.invoke(&mut store, func_addr, &[]).unwrap_err().code(),
        codes::FUNC_SIG_MISMATCH
    );
    assert_eq!(
        interp.invoke(&mut store, func_addr, &[Value::I64(1)]).unwrap_err().code(),
        codes::FUNC_SIG_MISMATCH
    );
}

#[test]
fn test_reinterpret_roundtrip_preserves_bits() {
    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let addr = instantiate(
        &mut store,
        &mut interp,
        r#"(module
             (func (export "through_i32") (param f32) (result f32)
               local.get 0
               i32.reinterpret_f32
               f32.reinterpret_i32))"#,
    );
    let nan = Value::F32(corten_math::FloatBits32::from_bits(0x7fc0_1234));
    assert_eq!(
        invoke_export(&mut store, &mut interp, addr, "through_i32", &[nan]).unwrap(),
        vec![nan]
    );
}

#[test]
fn test_two_instances_behave_identically() {
    let source = r#"(module
        (global $count (mut i32) (i32.const 0))
        (func (export "bump") (result i32)
          global.get $count
          i32.const 1
          i32.add
          global.set $count
          global.get $count))"#;

    let bytes = wat::parse_str(source).unwrap();
    let module = decode_module(&bytes).unwrap();
    validate_module(&module).unwrap();

    let mut store = Store::new();
    let mut interp = Interpreter::new();
    let first = interp.instantiate(&mut store, &module, "first").unwrap();
    let second = interp.instantiate(&mut store, &module, "second").unwrap();

    for addr in [first, second] {
        assert_eq!(
            invoke_export(&mut store, &mut interp, addr, "bump", &[]).unwrap(),
            vec![Value::I32(1)]
        );
    }
    // Each instance owns its own global.
    assert_eq!(
        invoke_export(&mut store, &mut interp, first, "bump", &[]).unwrap(),
        vec![Value::I32(2)]
    );
}
