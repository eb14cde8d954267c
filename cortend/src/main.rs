//! # cortend
//!
//! Command-line runner for the Corten WebAssembly runtime.
//!
//! ```bash
//! # Invoke an exported function with arguments
//! cortend module.wasm --invoke add 2 3
//!
//! # Pre-register other modules so imports resolve
//! cortend app.wasm --register math=math.wasm --invoke main
//!
//! # List the exported functions of a module
//! cortend module.wasm
//! ```
//!
//! Log output goes through `env_logger`; set `RUST_LOG=error` (or
//! `debug`) to control it.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use corten::{FuncType, Loader, Runtime, RuntimeConfig, Value, ValueType};

/// Run a function exported by a WebAssembly module.
#[derive(Debug, Parser)]
#[command(name = "cortend", version, about)]
struct Cli {
    /// Path to the module (`.wasm`, or a `.so` compiled container).
    module: PathBuf,

    /// Exported function to invoke; without it, exports are listed.
    #[arg(long)]
    invoke: Option<String>,

    /// Arguments for the invoked function, one per parameter.
    args: Vec<String>,

    /// Pre-register a module under a name: `--register name=path`.
    #[arg(long, value_name = "NAME=PATH")]
    register: Vec<String>,

    /// Maximum call depth before the engine traps.
    #[arg(long, default_value_t = 1024)]
    max_call_depth: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let loader = Loader::new();
    let mut runtime = Runtime::with_config(RuntimeConfig { max_call_depth: cli.max_call_depth });

    for registration in &cli.register {
        let (name, path) = registration
            .split_once('=')
            .with_context(|| format!("--register {registration:?} is not NAME=PATH"))?;
        let module = loader
            .parse_file(path.as_ref())
            .with_context(|| format!("loading registered module {path:?}"))?;
        runtime
            .register_module(&module, name)
            .with_context(|| format!("registering module {name:?}"))?;
    }

    let module = loader
        .parse_file(&cli.module)
        .with_context(|| format!("loading {}", cli.module.display()))?;
    runtime
        .instantiate(&module, "main")
        .context("instantiating the module")?;

    let Some(function) = &cli.invoke else {
        for name in runtime.exported_functions() {
            println!("{name}");
        }
        return Ok(());
    };

    let func_addr = runtime
        .get_export("main", function)
        .with_context(|| format!("looking up export {function:?}"))?;
    let ty = runtime.store().func(func_addr)?.ty().clone();
    let params = parse_arguments(&ty, &cli.args)?;

    let results = runtime
        .invoke(func_addr, &params)
        .with_context(|| format!("invoking {function:?}"))?;
    for result in results {
        println!("{result}");
    }
    Ok(())
}

/// Parse command-line strings into typed values per the signature.
fn parse_arguments(ty: &FuncType, args: &[String]) -> anyhow::Result<Vec<Value>> {
    if ty.params.len() != args.len() {
        bail!("expected {} argument(s), got {}", ty.params.len(), args.len());
    }
    let mut values = Vec::new();
    for (arg, param_ty) in args.iter().zip(&ty.params) {
        let value = match param_ty {
            ValueType::I32 => arg
                .parse::<i32>()
                .or_else(|_| arg.parse::<u32>().map(|v| v as i32))
                .map(Value::I32)
                .with_context(|| format!("{arg:?} is not an i32"))?,
            ValueType::I64 => arg
                .parse::<i64>()
                .or_else(|_| arg.parse::<u64>().map(|v| v as i64))
                .map(Value::I64)
                .with_context(|| format!("{arg:?} is not an i64"))?,
            ValueType::F32 => arg
                .parse::<f32>()
                .map(Value::from)
                .with_context(|| format!("{arg:?} is not an f32"))?,
            ValueType::F64 => arg
                .parse::<f64>()
                .map(Value::from)
                .with_context(|| format!("{arg:?} is not an f64"))?,
        };
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments_by_signature() {
        let ty = FuncType::new(vec![ValueType::I32, ValueType::F64], vec![]);
        let args = vec![String::from("-5"), String::from("2.5")];
        let values = parse_arguments(&ty, &args).unwrap();
        assert_eq!(values, vec![Value::I32(-5), Value::from(2.5f64)]);
    }

    #[test]
    fn test_parse_arguments_accepts_unsigned_forms() {
        let ty = FuncType::new(vec![ValueType::I32], vec![]);
        let values = parse_arguments(&ty, &[String::from("4294967295")]).unwrap();
        assert_eq!(values, vec![Value::I32(-1)]);
    }

    #[test]
    fn test_parse_arguments_arity_mismatch() {
        let ty = FuncType::new(vec![ValueType::I32], vec![]);
        assert!(parse_arguments(&ty, &[]).is_err());
    }
}
