//! The interpreter: instantiation and the execution engine.
//!
//! One [`Interpreter`] drives one invocation at a time against a store.
//! Instantiation (import resolution, allocation, two-phase segment
//! initialisation, export population, start invocation) lives in
//! `instantiate`; the stack machine itself lives in `engine` with the
//! numeric opcode implementations split into `numeric`.

mod engine;
mod instantiate;
mod numeric;

use alloc::vec::Vec;

use crate::stack::{Frame, Label, ValueStack};

/// Engine limits.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Maximum nested function calls before `CALL_STACK_EXHAUSTED`.
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { max_call_depth: 1024 }
    }
}

/// The execution engine.
///
/// Holds the value, frame, and label stacks of the current invocation.
/// A trap empties all three before surfacing to the caller, so the
/// engine (and the store) stay usable afterwards.
#[derive(Debug, Default)]
pub struct Interpreter {
    config: RuntimeConfig,
    stack: ValueStack,
    frames: Vec<Frame>,
    labels: Vec<Label>,
    call_depth: usize,
}

impl Interpreter {
    /// Create an engine with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with explicit limits.
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { config, ..Self::default() }
    }
}
