//! Prelude module for corten-decoder.
//!
//! Provides a unified set of imports for both std and `no_std`
//! environments by chaining the format crate's prelude (which carries
//! the error machinery and the alloc types) and adding this crate's
//! entry points.

// Re-export from corten-format using its prelude
pub use corten_format::prelude::*;

// Re-export from this crate's modules
pub use crate::{
    compiled::decode_compiled, instructions::decode_expr, module::decode_module,
    reader::ByteReader, validation::validate_module,
};
