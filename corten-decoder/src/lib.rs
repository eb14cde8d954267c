//! Binary decoding and static validation for Corten.
//!
//! The pipeline is bytes → [`module::decode_module`] → a
//! `corten_format::Module` → [`validation::validate_module`] → ready for
//! instantiation. The [`reader::ByteReader`] byte source underneath
//! tracks offsets for error reporting and enforces the strict LEB128
//! rules of the binary format.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod compiled;
pub mod instructions;
pub mod module;
pub mod prelude;
pub mod reader;
pub mod validation;

pub use compiled::decode_compiled;
pub use module::decode_module;
pub use reader::ByteReader;
pub use validation::validate_module;

#[cfg(feature = "std")]
pub use reader::read_file;
