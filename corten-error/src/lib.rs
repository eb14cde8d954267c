//! # Corten Error Handling
//!
//! Error types for the Corten WebAssembly runtime.
//!
//! Every fallible operation in the workspace returns [`Result`], carrying
//! an [`Error`] that pairs a coarse [`ErrorCategory`] with a flat `u16`
//! code from [`codes`] and a fixed human-readable message. No error ever
//! crosses a crate boundary as a panic.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codes;
mod error;
pub mod prelude;

pub use error::{Error, ErrorCategory};

/// Result alias used across all Corten crates.
pub type Result<T> = core::result::Result<T, Error>;
