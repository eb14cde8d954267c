// Copyright (c) 2025 The Corten contributors
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Mathematical operations and types for Corten.
//! Provides implementations for WebAssembly numeric instructions.
//!
//! Every operation here is bit-exact with respect to the WebAssembly
//! specification: two's-complement integers, truncation toward zero,
//! IEEE-754 round-to-nearest-even, and deterministic NaN handling.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

pub mod float_bits;
pub mod ops;
pub mod prelude;

pub use float_bits::{FloatBits32, FloatBits64};
