// Copyright (c) 2025 The Corten contributors
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Prelude module for corten-math.
//!
//! Re-exports the error machinery and this crate's float bit wrappers
//! so the numeric modules can pull one glob in std and `no_std` builds
//! alike.

// Re-export from corten-error using its prelude
pub use corten_error::prelude::*;

// Re-export from this crate's modules
pub use crate::float_bits::{FloatBits32, FloatBits64};
pub use crate::ops;
