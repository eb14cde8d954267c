//! Prelude module for corten-error.
//!
//! Provides a unified set of imports for both std and `no_std`
//! environments: the commonly used core traits plus this crate's error
//! types. Downstream crate preludes chain onto this one so every module
//! in the workspace can pull the error machinery with a single glob.

// Core imports for both std and no_std environments
pub use core::{
    cmp::{Eq, Ord, PartialEq, PartialOrd},
    fmt,
    fmt::{Debug, Display},
    str,
};

// Re-export the error types from this crate
pub use crate::{codes, Error, ErrorCategory, Result};
