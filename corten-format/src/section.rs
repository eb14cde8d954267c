//! Custom section representation.

use alloc::{string::String, vec::Vec};

/// A custom (id 0) section, preserved verbatim.
///
/// `placed_after` records the id of the last non-custom section decoded
/// before this one (0 when the custom section precedes every known
/// section), which is enough to re-emit it in its original position
/// because non-custom sections are required to appear in canonical
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSection {
    /// Section name.
    pub name: String,
    /// Raw payload bytes after the name.
    pub data: Vec<u8>,
    /// Id of the preceding non-custom section, 0 if none.
    pub placed_after: u8,
}
