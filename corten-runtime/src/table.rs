//! Table instances.
//!
//! MVP tables hold optional function addresses; entries start
//! uninitialised and are filled by element segments or by the host.

use alloc::vec::Vec;

use corten_error::{codes, Error, Result};
use corten_format::TableType;

use crate::store::FuncAddr;

const OUT_OF_BOUNDS: Error = Error::trap(codes::TABLE_OUT_OF_BOUNDS, "table access out of bounds");

/// A table instance.
#[derive(Debug, Clone)]
pub struct TableInstance {
    ty: TableType,
    elements: Vec<Option<FuncAddr>>,
}

impl TableInstance {
    /// Allocate a table at its declared initial size, all entries null.
    pub fn new(ty: TableType) -> Result<Self> {
        ty.limits.validate(u32::MAX)?;
        Ok(Self { ty, elements: alloc::vec![None; ty.limits.min as usize] })
    }

    /// The declared table type.
    #[must_use]
    pub fn ty(&self) -> TableType {
        self.ty
    }

    /// Current size in elements.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.elements.len() as u32
    }

    /// Read the entry at `index`; `None` is an uninitialised element.
    pub fn get(&self, index: u32) -> Result<Option<FuncAddr>> {
        self.elements.get(index as usize).copied().ok_or(OUT_OF_BOUNDS)
    }

    /// Write the entry at `index`.
    pub fn set(&mut self, index: u32, func_addr: Option<FuncAddr>) -> Result<()> {
        let slot = self.elements.get_mut(index as usize).ok_or(OUT_OF_BOUNDS)?;
        *slot = func_addr;
        Ok(())
    }

    /// Grow by `delta` elements. Returns the previous size, or -1 if
    /// the request exceeds the declared maximum.
    pub fn grow(&mut self, delta: u32) -> i32 {
        let old_size = self.size();
        let ceiling = self.ty.limits.max.unwrap_or(u32::MAX);
        let Some(new_size) = old_size.checked_add(delta) else {
            return -1;
        };
        if new_size > ceiling {
            return -1;
        }
        self.elements.resize(new_size as usize, None);
        old_size as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corten_format::{ElemType, Limits};

    fn table(min: u32, max: Option<u32>) -> TableInstance {
        TableInstance::new(TableType {
            element: ElemType::FuncRef,
            limits: Limits { min, max },
        })
        .unwrap()
    }

    #[test]
    fn test_entries_start_uninitialised() {
        let table = table(2, None);
        assert_eq!(table.get(0).unwrap(), None);
        assert_eq!(table.get(2), Err(OUT_OF_BOUNDS));
    }

    #[test]
    fn test_set_and_get() {
        let mut table = table(1, None);
        table.set(0, Some(7)).unwrap();
        assert_eq!(table.get(0).unwrap(), Some(7));
    }

    #[test]
    fn test_grow_respects_max() {
        let mut table = table(1, Some(2));
        assert_eq!(table.grow(1), 1);
        assert_eq!(table.grow(1), -1);
        assert_eq!(table.size(), 2);
    }
}
