//! Linear memory instances.
//!
//! A memory is a byte vector sized in 64 KiB pages, zero-filled on
//! allocation and on growth. Access bounds are computed in `u64`
//! because an i32 address plus a static offset can exceed `u32`.
//! `grow` never traps: past the declared maximum (or the 65 536-page
//! hard ceiling when no maximum is declared) it returns -1 and leaves
//! the memory unchanged.

use alloc::vec::Vec;

use corten_error::{codes, Error, Result};
use corten_format::{MemoryType, MAX_MEMORY_PAGES, PAGE_SIZE};

const OUT_OF_BOUNDS: Error =
    Error::trap(codes::MEMORY_OUT_OF_BOUNDS, "memory access out of bounds");

/// A linear memory instance.
#[derive(Debug, Clone)]
pub struct MemoryInstance {
    ty: MemoryType,
    data: Vec<u8>,
}

impl MemoryInstance {
    /// Allocate a memory at its declared initial size, zero-filled.
    pub fn new(ty: MemoryType) -> Result<Self> {
        ty.limits.validate(MAX_MEMORY_PAGES)?;
        let data = alloc::vec![0u8; ty.limits.min as usize * PAGE_SIZE];
        Ok(Self { ty, data })
    }

    /// The declared memory type.
    #[must_use]
    pub fn ty(&self) -> MemoryType {
        self.ty
    }

    /// Current size in pages.
    #[must_use]
    pub fn size_pages(&self) -> u32 {
        (self.data.len() / PAGE_SIZE) as u32
    }

    /// Current size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Grow by `delta` pages. Returns the previous page count, or -1 if
    /// the request exceeds the declared maximum or the hard ceiling.
    pub fn grow(&mut self, delta: u32) -> i32 {
        let old_pages = self.size_pages();
        let ceiling = self.ty.limits.max.unwrap_or(MAX_MEMORY_PAGES).min(MAX_MEMORY_PAGES);
        let Some(new_pages) = old_pages.checked_add(delta) else {
            return -1;
        };
        if new_pages > ceiling {
            return -1;
        }
        self.data.resize(new_pages as usize * PAGE_SIZE, 0);
        old_pages as i32
    }

    /// Read `len` bytes starting at the 64-bit effective address.
    pub fn read(&self, addr: u64, len: usize) -> Result<&[u8]> {
        let end = addr.checked_add(len as u64).ok_or(OUT_OF_BOUNDS)?;
        if end > self.data.len() as u64 {
            return Err(OUT_OF_BOUNDS);
        }
        Ok(&self.data[addr as usize..end as usize])
    }

    /// Write bytes starting at the 64-bit effective address.
    pub fn write(&mut self, addr: u64, bytes: &[u8]) -> Result<()> {
        let end = addr.checked_add(bytes.len() as u64).ok_or(OUT_OF_BOUNDS)?;
        if end > self.data.len() as u64 {
            return Err(OUT_OF_BOUNDS);
        }
        self.data[addr as usize..end as usize].copy_from_slice(bytes);
        Ok(())
    }
}
