//! # Mapped Memory
//!
//! A [`MappedMemory`] exclusively owns one region returned by the kernel
//! and remembers the protection it currently has.
//!
//! Touching a page without the right protection kills the process with a
//! signal, so every access is checked against the stored protection first
//! and refused with `MapError::AccessDenied` instead.

use crate::native::Native;
use linux_abi::MemoryProtection;
use linux_errors::{MapError, ProtectMemoryError, SysError};
use log::{trace, warn};
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};
use std::slice;

/// A region of memory mapped by the kernel
#[derive(Debug)]
pub struct MappedMemory {
    start: NonNull<u8>,
    len: usize,
    protection: MemoryProtection,
}

// SAFETY: the region is owned exclusively; shared access only reads, and
// writes require `&mut self`.
unsafe impl Send for MappedMemory {}
unsafe impl Sync for MappedMemory {}

impl MappedMemory {
    /// Wraps a region the kernel has just mapped
    ///
    /// # Safety
    ///
    /// `start` must point to `len` mapped bytes with exactly `protection`,
    /// owned by nobody else.
    pub(crate) unsafe fn from_raw(start: NonNull<u8>, len: usize, protection: MemoryProtection) -> Self {
        Self {
            start,
            len,
            protection,
        }
    }

    /// Number of mapped bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Protection the region currently has
    pub fn protection(&self) -> MemoryProtection {
        self.protection
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.start.as_ptr()
    }

    /// Views the whole region, if it is readable
    pub fn as_slice(&self) -> Result<&[u8], SysError<MapError>> {
        if !self.protection.can_read() {
            return Err(SysError::Known(MapError::AccessDenied));
        }
        // SAFETY: the region is mapped readable for `len` bytes and cannot
        // be unmapped or reprotected while this borrow lives.
        Ok(unsafe { slice::from_raw_parts(self.start.as_ptr(), self.len) })
    }

    /// Copies bytes starting at `offset` into `buffer`
    ///
    /// Returns the number of bytes copied, which is short if the region ends
    /// first.
    pub fn read_at(&self, buffer: &mut [u8], offset: usize) -> Result<usize, SysError<MapError>> {
        if !self.protection.can_read() {
            return Err(SysError::Known(MapError::AccessDenied));
        }
        let count = self.span(offset, buffer.len())?;
        // SAFETY: span() keeps `offset..offset + count` inside the region,
        // which is readable.
        unsafe {
            ptr::copy_nonoverlapping(self.start.as_ptr().add(offset), buffer.as_mut_ptr(), count);
        }
        Ok(count)
    }

    /// Copies `buffer` into the region starting at `offset`
    ///
    /// Returns the number of bytes copied, which is short if the region ends
    /// first.
    pub fn write_at(&mut self, buffer: &[u8], offset: usize) -> Result<usize, SysError<MapError>> {
        if !self.protection.can_write() {
            return Err(SysError::Known(MapError::AccessDenied));
        }
        let count = self.span(offset, buffer.len())?;
        // SAFETY: span() keeps `offset..offset + count` inside the region,
        // which is writable and exclusively borrowed.
        unsafe {
            ptr::copy_nonoverlapping(buffer.as_ptr(), self.start.as_ptr().add(offset), count);
        }
        Ok(count)
    }

    /// Changes the protection of the whole region
    pub fn protect(&mut self, protection: MemoryProtection) -> Result<(), SysError<ProtectMemoryError>> {
        // SAFETY: the region is ours, and `&mut self` rules out live borrows
        // from as_slice().
        unsafe { Native.protect_memory(self.start, self.len, protection)? };
        self.protection = protection;
        Ok(())
    }

    /// Unmaps the region
    pub fn unmap(self) -> Result<(), SysError<MapError>> {
        let this = ManuallyDrop::new(self);
        this.release()
    }

    fn span(&self, offset: usize, requested: usize) -> Result<usize, SysError<MapError>> {
        if offset > self.len {
            return Err(SysError::Known(MapError::Invalid));
        }
        Ok(requested.min(self.len - offset))
    }

    fn release(&self) -> Result<(), SysError<MapError>> {
        // SAFETY: the region was mapped with this start and length and is
        // released at most once, by unmap() or drop.
        let ret = unsafe { libc::munmap(self.start.as_ptr().cast(), self.len) };
        let result: Result<(), SysError<MapError>> = if ret == 0 {
            Ok(())
        } else {
            Err(SysError::last())
        };
        trace!("munmap({:p}, {}) -> {:?}", self.start, self.len, result);
        result
    }
}

impl Drop for MappedMemory {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!("unmapping {:p} on drop failed: {}", self.start, err);
        }
    }
}
