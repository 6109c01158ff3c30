//! # Linux Errors
//!
//! Typed failures for the syscall facade.
//!
//! ## Philosophy
//!
//! - **Per-operation vocabularies**: `EAGAIN` means "would block" to `read`
//!   and "locked" to `mmap`; each operation gets its own closed enumeration.
//! - **Total classification**: an error number no table names is still
//!   returned, untouched, as [`SysError::Raw`].
//! - **Declared once**: a table row carries the variant, its error number and
//!   its message; everything else is derived from it.
//!
//! ## Key Types
//!
//! - [`Errno`]: raw kernel error number
//! - [`ErrorTaxonomy`]: shared classification over a declared table
//! - [`SysError`]: classified-or-raw result error
//! - [`ReadError`], [`WriteError`], [`OpenError`], [`CloseError`],
//!   [`StatError`], [`PollError`], [`SeekError`], [`MapError`],
//!   [`ProtectMemoryError`], [`HeapError`]: per-operation tables

pub mod errno;
pub mod operations;
pub mod taxonomy;

pub use errno::Errno;
pub use operations::{
    CloseError, HeapError, MapError, OpenError, PollError, ProtectMemoryError, ReadError,
    SeekError, StatError, WriteError,
};
pub use taxonomy::{ErrorEntry, ErrorTaxonomy, SysError};
