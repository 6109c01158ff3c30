//! # Linux Syscall
//!
//! A typed facade over the kernel's file and memory primitives.
//!
//! ## Philosophy
//!
//! - **Direct**: every operation is exactly one kernel call; nothing is
//!   retried, batched or emulated.
//! - **Typed in, typed out**: flags are named sets, results are ABI records
//!   written by the kernel, failures are classified per operation.
//! - **Owned resources**: descriptors and mappings are released exactly
//!   once, by their single owner.
//!
//! ## Key Types
//!
//! - [`Kernel`]: the file operations, implemented by [`Native`]
//! - [`File`]: an open descriptor with idempotent close
//! - [`MappedMemory`]: a protection-checked mapped region
//!
//! The free functions below issue each operation through [`Native`].
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - Portable (Linux only)
//! - A sandbox (calls reach the real kernel)
//! - Buffered (short reads and writes are returned as they happen)

pub mod file;
pub mod kernel;
pub mod mmap;
pub mod native;

pub use file::File;
pub use kernel::Kernel;
pub use mmap::MappedMemory;
pub use native::{page_size, Native};

use linux_abi::{
    Bytes, FileAccessMode, FileCreationFlags, FileDescriptor, FileHeader, FilePermissions,
    FileStatusFlags, FileToPoll, MapFlags, MapType, MemoryProtection, SeekWhence,
};
use linux_errors::{
    CloseError, HeapError, MapError, OpenError, PollError, ProtectMemoryError, ReadError,
    SeekError, StatError, SysError, WriteError,
};
use std::path::Path;
use std::ptr::NonNull;
use std::time::Duration;

/// Reads from a descriptor; see [`Kernel::read`]
pub fn read(file: FileDescriptor, buffer: &mut [u8]) -> Result<usize, SysError<ReadError>> {
    Native.read(file, buffer)
}

/// Writes to a descriptor; see [`Kernel::write`]
pub fn write(file: FileDescriptor, buffer: &[u8]) -> Result<usize, SysError<WriteError>> {
    Native.write(file, buffer)
}

/// Opens a file; see [`Kernel::open`]
pub fn open<P: AsRef<Path>>(
    path: P,
    mode: FileAccessMode,
    creation: FileCreationFlags,
    status: FileStatusFlags,
    permissions: FilePermissions,
) -> Result<File, SysError<OpenError>> {
    Native.open(path.as_ref(), mode, creation, status, permissions)
}

/// Closes a raw descriptor; see [`Kernel::close`]
pub fn close(file: FileDescriptor) -> Result<(), SysError<CloseError>> {
    Native.close(file)
}

/// Reads a path's metadata, following symbolic links
pub fn stat<P: AsRef<Path>>(path: P) -> Result<FileHeader, SysError<StatError>> {
    Native.stat(path.as_ref())
}

/// Reads an open descriptor's metadata
pub fn stat_file(file: FileDescriptor) -> Result<FileHeader, SysError<StatError>> {
    Native.stat_file(file)
}

/// Reads a path's metadata without following a trailing symbolic link
pub fn stat_link<P: AsRef<Path>>(path: P) -> Result<FileHeader, SysError<StatError>> {
    Native.stat_link(path.as_ref())
}

/// Waits for events; see [`Kernel::poll`]
pub fn poll(
    files: &mut [FileToPoll],
    timeout: Option<Duration>,
) -> Result<Option<usize>, SysError<PollError>> {
    Native.poll(files, timeout)
}

/// Moves a descriptor's offset; see [`Kernel::seek`]
pub fn seek(
    file: FileDescriptor,
    offset: Bytes,
    whence: SeekWhence,
) -> Result<Bytes, SysError<SeekError>> {
    Native.seek(file, offset, whence)
}

/// Maps a file or anonymous memory; see [`Native::map_into_memory`]
pub fn map_into_memory(
    address: Option<NonNull<u8>>,
    length: usize,
    protection: MemoryProtection,
    kind: MapType,
    flags: MapFlags,
    file: Option<FileDescriptor>,
    offset: Bytes,
) -> Result<MappedMemory, SysError<MapError>> {
    Native.map_into_memory(address, length, protection, kind, flags, file, offset)
}

/// Maps a file or anonymous memory with any flag or kind
///
/// # Safety
///
/// See [`Native::map_into_memory_unchecked`].
pub unsafe fn map_into_memory_unchecked(
    address: Option<NonNull<u8>>,
    length: usize,
    protection: MemoryProtection,
    kind: MapType,
    flags: MapFlags,
    file: Option<FileDescriptor>,
    offset: Bytes,
) -> Result<MappedMemory, SysError<MapError>> {
    Native.map_into_memory_unchecked(address, length, protection, kind, flags, file, offset)
}

/// Changes the protection of a mapped range
///
/// # Safety
///
/// See [`Native::protect_memory`].
pub unsafe fn protect_memory(
    address: NonNull<u8>,
    length: usize,
    protection: MemoryProtection,
) -> Result<(), SysError<ProtectMemoryError>> {
    Native.protect_memory(address, length, protection)
}

/// Allocates zeroed read-write memory; see [`Native::heap`]
pub fn heap(length: usize) -> Result<MappedMemory, SysError<HeapError>> {
    Native.heap(length)
}
