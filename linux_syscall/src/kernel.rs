//! Kernel trait: the file operations of the facade

use crate::file::File;
use linux_abi::{
    Bytes, FileAccessMode, FileCreationFlags, FileDescriptor, FileHeader, FilePermissions,
    FileStatusFlags, FileToPoll, SeekWhence,
};
use linux_errors::{
    CloseError, OpenError, PollError, ReadError, SeekError, StatError, SysError, WriteError,
};
use std::path::Path;
use std::time::Duration;

/// The file operations of the kernel
///
/// Multiple implementations are possible:
/// - [`Native`](crate::Native): one direct kernel call per operation
/// - Scripted kernels (for testing handle state without touching files)
///
/// # Design Principles
///
/// **One call, one answer**: every method issues at most one kernel call
/// and never retries. `Interrupted` and `WouldBlock` are returned to the
/// caller like any other failure.
///
/// **Per-operation errors**: each method classifies failures through its
/// own table; the variants of `open` are not the variants of `read`.
///
/// # Example
///
/// ```no_run
/// use linux_abi::{FileAccessMode, FileCreationFlags, FilePermissions, FileStatusFlags};
/// use linux_syscall::{Kernel, Native};
/// use std::path::Path;
///
/// let file = Native
///     .open(
///         Path::new("/etc/hostname"),
///         FileAccessMode::ReadOnly,
///         FileCreationFlags::CLOSE_ON_EXECUTE,
///         FileStatusFlags::empty(),
///         FilePermissions::empty(),
///     )
///     .unwrap();
/// let mut buffer = [0u8; 64];
/// let count = file.read(&mut buffer).unwrap();
/// println!("read {count} bytes");
/// ```
pub trait Kernel {
    /// Reads up to `buffer.len()` bytes at the file's current offset
    ///
    /// Returns the number of bytes transferred, which may be less than
    /// requested; zero means end of file.
    fn read(&self, file: FileDescriptor, buffer: &mut [u8]) -> Result<usize, SysError<ReadError>>;

    /// Writes up to `buffer.len()` bytes at the file's current offset
    ///
    /// Returns the number of bytes transferred, which may be less than
    /// requested.
    fn write(&self, file: FileDescriptor, buffer: &[u8]) -> Result<usize, SysError<WriteError>>;

    /// Opens a file and returns its raw descriptor
    ///
    /// The access mode, creation flags and status flags are composed into a
    /// single native flags word. `permissions` applies only when the file is
    /// created.
    fn open_descriptor(
        &self,
        path: &Path,
        mode: FileAccessMode,
        creation: FileCreationFlags,
        status: FileStatusFlags,
        permissions: FilePermissions,
    ) -> Result<FileDescriptor, SysError<OpenError>>;

    /// Releases a descriptor
    fn close(&self, file: FileDescriptor) -> Result<(), SysError<CloseError>>;

    /// Reads the metadata of a path, following a trailing symbolic link
    fn stat(&self, path: &Path) -> Result<FileHeader, SysError<StatError>>;

    /// Reads the metadata of an open file
    fn stat_file(&self, file: FileDescriptor) -> Result<FileHeader, SysError<StatError>>;

    /// Reads the metadata of a path without following a trailing symbolic link
    fn stat_link(&self, path: &Path) -> Result<FileHeader, SysError<StatError>>;

    /// Waits for events on a set of descriptors
    ///
    /// # Arguments
    ///
    /// * `files` - Descriptors and requested events; observed events are
    ///   written back into each entry
    /// * `timeout` - Maximum time to wait, at millisecond precision
    ///   (None = wait forever)
    ///
    /// # Returns
    ///
    /// The index of the first entry with observed events, or `None` if the
    /// timeout expired. An empty list is `PollError::Invalid`.
    fn poll(
        &self,
        files: &mut [FileToPoll],
        timeout: Option<Duration>,
    ) -> Result<Option<usize>, SysError<PollError>>;

    /// Moves the file offset and returns the new absolute offset
    fn seek(
        &self,
        file: FileDescriptor,
        offset: Bytes,
        whence: SeekWhence,
    ) -> Result<Bytes, SysError<SeekError>>;

    /// Opens a file and wraps the descriptor in a [`File`] handle
    ///
    /// The handle keeps a copy of this kernel for its own operations.
    fn open(
        &self,
        path: &Path,
        mode: FileAccessMode,
        creation: FileCreationFlags,
        status: FileStatusFlags,
        permissions: FilePermissions,
    ) -> Result<File<Self>, SysError<OpenError>>
    where
        Self: Clone + Sized,
    {
        let descriptor = self.open_descriptor(path, mode, creation, status, permissions)?;
        Ok(File::from_descriptor(self.clone(), descriptor))
    }
}
