//! # File Handle
//!
//! A [`File`] exclusively owns one open descriptor. It moves from open to
//! closed exactly once: the first `close` (or the drop, if nobody closed
//! it) issues the kernel call, every later `close` is a successful no-op.
//!
//! The handle does not reject use after close; the kernel answers with
//! `BadFile` for a descriptor that is no longer open.

use crate::kernel::Kernel;
use crate::native::Native;
use linux_abi::{Bytes, FileDescriptor, FileHeader, SeekWhence};
use linux_errors::{CloseError, ReadError, SeekError, StatError, SysError, WriteError};
use log::warn;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// An open file
#[derive(Debug)]
pub struct File<K: Kernel = Native> {
    kernel: K,
    descriptor: FileDescriptor,
    closed: AtomicBool,
}

impl<K: Kernel> File<K> {
    /// Takes ownership of an open descriptor
    ///
    /// The descriptor must not be closed by anyone else afterwards.
    pub fn from_descriptor(kernel: K, descriptor: FileDescriptor) -> Self {
        Self {
            kernel,
            descriptor,
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the underlying descriptor
    pub fn descriptor(&self) -> FileDescriptor {
        self.descriptor
    }

    /// Returns true once `close` has been requested
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn read(&self, buffer: &mut [u8]) -> Result<usize, SysError<ReadError>> {
        self.kernel.read(self.descriptor, buffer)
    }

    pub fn write(&self, buffer: &[u8]) -> Result<usize, SysError<WriteError>> {
        self.kernel.write(self.descriptor, buffer)
    }

    pub fn seek(&self, offset: Bytes, whence: SeekWhence) -> Result<Bytes, SysError<SeekError>> {
        self.kernel.seek(self.descriptor, offset, whence)
    }

    pub fn stat(&self) -> Result<FileHeader, SysError<StatError>> {
        self.kernel.stat_file(self.descriptor)
    }

    /// Closes the descriptor
    ///
    /// Safe to call any number of times, from any number of threads: only
    /// the first call reaches the kernel, and its result is the only one
    /// that can fail.
    pub fn close(&self) -> Result<(), SysError<CloseError>> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.kernel.close(self.descriptor)
    }

    /// Gives up ownership of the descriptor without closing it
    pub fn into_descriptor(self) -> FileDescriptor {
        self.closed.store(true, Ordering::Release);
        self.descriptor
    }
}

impl<K: Kernel> Drop for File<K> {
    fn drop(&mut self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(err) = self.kernel.close(self.descriptor) {
            warn!("closing {} on drop failed: {}", self.descriptor, err);
        }
    }
}

impl<K: Kernel> io::Read for File<K> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        File::read(self, buf).map_err(io::Error::from)
    }
}

impl<K: Kernel> io::Write for File<K> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        File::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<K: Kernel> io::Seek for File<K> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            io::SeekFrom::Start(offset) => (
                Bytes::try_from(offset).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?,
                SeekWhence::RelativeToStart,
            ),
            io::SeekFrom::Current(offset) => (offset, SeekWhence::Relative),
            io::SeekFrom::End(offset) => (offset, SeekWhence::RelativeToEnd),
        };
        let position = File::seek(self, offset, whence).map_err(io::Error::from)?;
        Ok(position as u64)
    }
}
