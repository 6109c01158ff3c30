//! Native kernel: one libc call per operation
//!
//! The calling thread's error number is read immediately after each call,
//! before anything else (logging included) can overwrite it.

use crate::kernel::Kernel;
use crate::mmap::MappedMemory;
use linux_abi::{
    Bytes, FileAccessMode, FileCreationFlags, FileDescriptor, FileHeader, FilePermissions,
    FileStatusFlags, FileToPoll, MapFlags, MapType, MemoryProtection, SeekWhence, MAX_READ,
};
use linux_errors::{
    CloseError, ErrorTaxonomy, HeapError, MapError, OpenError, PollError, ProtectMemoryError,
    ReadError, SeekError, StatError, SysError, WriteError,
};
use log::trace;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::{self, NonNull};
use std::time::Duration;

/// Page size assumed when the system does not report one
const FALLBACK_PAGE_SIZE: usize = 4096;

/// Returns the system memory page size
pub fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        FALLBACK_PAGE_SIZE
    }
}

/// Converts a path for the kernel; an interior NUL byte is the operation's `invalid` error
fn c_path<E: ErrorTaxonomy>(path: &Path, invalid: E) -> Result<CString, SysError<E>> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| SysError::Known(invalid))
}

/// Translates a poll timeout into milliseconds, `-1` meaning forever
fn poll_timeout(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        None => -1,
        Some(duration) => duration.as_millis().min(libc::c_int::MAX as u128) as libc::c_int,
    }
}

/// Issues each operation directly to the running kernel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Native;

impl Native {
    fn stat_at(&self, path: &Path, flags: libc::c_int) -> Result<FileHeader, SysError<StatError>> {
        let c_path = c_path(path, StatError::Invalid)?;
        let mut header = FileHeader::default();
        // SAFETY: FileHeader has the layout of `struct stat`, and c_path is
        // NUL-terminated and outlives the call.
        let ret = unsafe {
            libc::fstatat(
                libc::AT_FDCWD,
                c_path.as_ptr(),
                ptr::addr_of_mut!(header).cast::<libc::stat>(),
                flags,
            )
        };
        let result: Result<FileHeader, SysError<StatError>> = if ret == 0 {
            Ok(header)
        } else {
            Err(SysError::last())
        };
        trace!(
            "fstatat({:?}, {:#x}) -> {:?}",
            path,
            flags,
            result.as_ref().map(|h| h.size)
        );
        result
    }

    /// Maps a file, or anonymous memory, into the address space
    ///
    /// Only mappings that cannot disturb memory owned elsewhere are accepted:
    /// `MapFlags::EXACT_ADDRESS` and shared mappings of a file are
    /// `MapError::Invalid` here. Use [`Native::map_into_memory_unchecked`]
    /// for those.
    ///
    /// # Arguments
    ///
    /// * `address` - Placement hint
    /// * `length` - Bytes to map
    /// * `protection` - Access granted to the region
    /// * `kind` - Shared, private or shared-with-validation
    /// * `flags` - Additional mapping flags
    /// * `file` - Backing file, or `None` for anonymous memory
    /// * `offset` - Offset into the file; must be a multiple of [`page_size`]
    #[allow(clippy::too_many_arguments)]
    pub fn map_into_memory(
        &self,
        address: Option<NonNull<u8>>,
        length: usize,
        protection: MemoryProtection,
        kind: MapType,
        flags: MapFlags,
        file: Option<FileDescriptor>,
        offset: Bytes,
    ) -> Result<MappedMemory, SysError<MapError>> {
        let shared_file = file.is_some() && kind != MapType::Private;
        if flags.contains(MapFlags::EXACT_ADDRESS) || shared_file {
            trace!("mmap({:?}, {:?}, {:?}) -> refused", kind, flags, file);
            return Err(SysError::Known(MapError::Invalid));
        }
        // SAFETY: without EXACT_ADDRESS the kernel only places the region in
        // unused address space, and a private or anonymous region is changed
        // by nobody but its owner.
        unsafe {
            self.map_into_memory_unchecked(address, length, protection, kind, flags, file, offset)
        }
    }

    /// Maps a file, or anonymous memory, accepting every flag and kind
    ///
    /// Takes the same arguments as [`Native::map_into_memory`].
    ///
    /// # Safety
    ///
    /// With `MapFlags::EXACT_ADDRESS`, the caller must own the whole range
    /// at `address` and nothing may use it again, since the new region
    /// replaces it and unmaps it on drop. With a shared mapping of a file,
    /// no other process or mapping may modify the file while slices
    /// returned by [`MappedMemory::as_slice`] are alive.
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn map_into_memory_unchecked(
        &self,
        address: Option<NonNull<u8>>,
        length: usize,
        protection: MemoryProtection,
        kind: MapType,
        flags: MapFlags,
        file: Option<FileDescriptor>,
        offset: Bytes,
    ) -> Result<MappedMemory, SysError<MapError>> {
        if offset < 0 || offset as u64 % page_size() as u64 != 0 {
            return Err(SysError::Known(MapError::Invalid));
        }
        let (flags, fd) = match file {
            Some(file) => (flags, file.as_raw()),
            None => (flags | MapFlags::ANONYMOUS, -1),
        };
        let hint = address.map_or(ptr::null_mut(), |a| a.as_ptr().cast::<libc::c_void>());

        // SAFETY: the caller upholds the contract above for EXACT_ADDRESS and
        // shared file mappings; any other mapping only creates memory.
        let region = unsafe {
            libc::mmap(
                hint,
                length,
                protection.bits(),
                kind as libc::c_int | flags.bits(),
                fd,
                offset as libc::off_t,
            )
        };
        let result: Result<MappedMemory, SysError<MapError>> = if region == libc::MAP_FAILED {
            Err(SysError::last())
        } else {
            match NonNull::new(region.cast::<u8>()) {
                // SAFETY: the kernel just mapped `length` bytes at `region`
                // with `protection`, and nothing else owns them.
                Some(start) => Ok(unsafe { MappedMemory::from_raw(start, length, protection) }),
                None => Err(SysError::Known(MapError::Invalid)),
            }
        };
        trace!(
            "mmap({:?}, {}, {:?}, {:?}, {:?}, fd {}, {}) -> {:?}",
            hint,
            length,
            protection,
            kind,
            flags,
            fd,
            offset,
            result.as_ref().map(|m| m.as_ptr())
        );
        result
    }

    /// Changes the protection of a mapped range
    ///
    /// # Safety
    ///
    /// The range must be mapped, and no live reference into it may rely on
    /// an access the new protection removes.
    pub unsafe fn protect_memory(
        &self,
        address: NonNull<u8>,
        length: usize,
        protection: MemoryProtection,
    ) -> Result<(), SysError<ProtectMemoryError>> {
        let ret = libc::mprotect(
            address.as_ptr().cast::<libc::c_void>(),
            length,
            protection.bits(),
        );
        let result: Result<(), SysError<ProtectMemoryError>> = if ret == 0 {
            Ok(())
        } else {
            Err(SysError::last())
        };
        trace!(
            "mprotect({:p}, {}, {:?}) -> {:?}",
            address,
            length,
            protection,
            result
        );
        result
    }

    /// Allocates `length` bytes of zeroed, private read-write memory
    pub fn heap(&self, length: usize) -> Result<MappedMemory, SysError<HeapError>> {
        let protection = MemoryProtection::ALLOW_READS | MemoryProtection::ALLOW_WRITES;
        // SAFETY: an anonymous mapping at no fixed address only creates memory.
        let region = unsafe {
            libc::mmap(
                ptr::null_mut(),
                length,
                protection.bits(),
                MapType::Private as libc::c_int | MapFlags::ANONYMOUS.bits(),
                -1,
                0,
            )
        };
        let result: Result<MappedMemory, SysError<HeapError>> = if region == libc::MAP_FAILED {
            Err(SysError::last())
        } else {
            match NonNull::new(region.cast::<u8>()) {
                // SAFETY: freshly mapped, exclusively owned.
                Some(start) => Ok(unsafe { MappedMemory::from_raw(start, length, protection) }),
                None => Err(SysError::Known(HeapError::OutOfMemory)),
            }
        };
        trace!("heap({}) -> {:?}", length, result.as_ref().map(|m| m.as_ptr()));
        result
    }
}

impl Kernel for Native {
    fn read(&self, file: FileDescriptor, buffer: &mut [u8]) -> Result<usize, SysError<ReadError>> {
        let count = buffer.len().min(MAX_READ as usize);
        // SAFETY: buffer is valid for `count` bytes of writes.
        let ret = unsafe { libc::read(file.as_raw(), buffer.as_mut_ptr().cast(), count) };
        let result: Result<usize, SysError<ReadError>> = if ret < 0 {
            Err(SysError::last())
        } else {
            Ok(ret as usize)
        };
        trace!("read({}, {}) -> {:?}", file, count, result);
        result
    }

    fn write(&self, file: FileDescriptor, buffer: &[u8]) -> Result<usize, SysError<WriteError>> {
        let count = buffer.len().min(MAX_READ as usize);
        // SAFETY: buffer is valid for `count` bytes of reads.
        let ret = unsafe { libc::write(file.as_raw(), buffer.as_ptr().cast(), count) };
        let result: Result<usize, SysError<WriteError>> = if ret < 0 {
            Err(SysError::last())
        } else {
            Ok(ret as usize)
        };
        trace!("write({}, {}) -> {:?}", file, count, result);
        result
    }

    fn open_descriptor(
        &self,
        path: &Path,
        mode: FileAccessMode,
        creation: FileCreationFlags,
        status: FileStatusFlags,
        permissions: FilePermissions,
    ) -> Result<FileDescriptor, SysError<OpenError>> {
        let c_path = c_path(path, OpenError::Invalid)?;
        let flags = mode as libc::c_int | creation.bits() | status.bits();
        // SAFETY: c_path is NUL-terminated and outlives the call.
        let ret = unsafe {
            libc::openat(
                libc::AT_FDCWD,
                c_path.as_ptr(),
                flags,
                permissions.bits() as libc::c_uint,
            )
        };
        let result: Result<FileDescriptor, SysError<OpenError>> = if ret < 0 {
            Err(SysError::last())
        } else {
            Ok(FileDescriptor(ret))
        };
        trace!(
            "openat({:?}, {:#o}, {:#o}) -> {:?}",
            path,
            flags,
            permissions.bits(),
            result
        );
        result
    }

    fn close(&self, file: FileDescriptor) -> Result<(), SysError<CloseError>> {
        // SAFETY: closing an integer has no memory-safety preconditions.
        let ret = unsafe { libc::close(file.as_raw()) };
        let result: Result<(), SysError<CloseError>> = if ret == 0 {
            Ok(())
        } else {
            Err(SysError::last())
        };
        trace!("close({}) -> {:?}", file, result);
        result
    }

    fn stat(&self, path: &Path) -> Result<FileHeader, SysError<StatError>> {
        self.stat_at(path, 0)
    }

    fn stat_file(&self, file: FileDescriptor) -> Result<FileHeader, SysError<StatError>> {
        let mut header = FileHeader::default();
        // SAFETY: FileHeader has the layout of `struct stat`.
        let ret = unsafe { libc::fstat(file.as_raw(), ptr::addr_of_mut!(header).cast()) };
        let result: Result<FileHeader, SysError<StatError>> = if ret == 0 {
            Ok(header)
        } else {
            Err(SysError::last())
        };
        trace!("fstat({}) -> {:?}", file, result.as_ref().map(|h| h.size));
        result
    }

    fn stat_link(&self, path: &Path) -> Result<FileHeader, SysError<StatError>> {
        self.stat_at(path, libc::AT_SYMLINK_NOFOLLOW)
    }

    fn poll(
        &self,
        files: &mut [FileToPoll],
        timeout: Option<Duration>,
    ) -> Result<Option<usize>, SysError<PollError>> {
        if files.is_empty() {
            trace!("poll([]) -> invalid");
            return Err(SysError::Known(PollError::Invalid));
        }
        let millis = poll_timeout(timeout);
        // SAFETY: FileToPoll has the layout of `struct pollfd`, and the
        // slice is valid for `files.len()` entries.
        let ret = unsafe {
            libc::poll(
                files.as_mut_ptr().cast::<libc::pollfd>(),
                files.len() as libc::nfds_t,
                millis,
            )
        };
        let result: Result<Option<usize>, SysError<PollError>> = if ret < 0 {
            Err(SysError::last())
        } else if ret == 0 {
            Ok(None)
        } else {
            Ok(files.iter().position(FileToPoll::is_ready))
        };
        trace!("poll({} files, {}ms) -> {:?}", files.len(), millis, result);
        result
    }

    fn seek(
        &self,
        file: FileDescriptor,
        offset: Bytes,
        whence: SeekWhence,
    ) -> Result<Bytes, SysError<SeekError>> {
        // SAFETY: lseek has no memory-safety preconditions.
        let ret = unsafe { libc::lseek(file.as_raw(), offset as libc::off_t, whence as libc::c_int) };
        let result: Result<Bytes, SysError<SeekError>> = if ret < 0 {
            Err(SysError::last())
        } else {
            Ok(ret as Bytes)
        };
        trace!("lseek({}, {}, {:?}) -> {:?}", file, offset, whence, result);
        result
    }
}
