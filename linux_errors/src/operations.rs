//! Per-operation error tables
//!
//! Each table lists the failures the kernel documents for one operation.
//! Rows are matched on the error number; the message is the text the C
//! library reports for it.

use crate::taxonomy::error_taxonomy;

error_taxonomy! {
    /// Errors returned by `read`
    pub enum ReadError for "read" {
        /// The file is non-blocking and the read would block; try again later.
        WouldBlock = libc::EAGAIN => "resource temporarily unavailable",
        /// The descriptor is not open for reading.
        BadFile = libc::EBADF => "bad file descriptor",
        /// The buffer lies outside the accessible address space.
        Fault = libc::EFAULT => "bad address",
        /// A signal arrived before any data was read.
        Interrupted = libc::EINTR => "interrupted system call",
        /// The file is not suitable for reading.
        Invalid = libc::EINVAL => "invalid argument",
        /// Low-level I/O failure.
        Io = libc::EIO => "input/output error",
        /// Directories cannot be read.
        Directory = libc::EISDIR => "is a directory",
    }
}

error_taxonomy! {
    /// Errors returned by `write`
    pub enum WriteError for "write" {
        /// The file is non-blocking and the write would block; try again later.
        WouldBlock = libc::EAGAIN => "resource temporarily unavailable",
        /// The descriptor is not open for writing.
        BadFile = libc::EBADF => "bad file descriptor",
        /// Datagram socket without a peer address.
        NoDestination = libc::EDESTADDRREQ => "destination address required",
        /// The user's disk quota is used up.
        QuotaExhausted = libc::EDQUOT => "disk quota exceeded",
        /// The buffer lies outside the accessible address space.
        Fault = libc::EFAULT => "bad address",
        /// The write would exceed the maximum file size.
        TooMuch = libc::EFBIG => "file too large",
        /// A signal arrived before any data was written.
        Interrupted = libc::EINTR => "interrupted system call",
        /// The file is not suitable for writing.
        Invalid = libc::EINVAL => "invalid argument",
        /// Low-level I/O failure.
        Io = libc::EIO => "input/output error",
        /// The device has no room left.
        NoMoreSpace = libc::ENOSPC => "no space left on device",
        /// The file is sealed against writes.
        NotPermitted = libc::EPERM => "operation not permitted",
        /// The reading end of the pipe or socket is closed.
        BrokenPipe = libc::EPIPE => "broken pipe",
    }
}

error_taxonomy! {
    /// Errors returned by `open`
    pub enum OpenError for "open" {
        /// Search permission is missing on a path component, or access to the file is denied.
        AccessDenied = libc::EACCES => "permission denied",
        /// The directory descriptor for a relative path is not valid.
        BadFile = libc::EBADF => "bad file descriptor",
        /// The device is in use and cannot be opened exclusively.
        Busy = libc::EBUSY => "device or resource busy",
        /// The user's disk quota is used up.
        QuotaExhausted = libc::EDQUOT => "disk quota exceeded",
        /// The file exists and exclusive creation was requested.
        AlreadyExists = libc::EEXIST => "file exists",
        /// The path lies outside the accessible address space.
        Fault = libc::EFAULT => "bad address",
        /// The file is too large to be opened.
        FileTooLarge = libc::EFBIG => "file too large",
        /// The file is sealed or immutable.
        NotPermitted = libc::EPERM => "operation not permitted",
        /// Write access was requested on a read-only filesystem.
        ReadOnly = libc::EROFS => "read-only file system",
        /// Write access was requested to an executable that is running.
        FileInUse = libc::ETXTBSY => "text file busy",
        /// The file is non-blocking and opening it would block.
        WouldBlock = libc::EAGAIN => "resource temporarily unavailable",
        /// A path component does not exist.
        DoesNotExist = libc::ENOENT => "no such file or directory",
        /// Write access was requested on a directory.
        Directory = libc::EISDIR => "is a directory",
        /// Too many symbolic links, or the trailing component is a link that must not be followed.
        Loop = libc::ELOOP => "too many levels of symbolic links",
        /// The path or one of its components is too long.
        NameTooLong = libc::ENAMETOOLONG => "file name too long",
        /// A path prefix component is not a directory.
        NotDirectory = libc::ENOTDIR => "not a directory",
        /// The process has too many files open.
        TooManyFiles = libc::EMFILE => "too many open files",
        /// A signal arrived while waiting to open the file.
        Interrupted = libc::EINTR => "interrupted system call",
        /// The flags are invalid, or the path contains a NUL byte.
        Invalid = libc::EINVAL => "invalid argument",
    }
}

error_taxonomy! {
    /// Errors returned by `close`
    pub enum CloseError for "close" {
        /// The descriptor is not open.
        BadFile = libc::EBADF => "bad file descriptor",
        /// A signal arrived while closing.
        Interrupted = libc::EINTR => "interrupted system call",
        /// Low-level I/O failure while flushing.
        Io = libc::EIO => "input/output error",
        /// Buffered writes ran out of quota.
        QuotaExhausted = libc::EDQUOT => "disk quota exceeded",
        /// Buffered writes ran out of space.
        NoMoreSpace = libc::ENOSPC => "no space left on device",
    }
}

error_taxonomy! {
    /// Errors returned by `stat`, `fstat` and `lstat`
    pub enum StatError for "stat" {
        /// A path component does not exist.
        DoesNotExist = libc::ENOENT => "no such file or directory",
        /// Search permission is missing on a path component.
        AccessDenied = libc::EACCES => "permission denied",
        /// The descriptor is not open.
        BadFile = libc::EBADF => "bad file descriptor",
        /// The path or buffer lies outside the accessible address space.
        Fault = libc::EFAULT => "bad address",
        /// The flags are invalid, or the path contains a NUL byte.
        Invalid = libc::EINVAL => "invalid argument",
        /// Too many symbolic links while resolving the path.
        Loop = libc::ELOOP => "too many levels of symbolic links",
        /// The path or one of its components is too long.
        NameTooLong = libc::ENAMETOOLONG => "file name too long",
        /// The kernel is out of memory.
        OutOfMemory = libc::ENOMEM => "cannot allocate memory",
        /// A path prefix component is not a directory.
        NotDirectory = libc::ENOTDIR => "not a directory",
        /// A size, inode or block count does not fit the record.
        TooLarge = libc::EOVERFLOW => "value too large for defined data type",
    }
}

error_taxonomy! {
    /// Errors returned by `poll`
    pub enum PollError for "poll" {
        /// The descriptor list lies outside the accessible address space.
        Fault = libc::EFAULT => "bad address",
        /// A signal arrived before any event.
        Interrupted = libc::EINTR => "interrupted system call",
        /// The list is empty or exceeds the descriptor limit.
        Invalid = libc::EINVAL => "invalid argument",
        /// The kernel is out of memory.
        OutOfMemory = libc::ENOMEM => "cannot allocate memory",
    }
}

error_taxonomy! {
    /// Errors returned by `lseek`
    pub enum SeekError for "seek" {
        /// The descriptor is not open.
        BadFile = libc::EBADF => "bad file descriptor",
        /// Unknown origin, or the resulting offset would be negative.
        Invalid = libc::EINVAL => "invalid argument",
        /// No data or hole at or after the offset.
        NotFound = libc::ENXIO => "no such device or address",
        /// The resulting offset does not fit in 64 bits.
        Overflow = libc::EOVERFLOW => "value too large for defined data type",
        /// Pipes, sockets and FIFOs cannot seek.
        Illegal = libc::ESPIPE => "illegal seek",
    }
}

error_taxonomy! {
    /// Errors returned by `mmap`, `munmap` and mapped-memory access
    pub enum MapError for "map" {
        /// The file is not regular, or its access mode does not allow the protection.
        AccessDenied = libc::EACCES => "permission denied",
        /// The file is locked, or too much memory is locked.
        Locked = libc::EAGAIN => "resource temporarily unavailable",
        /// The descriptor is not valid and no anonymous mapping was requested.
        BadFile = libc::EBADF => "bad file descriptor",
        /// An exact-once address is already mapped.
        AlreadyExists = libc::EEXIST => "file exists",
        /// Address, length or offset is invalid, or the mapping type is missing.
        Invalid = libc::EINVAL => "invalid argument",
        /// The process has too many files open.
        TooManyFiles = libc::EMFILE => "too many open files",
        /// The filesystem does not support mapping.
        Unsupported = libc::ENODEV => "no such device",
        /// Out of memory, or the address range exceeds the address space.
        OutOfMemory = libc::ENOMEM => "cannot allocate memory",
        /// The mapped range does not fit in the file offset type.
        Overflow = libc::EOVERFLOW => "value too large for defined data type",
        /// The file is sealed, or huge pages are not permitted to the process.
        NotPermitted = libc::EPERM => "operation not permitted",
    }
}

error_taxonomy! {
    /// Errors returned by `mprotect`
    pub enum ProtectMemoryError for "protect" {
        /// The mapped file's access mode does not allow the protection.
        AccessDenied = libc::EACCES => "permission denied",
        /// The address is not page aligned, or the flags are invalid.
        Invalid = libc::EINVAL => "invalid argument",
        /// The range is not fully mapped, or the kernel is out of memory.
        OutOfMemory = libc::ENOMEM => "cannot allocate memory",
    }
}

error_taxonomy! {
    /// Errors returned when allocating heap memory
    pub enum HeapError for "heap" {
        /// No more memory is available.
        OutOfMemory = libc::ENOMEM => "cannot allocate memory",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errno::Errno;
    use crate::taxonomy::{ErrorEntry, ErrorTaxonomy, SysError};

    fn assert_table_is_consistent<E: ErrorTaxonomy>() {
        let table: &[ErrorEntry] = E::TABLE;
        assert_eq!(E::all_variants().len(), table.len(), "{}", E::OPERATION);
        for (i, entry) in table.iter().enumerate() {
            assert!(!entry.message.is_empty(), "{}: {}", E::OPERATION, entry.name);
            // No two rows may claim the same error number.
            assert!(
                table[i + 1..].iter().all(|other| other.errno != entry.errno),
                "{}: duplicate errno for {}",
                E::OPERATION,
                entry.name
            );
        }
        for variant in E::all_variants() {
            assert_eq!(E::classify(variant.errno()), SysError::Known(*variant));
            assert_eq!(variant.name(), variant.to_string());
        }
    }

    #[test]
    fn test_every_table_is_consistent() {
        assert_table_is_consistent::<ReadError>();
        assert_table_is_consistent::<WriteError>();
        assert_table_is_consistent::<OpenError>();
        assert_table_is_consistent::<CloseError>();
        assert_table_is_consistent::<StatError>();
        assert_table_is_consistent::<PollError>();
        assert_table_is_consistent::<SeekError>();
        assert_table_is_consistent::<MapError>();
        assert_table_is_consistent::<ProtectMemoryError>();
        assert_table_is_consistent::<HeapError>();
    }

    #[test]
    fn test_stat_does_not_exist() {
        let err = StatError::classify(Errno::new(libc::ENOENT));
        assert!(err.is(StatError::DoesNotExist));
        assert_eq!(err.to_string(), "no such file or directory");
    }

    #[test]
    fn test_would_block_variants() {
        assert!(ReadError::classify(Errno::new(libc::EWOULDBLOCK)).is(ReadError::WouldBlock));
        assert!(WriteError::classify(Errno::new(libc::EAGAIN)).is(WriteError::WouldBlock));
        // Same code, different meaning for mmap.
        assert!(MapError::classify(Errno::new(libc::EAGAIN)).is(MapError::Locked));
    }

    #[test]
    fn test_unknown_code_passes_through_each_table() {
        let raw = Errno::new(libc::ECONNRESET);
        assert_eq!(ReadError::classify(raw), SysError::Raw(raw));
        assert_eq!(CloseError::classify(raw), SysError::Raw(raw));
        assert_eq!(HeapError::classify(raw), SysError::Raw(raw));
    }

    #[test]
    fn test_ordinals_follow_declaration_order() {
        assert_eq!(WriteError::WouldBlock.ordinal(), 0);
        assert_eq!(WriteError::BrokenPipe.ordinal(), 11);
        assert_eq!(WriteError::from_ordinal(2), Some(WriteError::NoDestination));
        assert_eq!(HeapError::all_variants(), &[HeapError::OutOfMemory]);
    }
}
