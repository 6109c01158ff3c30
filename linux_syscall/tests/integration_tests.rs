//! Integration tests for the syscall facade
//!
//! These tests run against the real kernel and cover:
//! - Opening, reading, writing and seeking files
//! - Metadata by path, by handle and by link
//! - Polling pipes
//! - Mapping files and anonymous memory

use linux_abi::{
    FileAccessMode, FileCreationFlags, FileDescriptor, FilePermissions, FileStatusFlags,
    FileToPoll, FileType, MapFlags, MapType, MemoryProtection, Poll, SeekWhence,
};
use linux_errors::{MapError, OpenError, PollError, ReadError, SeekError, StatError};
use linux_syscall::{File, Kernel, Native};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

const CONTENTS: &[u8] = b"the quick brown fox jumps over the lazy dog\n";

fn scratch_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CONTENTS).unwrap();
    file.flush().unwrap();
    file
}

fn open_read_only(path: &Path) -> File {
    linux_syscall::open(
        path,
        FileAccessMode::ReadOnly,
        FileCreationFlags::CLOSE_ON_EXECUTE,
        FileStatusFlags::empty(),
        FilePermissions::empty(),
    )
    .unwrap()
}

/// Creates a pipe, returning (read end, write end)
fn pipe() -> (File, File) {
    let mut fds = [0; 2];
    // SAFETY: fds has room for the two descriptors pipe writes.
    let ret = unsafe { libc::pipe(fds.as_mut_ptr()) };
    assert_eq!(ret, 0);
    (
        File::from_descriptor(Native, FileDescriptor(fds[0])),
        File::from_descriptor(Native, FileDescriptor(fds[1])),
    )
}

#[test]
fn test_stat_path_and_handle_agree() {
    let scratch = scratch_file();
    let file = open_read_only(scratch.path());

    let by_path = linux_syscall::stat(scratch.path()).unwrap();
    let by_handle = file.stat().unwrap();
    assert_eq!(by_path.size, CONTENTS.len() as i64);
    assert_eq!(by_path.size, by_handle.size);
    assert_eq!(by_path.index_node, by_handle.index_node);
    assert_eq!(by_path.device, by_handle.device);
    assert!(by_path.is_regular());

    let mut buffer = [0u8; 16];
    let count = file.read(&mut buffer).unwrap();
    assert!(count <= buffer.len());
    assert!(count as i64 <= by_handle.size);
    assert_eq!(&buffer[..count], &CONTENTS[..count]);

    assert!(file.close().is_ok());
    assert!(file.close().is_ok());
}

#[test]
fn test_stat_missing_path_does_not_exist() {
    let err = linux_syscall::stat("./__does_not_exist__").unwrap_err();
    assert!(err.is(StatError::DoesNotExist));
    assert_eq!(err.to_string(), "no such file or directory");
}

#[test]
fn test_stat_link_does_not_follow() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("target");
    let link = dir.path().join("link");
    std::fs::write(&target, CONTENTS).unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let followed = linux_syscall::stat(&link).unwrap();
    assert_eq!(followed.file_type(), Some(FileType::Regular));

    let link_header = linux_syscall::stat_link(&link).unwrap();
    assert!(link_header.is_symbolic_link());
    assert_ne!(link_header.index_node, followed.index_node);
}

#[test]
fn test_stat_reports_directory() {
    let dir = TempDir::new().unwrap();
    let header = linux_syscall::stat(dir.path()).unwrap();
    assert!(header.is_directory());
    assert!(header.permissions.contains(FilePermissions::READABLE_BY_USER));
}

#[test]
fn test_create_write_seek_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("created");
    let file = linux_syscall::open(
        &path,
        FileAccessMode::ReadWrite,
        FileCreationFlags::CREATE_IF_NEEDED | FileCreationFlags::ASSERT_CREATION,
        FileStatusFlags::empty(),
        FilePermissions::default_file(),
    )
    .unwrap();

    assert_eq!(file.write(b"hello world").unwrap(), 11);
    assert_eq!(file.seek(0, SeekWhence::Relative).unwrap(), 11);
    assert_eq!(file.seek(-5, SeekWhence::RelativeToEnd).unwrap(), 6);
    assert_eq!(file.seek(0, SeekWhence::RelativeToStart).unwrap(), 0);

    let mut buffer = [0u8; 32];
    let count = file.read(&mut buffer).unwrap();
    assert_eq!(&buffer[..count], b"hello world");
    assert_eq!(file.read(&mut buffer).unwrap(), 0);

    let header = file.stat().unwrap();
    assert_eq!(header.size, 11);
    let permissions =
        FilePermissions::from_bits_retain(header.permissions.bits() & !FilePermissions::TYPE_MASK);
    // The umask may only clear bits.
    assert!(FilePermissions::default_file().contains(permissions));
}

#[test]
fn test_exclusive_create_of_existing_file() {
    let scratch = scratch_file();
    let err = linux_syscall::open(
        scratch.path(),
        FileAccessMode::WriteOnly,
        FileCreationFlags::CREATE_IF_NEEDED | FileCreationFlags::ASSERT_CREATION,
        FileStatusFlags::empty(),
        FilePermissions::default_file(),
    )
    .unwrap_err();
    assert!(err.is(OpenError::AlreadyExists));
}

#[test]
fn test_open_errors() {
    let dir = TempDir::new().unwrap();

    let err = linux_syscall::open(
        dir.path().join("missing"),
        FileAccessMode::ReadOnly,
        FileCreationFlags::empty(),
        FileStatusFlags::empty(),
        FilePermissions::empty(),
    )
    .unwrap_err();
    assert!(err.is(OpenError::DoesNotExist));

    let err = linux_syscall::open(
        dir.path(),
        FileAccessMode::WriteOnly,
        FileCreationFlags::empty(),
        FileStatusFlags::empty(),
        FilePermissions::empty(),
    )
    .unwrap_err();
    assert!(err.is(OpenError::Directory));

    let scratch = scratch_file();
    let err = linux_syscall::open(
        scratch.path(),
        FileAccessMode::ReadOnly,
        FileCreationFlags::ASSERT_DIRECTORY,
        FileStatusFlags::empty(),
        FilePermissions::empty(),
    )
    .unwrap_err();
    assert!(err.is(OpenError::NotDirectory));
}

#[test]
fn test_read_directory_is_classified() {
    let dir = TempDir::new().unwrap();
    let file = linux_syscall::open(
        dir.path(),
        FileAccessMode::ReadOnly,
        FileCreationFlags::ASSERT_DIRECTORY,
        FileStatusFlags::empty(),
        FilePermissions::empty(),
    )
    .unwrap();
    let mut buffer = [0u8; 8];
    assert!(file.read(&mut buffer).unwrap_err().is(ReadError::Directory));
}

#[test]
fn test_seek_data_and_pipe() {
    let scratch = scratch_file();
    let file = open_read_only(scratch.path());
    assert_eq!(file.seek(0, SeekWhence::Data).unwrap(), 0);
    let err = file.seek(CONTENTS.len() as i64 + 1, SeekWhence::Data).unwrap_err();
    assert!(err.is(SeekError::NotFound));

    let (reader, _writer) = pipe();
    let err = reader.seek(0, SeekWhence::RelativeToStart).unwrap_err();
    assert!(err.is(SeekError::Illegal));
}

#[test]
fn test_poll_empty_list_is_invalid() {
    let err = linux_syscall::poll(&mut [], None).unwrap_err();
    assert!(err.is(PollError::Invalid));
}

#[test]
fn test_poll_pipe_readiness() {
    let (reader, writer) = pipe();
    let mut files = [
        FileToPoll::new(reader.descriptor(), Poll::HAS_READ_AVAILABLE),
        FileToPoll::new(writer.descriptor(), Poll::HAS_WRITE_AVAILABLE),
    ];

    // Only the write end is ready before anything is written.
    assert_eq!(linux_syscall::poll(&mut files, Some(Duration::ZERO)).unwrap(), Some(1));
    assert!(!files[0].is_ready());
    assert!(files[1].result.contains(Poll::HAS_WRITE_AVAILABLE));

    let mut reader_only = [FileToPoll::new(reader.descriptor(), Poll::HAS_READ_AVAILABLE)];
    assert_eq!(
        linux_syscall::poll(&mut reader_only, Some(Duration::from_millis(10))).unwrap(),
        None
    );

    writer.write(b"ping").unwrap();
    assert_eq!(linux_syscall::poll(&mut reader_only, None).unwrap(), Some(0));
    assert!(reader_only[0].result.contains(Poll::HAS_READ_AVAILABLE));
}

#[test]
fn test_map_read_only_file() {
    let scratch = scratch_file();
    let file = open_read_only(scratch.path());
    let mut region = linux_syscall::map_into_memory(
        None,
        CONTENTS.len(),
        MemoryProtection::ALLOW_READS,
        MapType::Private,
        MapFlags::empty(),
        Some(file.descriptor()),
        0,
    )
    .unwrap();
    assert_eq!(region.len(), CONTENTS.len());

    let mut buffer = vec![0u8; CONTENTS.len()];
    assert_eq!(region.read_at(&mut buffer, 0).unwrap(), CONTENTS.len());
    assert_eq!(buffer, CONTENTS);

    let err = region.write_at(b"XXXX", 0).unwrap_err();
    assert!(err.is(MapError::AccessDenied));
    assert_eq!(region.as_slice().unwrap(), CONTENTS);

    region.unmap().unwrap();
}

#[test]
fn test_map_shared_writable_requires_write_access() {
    let scratch = scratch_file();
    let file = open_read_only(scratch.path());
    // SAFETY: the scratch file is private to this test.
    let err = unsafe {
        Native.map_into_memory_unchecked(
            None,
            CONTENTS.len(),
            MemoryProtection::ALLOW_READS | MemoryProtection::ALLOW_WRITES,
            MapType::Shared,
            MapFlags::empty(),
            Some(file.descriptor()),
            0,
        )
    }
    .unwrap_err();
    assert!(err.is(MapError::AccessDenied));
}

#[test]
fn test_map_shared_writes_reach_file() {
    let scratch = scratch_file();
    let file = Native
        .open(
            scratch.path(),
            FileAccessMode::ReadWrite,
            FileCreationFlags::empty(),
            FileStatusFlags::empty(),
            FilePermissions::empty(),
        )
        .unwrap();
    // SAFETY: the scratch file is private to this test, and the region is
    // dropped before the file is read back.
    let mut region = unsafe {
        linux_syscall::map_into_memory_unchecked(
            None,
            CONTENTS.len(),
            MemoryProtection::ALLOW_READS | MemoryProtection::ALLOW_WRITES,
            MapType::Shared,
            MapFlags::empty(),
            Some(file.descriptor()),
            0,
        )
    }
    .unwrap();
    region.write_at(b"THE", 0).unwrap();
    drop(region);

    let mut buffer = [0u8; 3];
    assert_eq!(file.read(&mut buffer).unwrap(), 3);
    assert_eq!(&buffer, b"THE");
}

#[test]
fn test_safe_map_refuses_shared_file_and_exact_address() {
    let scratch = scratch_file();
    let file = open_read_only(scratch.path());
    for kind in [MapType::Shared, MapType::SharedValidateFlags] {
        let err = linux_syscall::map_into_memory(
            None,
            CONTENTS.len(),
            MemoryProtection::ALLOW_READS,
            kind,
            MapFlags::empty(),
            Some(file.descriptor()),
            0,
        )
        .unwrap_err();
        assert!(err.is(MapError::Invalid));
    }

    let mut owned = linux_syscall::heap(linux_syscall::page_size()).unwrap();
    owned.write_at(&[0xAA], 0).unwrap();
    let err = linux_syscall::map_into_memory(
        std::ptr::NonNull::new(owned.as_ptr().cast_mut()),
        linux_syscall::page_size(),
        MemoryProtection::ALLOW_READS,
        MapType::Private,
        MapFlags::EXACT_ADDRESS,
        None,
        0,
    )
    .unwrap_err();
    assert!(err.is(MapError::Invalid));
    assert_eq!(owned.as_slice().unwrap()[0], 0xAA);
}

#[test]
fn test_heap_allocation() {
    let mut heap = linux_syscall::heap(linux_syscall::page_size()).unwrap();
    assert_eq!(heap.write_at(b"scratch", 0).unwrap(), 7);
    assert_eq!(&heap.as_slice().unwrap()[..7], b"scratch");
    heap.unmap().unwrap();
}

#[test]
fn test_file_header_serializes() {
    let scratch = scratch_file();
    let header = linux_syscall::stat(scratch.path()).unwrap();
    let json = serde_json::to_value(header).unwrap();
    assert_eq!(json["size"], CONTENTS.len());
    assert!(json["modified_at"]["seconds"].as_i64().unwrap() > 0);
    assert!(json.get("reserved").is_none());
}
