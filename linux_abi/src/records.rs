//! # ABI Records
//!
//! Value types the kernel writes into directly. Each one is `#[repr(C)]`
//! and carries explicit reserved fields wherever the native structure has
//! padding, so that size, alignment and field order match the kernel's own
//! definition on the supported architectures.
//!
//! Constructing a record with arbitrary field values is always legal; only
//! the shape is constrained.

use crate::field;
use crate::flags::{FilePermissions, FileType, Poll};
use crate::layout::{AbiShape, NativeRecord, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte counts and offsets, as the kernel reports them
pub type Bytes = i64;

/// Largest number of bytes a single read or write transfers
pub const MAX_READ: Bytes = 0x7fff_f000;

/// Identifies an open file for the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct FileDescriptor(pub i32);

impl FileDescriptor {
    /// Resolve relative paths against the working directory (`AT_FDCWD`)
    pub const RELATIVE_TO_WORKING_DIRECTORY: FileDescriptor = FileDescriptor(-100);

    pub const STDIN: FileDescriptor = FileDescriptor(0);
    pub const STDOUT: FileDescriptor = FileDescriptor(1);
    pub const STDERR: FileDescriptor = FileDescriptor(2);

    /// Returns the raw descriptor number
    pub const fn as_raw(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd:{}", self.0)
    }
}

/// Device a file lives on (`dev_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct DeviceId(pub u64);

impl DeviceId {
    /// Major number, using the kernel's 64-bit encoding
    pub fn major(&self) -> u32 {
        (((self.0 >> 32) & 0xffff_f000) | ((self.0 >> 8) & 0x0000_0fff)) as u32
    }

    /// Minor number, using the kernel's 64-bit encoding
    pub fn minor(&self) -> u32 {
        (((self.0 >> 12) & 0xffff_ff00) | (self.0 & 0x0000_00ff)) as u32
    }
}

/// Index node number (`ino_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct IndexNode(pub u64);

/// Owning user (`uid_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct UserId(pub u32);

/// Owning group (`gid_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct GroupId(pub u32);

macro_rules! transparent_shape {
    ($($ty:ty => $inner:ty),* $(,)?) => {
        $(
            impl AbiShape for $ty {
                fn shape() -> Shape {
                    <$inner>::shape()
                }
            }
        )*
    };
}

transparent_shape! {
    FileDescriptor => i32,
    DeviceId => u64,
    IndexNode => u64,
    UserId => u32,
    GroupId => u32,
}

/// A point in time, seconds plus nanoseconds (`struct timespec`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct Time {
    pub seconds: i64,
    pub nanos: i64,
}

impl Time {
    pub const fn new(seconds: i64, nanos: i64) -> Self {
        Self { seconds, nanos }
    }

    /// Converts to a duration since the epoch, if the time is not negative
    pub fn to_duration(&self) -> Option<std::time::Duration> {
        let seconds = u64::try_from(self.seconds).ok()?;
        let nanos = u32::try_from(self.nanos).ok()?;
        if nanos >= 1_000_000_000 {
            return None;
        }
        Some(std::time::Duration::new(seconds, nanos))
    }
}

impl From<std::time::Duration> for Time {
    fn from(duration: std::time::Duration) -> Self {
        Self {
            seconds: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
            nanos: i64::from(duration.subsec_nanos()),
        }
    }
}

impl AbiShape for Time {
    fn shape() -> Shape {
        Shape::record::<Self>(vec![field!(Time, seconds), field!(Time, nanos)])
    }
}

impl NativeRecord for Time {
    const NATIVE: &'static str = "struct timespec";
}

/// Metadata the filesystem records for a file (`struct stat`)
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct FileHeader {
    pub device: DeviceId,
    pub index_node: IndexNode,
    pub hard_links: u64,
    pub permissions: FilePermissions,
    pub user: UserId,
    pub group: GroupId,
    #[serde(skip)]
    pub reserved0: i32,
    /// Device this file represents, for device special files
    pub special: DeviceId,
    pub size: Bytes,
    /// Preferred block size for I/O
    pub block_size: i64,
    /// Number of 512-byte blocks allocated
    pub block_count: i64,
    pub accessed_at: Time,
    pub modified_at: Time,
    pub modified_metadata_at: Time,
    #[serde(skip)]
    pub reserved: [i64; 3],
}

/// Metadata the filesystem records for a file (`struct stat`)
#[cfg(target_arch = "aarch64")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct FileHeader {
    pub device: DeviceId,
    pub index_node: IndexNode,
    pub permissions: FilePermissions,
    pub hard_links: u32,
    pub user: UserId,
    pub group: GroupId,
    /// Device this file represents, for device special files
    pub special: DeviceId,
    #[serde(skip)]
    pub reserved0: u64,
    pub size: Bytes,
    /// Preferred block size for I/O
    pub block_size: i32,
    #[serde(skip)]
    pub reserved1: i32,
    /// Number of 512-byte blocks allocated
    pub block_count: i64,
    pub accessed_at: Time,
    pub modified_at: Time,
    pub modified_metadata_at: Time,
    #[serde(skip)]
    pub reserved: [u32; 2],
}

impl FileHeader {
    /// File type encoded in the mode word
    pub fn file_type(&self) -> Option<FileType> {
        self.permissions.file_type()
    }

    pub fn is_regular(&self) -> bool {
        self.file_type() == Some(FileType::Regular)
    }

    pub fn is_directory(&self) -> bool {
        self.file_type() == Some(FileType::Directory)
    }

    pub fn is_symbolic_link(&self) -> bool {
        self.file_type() == Some(FileType::SymbolicLink)
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        // SAFETY: every field is an integer, an integer newtype or an
        // array/record of those; the all-zero bit pattern is valid for each.
        unsafe { core::mem::zeroed() }
    }
}

#[cfg(target_arch = "x86_64")]
impl AbiShape for FileHeader {
    fn shape() -> Shape {
        Shape::record::<Self>(vec![
            field!(FileHeader, device),
            field!(FileHeader, index_node),
            field!(FileHeader, hard_links),
            field!(FileHeader, permissions),
            field!(FileHeader, user),
            field!(FileHeader, group),
            field!(FileHeader, reserved reserved0),
            field!(FileHeader, special),
            field!(FileHeader, size),
            field!(FileHeader, block_size),
            field!(FileHeader, block_count),
            field!(FileHeader, accessed_at),
            field!(FileHeader, modified_at),
            field!(FileHeader, modified_metadata_at),
            field!(FileHeader, reserved reserved),
        ])
    }
}

#[cfg(target_arch = "aarch64")]
impl AbiShape for FileHeader {
    fn shape() -> Shape {
        Shape::record::<Self>(vec![
            field!(FileHeader, device),
            field!(FileHeader, index_node),
            field!(FileHeader, permissions),
            field!(FileHeader, hard_links),
            field!(FileHeader, user),
            field!(FileHeader, group),
            field!(FileHeader, special),
            field!(FileHeader, reserved reserved0),
            field!(FileHeader, size),
            field!(FileHeader, block_size),
            field!(FileHeader, reserved reserved1),
            field!(FileHeader, block_count),
            field!(FileHeader, accessed_at),
            field!(FileHeader, modified_at),
            field!(FileHeader, modified_metadata_at),
            field!(FileHeader, reserved reserved),
        ])
    }
}

impl NativeRecord for FileHeader {
    const NATIVE: &'static str = "struct stat";
}

/// A descriptor to wait on, with requested and observed events (`struct pollfd`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct FileToPoll {
    pub file: FileDescriptor,
    /// Events to wait for
    pub notify: Poll,
    /// Events observed; filled in by poll
    pub result: Poll,
}

impl FileToPoll {
    pub const fn new(file: FileDescriptor, notify: Poll) -> Self {
        Self {
            file,
            notify,
            result: Poll::empty(),
        }
    }

    /// Returns true if poll observed any event on this descriptor
    pub fn is_ready(&self) -> bool {
        !self.result.is_empty()
    }
}

impl AbiShape for FileToPoll {
    fn shape() -> Shape {
        Shape::record::<Self>(vec![
            field!(FileToPoll, file),
            field!(FileToPoll, notify),
            field!(FileToPoll, result),
        ])
    }
}

impl NativeRecord for FileToPoll {
    const NATIVE: &'static str = "struct pollfd";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Kind;
    use core::mem::{align_of, size_of};

    #[test]
    fn test_time_layout() {
        assert_eq!(size_of::<Time>(), 16);
        assert_eq!(align_of::<Time>(), 8);
        let shape = Time::shape();
        assert_eq!(shape.fields[1].offset, 8);
        assert_eq!(shape.fields[1].shape.kind, Kind::Signed);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_file_header_layout() {
        assert_eq!(size_of::<FileHeader>(), 144);
        assert_eq!(align_of::<FileHeader>(), 8);
        let shape = FileHeader::shape();
        let size = shape.fields.iter().find(|f| f.name == "size").unwrap();
        assert_eq!(size.offset, 48);
        let accessed = shape.fields.iter().find(|f| f.name == "accessed_at").unwrap();
        assert_eq!(accessed.offset, 72);
        assert_eq!(accessed.shape.kind, Kind::Struct);
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn test_file_header_layout() {
        assert_eq!(size_of::<FileHeader>(), 128);
        assert_eq!(align_of::<FileHeader>(), 8);
        let shape = FileHeader::shape();
        let size = shape.fields.iter().find(|f| f.name == "size").unwrap();
        assert_eq!(size.offset, 48);
    }

    #[test]
    fn test_file_header_leaves_cover_record() {
        let shape = FileHeader::shape();
        let covered: usize = shape.leaves().iter().map(|l| l.bits / 8).sum();
        assert_eq!(covered, shape.size);
    }

    #[test]
    fn test_poll_descriptor_layout() {
        assert_eq!(size_of::<FileToPoll>(), 8);
        assert_eq!(align_of::<FileToPoll>(), 4);
        let leaves = FileToPoll::shape().leaves();
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[0].bits, 32);
        assert_eq!(leaves[2].offset, 6);
        assert_eq!(leaves[2].bits, 16);
    }

    #[test]
    fn test_poll_descriptor_readiness() {
        let mut entry = FileToPoll::new(FileDescriptor::STDIN, Poll::HAS_READ_AVAILABLE);
        assert!(!entry.is_ready());
        entry.result = Poll::HAS_READ_AVAILABLE;
        assert!(entry.is_ready());
    }

    #[test]
    fn test_time_duration_conversion() {
        let time = Time::new(3, 500);
        assert_eq!(
            time.to_duration(),
            Some(std::time::Duration::new(3, 500))
        );
        assert_eq!(Time::new(-1, 0).to_duration(), None);
        assert_eq!(Time::from(std::time::Duration::from_millis(1500)), Time::new(1, 500_000_000));
    }

    #[test]
    fn test_huge_duration_saturates() {
        let time = Time::from(std::time::Duration::from_secs(u64::MAX));
        assert_eq!(time.seconds, i64::MAX);
        assert_eq!(time.nanos, 0);
    }

    #[test]
    fn test_device_id_split() {
        // makedev(8, 1)
        let dev = DeviceId((8 << 8) | 1);
        assert_eq!(dev.major(), 8);
        assert_eq!(dev.minor(), 1);
    }

    #[test]
    fn test_file_header_default_is_zeroed() {
        let header = FileHeader::default();
        assert_eq!(header.size, 0);
        assert_eq!(header.file_type(), None);
        assert!(!header.is_regular());
    }

    #[test]
    fn test_file_header_serializes_semantic_names() {
        let mut header = FileHeader::default();
        header.size = 42;
        header.permissions = FilePermissions::from_bits_retain(0o100644);
        header.modified_at = Time::new(7, 8);

        let json = serde_json::to_value(header).unwrap();
        assert_eq!(json["size"], 42);
        assert_eq!(json["modified_at"]["seconds"], 7);
        assert!(json.get("reserved").is_none());
        assert!(json.get("index_node").is_some());
    }

    #[test]
    fn test_descriptor_display() {
        assert_eq!(FileDescriptor(3).to_string(), "fd:3");
        assert_eq!(FileDescriptor::RELATIVE_TO_WORKING_DIRECTORY.as_raw(), -100);
    }
}
