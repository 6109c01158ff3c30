//! # Flags and Enumerations
//!
//! Named values for every flag word the syscall facade passes to the
//! kernel. Flag sets compose with bitwise OR; access modes, mapping types
//! and seek origins are exclusive and modelled as enums.
//!
//! Every value equals the kernel's own constant; each type lists the
//! native macro it mirrors through [`NativeConstants`].

use crate::layout::{AbiShape, NativeConstant, NativeConstants, Shape};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// Flag values that differ between the x86_64 and asm-generic ABIs.
#[cfg(target_arch = "x86_64")]
mod arch {
    pub const O_DIRECT: i32 = 0o40000;
    pub const O_DIRECTORY: i32 = 0o200000;
    pub const O_NOFOLLOW: i32 = 0o400000;
}

#[cfg(target_arch = "aarch64")]
mod arch {
    pub const O_DIRECTORY: i32 = 0o40000;
    pub const O_NOFOLLOW: i32 = 0o100000;
    pub const O_DIRECT: i32 = 0o200000;
}

const O_TMPFILE_BASE: i32 = 0o20000000;

bitflags! {
    /// Flags that only affect how [`open`] resolves and creates the file
    ///
    /// [`open`]: https://man7.org/linux/man-pages/man2/open.2.html
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FileCreationFlags: i32 {
        /// Close the descriptor automatically across `execve`.
        const CLOSE_ON_EXECUTE = 0o2000000;
        /// Create a regular file if the path does not exist.
        const CREATE_IF_NEEDED = 0o100;
        /// Fail unless the path is a directory.
        const ASSERT_DIRECTORY = arch::O_DIRECTORY;
        /// Fail if the file already exists (with `CREATE_IF_NEEDED`).
        const ASSERT_CREATION = 0o200;
        /// A terminal device never becomes the controlling terminal.
        const IS_NOT_THE_TERMINAL = 0o400;
        /// Fail if the trailing path component is a symbolic link.
        const TRAP_SYMBOLIC_LINK = arch::O_NOFOLLOW;
        /// Create an unnamed temporary file inside the given directory.
        const TEMPORARY_INSIDE = O_TMPFILE_BASE | arch::O_DIRECTORY;
        /// Truncate an existing regular file to length zero.
        const TRUNCATED_TO_ZERO = 0o1000;
    }
}

bitflags! {
    /// Flags that affect subsequent I/O on the opened descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FileStatusFlags: i32 {
        /// Every write appends atomically at end of file.
        const APPEND = 0o2000;
        /// Signal-driven I/O.
        const ASYNC = 0o20000;
        /// Bypass the page cache where possible.
        const DIRECT = arch::O_DIRECT;
        /// Writes complete with synchronized data integrity.
        const SYNC_DATA = 0o10000;
        /// Reads leave the access time untouched.
        const DO_NOT_UPDATE_ACCESS_TIME = 0o1000000;
        /// Reads and writes return "would block" instead of waiting.
        const NON_BLOCKING = 0o4000;
        /// Reference-only descriptor; reads and writes fail.
        const PATH = 0o10000000;
        /// Writes complete with synchronized file integrity.
        const SYNC = 0o4010000;
    }
}

bitflags! {
    /// Permission bits of a file mode
    ///
    /// The kernel reports the file type in the high bits of the same word;
    /// those bits are retained untouched, see [`FileType`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FilePermissions: u32 {
        const READABLE_BY_USER = 0o400;
        const WRITABLE_BY_USER = 0o200;
        const EXECUTABLE_BY_USER = 0o100;

        const READABLE_BY_GROUP = 0o40;
        const WRITABLE_BY_GROUP = 0o20;
        const EXECUTABLE_BY_GROUP = 0o10;

        const READABLE_BY_OTHERS = 0o4;
        const WRITABLE_BY_OTHERS = 0o2;
        const EXECUTABLE_BY_OTHERS = 0o1;

        /// Executes with the file owner's user ID.
        const EXECUTES_AS_OWNER = 0o4000;
        /// Executes with the file's group ID.
        const EXECUTES_AS_GROUP = 0o2000;

        /// Directories only: new files inherit the directory's group.
        const FILES_INHERIT_GROUP = 0o2000;
        /// Directories only: entries may only be renamed or removed by their owner.
        const FILES_LOCKED_TO_OWNER = 0o1000;

        const DIRECTORY_SEARCHABLE_BY_USER = 0o100;
        const DIRECTORY_SEARCHABLE_BY_GROUP = 0o10;
        const DIRECTORY_SEARCHABLE_BY_OTHERS = 0o1;
    }
}

impl FilePermissions {
    /// Read and write for the owner, read for everyone else (0644)
    pub const fn default_file() -> Self {
        Self::from_bits_retain(0o644)
    }

    /// Mask of the file type bits sharing the mode word
    pub const TYPE_MASK: u32 = 0o170000;

    /// File type encoded in the mode word, if any
    pub fn file_type(&self) -> Option<FileType> {
        FileType::from_mode(self.bits())
    }
}

/// File type stored in the high bits of a file mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum FileType {
    Fifo = 0o010000,
    CharacterDevice = 0o020000,
    Directory = 0o040000,
    BlockDevice = 0o060000,
    Regular = 0o100000,
    SymbolicLink = 0o120000,
    Socket = 0o140000,
}

impl FileType {
    /// Decodes the type bits of a raw mode word
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode & FilePermissions::TYPE_MASK {
            0o010000 => Some(Self::Fifo),
            0o020000 => Some(Self::CharacterDevice),
            0o040000 => Some(Self::Directory),
            0o060000 => Some(Self::BlockDevice),
            0o100000 => Some(Self::Regular),
            0o120000 => Some(Self::SymbolicLink),
            0o140000 => Some(Self::Socket),
            _ => None,
        }
    }
}

/// Access mode requested when opening a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum FileAccessMode {
    ReadOnly = 0,
    WriteOnly = 1,
    ReadWrite = 2,
}

impl FileAccessMode {
    pub fn can_read(&self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

bitflags! {
    /// Access permitted to mapped memory
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MemoryProtection: i32 {
        /// No access at all.
        const NOT_ACCESSIBLE = 0x0;
        const ALLOW_READS = 0x1;
        const ALLOW_WRITES = 0x2;
        const ALLOW_EXECUTION = 0x4;
        /// Memory may be used for atomic operations.
        const ALLOW_ATOMICS = 0x8;
    }
}

impl MemoryProtection {
    pub fn can_read(&self) -> bool {
        self.contains(Self::ALLOW_READS)
    }

    pub fn can_write(&self) -> bool {
        self.contains(Self::ALLOW_WRITES)
    }
}

/// How changes to a mapping are shared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum MapType {
    /// Writes are carried through to the file and visible to other mappings.
    Shared = 0x01,
    /// Copy-on-write; writes stay private to this mapping.
    Private = 0x02,
    /// Like `Shared`, but unknown flags are rejected instead of ignored.
    SharedValidateFlags = 0x03,
}

bitflags! {
    /// Modifiers for a memory mapping
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MapFlags: i32 {
        /// Not backed by a file; contents start zeroed.
        const ANONYMOUS = 0x20;
        /// Place the mapping in the first 2GB of the address space.
        #[cfg(target_arch = "x86_64")]
        const THIRTY_TWO_BIT = 0x40;
        /// Use the address hint exactly, replacing existing mappings.
        const EXACT_ADDRESS = 0x10;
        /// Use the address hint exactly, failing if it is already mapped.
        const EXACT_ADDRESS_ONCE = 0x100000;
        /// Touching the guard page grows the mapping downwards.
        const GROWS_DOWN = 0x100;
        const HUGE_TABLES = 0x40000;
        const HUGE_2MB = 21 << 26;
        const HUGE_1GB = 30 << 26;
        /// Lock the pages in physical memory.
        const KEEP_AWAY_FROM_SWAP = 0x2000;
        const DO_NOT_RESERVE_SWAP = 0x4000;
        /// Prefault the whole mapping.
        const POPULATE = 0x8000;
        const STACK = 0x20000;
        /// Direct mapping of persistent memory (needs `SharedValidateFlags`).
        const SYNC = 0x80000;
        /// Skip zeroing of anonymous pages, if the kernel allows it.
        const UNINITIALIZED = 0x4000000;
    }
}

bitflags! {
    /// Readiness events requested from, and reported by, poll
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Poll: i16 {
        const HAS_READ_AVAILABLE = 0x001;
        const HAS_PRIORITY = 0x002;
        const HAS_WRITE_AVAILABLE = 0x004;
        /// Peer shut down its writing half.
        const HAS_PEER_FINISHED_WRITING = 0x2000;
        /// Peer closed the connection.
        const HAS_PEER_CONNECTION_CLOSED = 0x010;

        /// Only ever reported, never requested.
        const HAS_ERROR = 0x008;
        /// Only ever reported: the descriptor is not open.
        const HAS_INVALID_REQUEST = 0x020;
    }
}

/// Origin of a seek offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum SeekWhence {
    RelativeToStart = 0,
    /// Relative to the current offset.
    Relative = 1,
    RelativeToEnd = 2,
    /// Next region holding data at or after the offset.
    Data = 3,
    /// Next hole at or after the offset.
    Hole = 4,
}

macro_rules! bits_shape {
    ($($ty:ty => $bits:ty),* $(,)?) => {
        $(
            impl AbiShape for $ty {
                fn shape() -> Shape {
                    <$bits>::shape()
                }
            }
        )*
    };
}

bits_shape! {
    FileCreationFlags => i32,
    FileStatusFlags => i32,
    FilePermissions => u32,
    MemoryProtection => i32,
    MapFlags => i32,
    Poll => i16,
}

macro_rules! flag_constants {
    ($ty:ident { $($(#[$attr:meta])* $name:ident => $native:literal),* $(,)? }) => {
        impl NativeConstants for $ty {
            const NATIVE: &'static [NativeConstant] = &[
                $(
                    $(#[$attr])*
                    NativeConstant::new(stringify!($name), $native, $ty::$name.bits() as i64),
                )*
            ];
        }
    };
}

macro_rules! enum_constants {
    ($ty:ident { $($name:ident => $native:literal),* $(,)? }) => {
        impl NativeConstants for $ty {
            const NATIVE: &'static [NativeConstant] = &[
                $(NativeConstant::new(stringify!($name), $native, $ty::$name as i64),)*
            ];
        }
    };
}

flag_constants!(FileCreationFlags {
    CLOSE_ON_EXECUTE => "O_CLOEXEC",
    CREATE_IF_NEEDED => "O_CREAT",
    ASSERT_DIRECTORY => "O_DIRECTORY",
    ASSERT_CREATION => "O_EXCL",
    IS_NOT_THE_TERMINAL => "O_NOCTTY",
    TRAP_SYMBOLIC_LINK => "O_NOFOLLOW",
    TEMPORARY_INSIDE => "O_TMPFILE",
    TRUNCATED_TO_ZERO => "O_TRUNC",
});

flag_constants!(FileStatusFlags {
    APPEND => "O_APPEND",
    ASYNC => "FASYNC",
    DIRECT => "O_DIRECT",
    SYNC_DATA => "O_DSYNC",
    DO_NOT_UPDATE_ACCESS_TIME => "O_NOATIME",
    NON_BLOCKING => "O_NONBLOCK",
    PATH => "O_PATH",
    SYNC => "O_SYNC",
});

flag_constants!(FilePermissions {
    READABLE_BY_USER => "S_IRUSR",
    WRITABLE_BY_USER => "S_IWUSR",
    EXECUTABLE_BY_USER => "S_IXUSR",
    READABLE_BY_GROUP => "S_IRGRP",
    WRITABLE_BY_GROUP => "S_IWGRP",
    EXECUTABLE_BY_GROUP => "S_IXGRP",
    READABLE_BY_OTHERS => "S_IROTH",
    WRITABLE_BY_OTHERS => "S_IWOTH",
    EXECUTABLE_BY_OTHERS => "S_IXOTH",
    EXECUTES_AS_OWNER => "S_ISUID",
    EXECUTES_AS_GROUP => "S_ISGID",
    FILES_INHERIT_GROUP => "S_ISGID",
    FILES_LOCKED_TO_OWNER => "S_ISVTX",
    DIRECTORY_SEARCHABLE_BY_USER => "S_IXUSR",
    DIRECTORY_SEARCHABLE_BY_GROUP => "S_IXGRP",
    DIRECTORY_SEARCHABLE_BY_OTHERS => "S_IXOTH",
});

flag_constants!(MemoryProtection {
    NOT_ACCESSIBLE => "PROT_NONE",
    ALLOW_READS => "PROT_READ",
    ALLOW_WRITES => "PROT_WRITE",
    ALLOW_EXECUTION => "PROT_EXEC",
    ALLOW_ATOMICS => "PROT_SEM",
});

flag_constants!(MapFlags {
    ANONYMOUS => "MAP_ANONYMOUS",
    #[cfg(target_arch = "x86_64")]
    THIRTY_TWO_BIT => "MAP_32BIT",
    EXACT_ADDRESS => "MAP_FIXED",
    EXACT_ADDRESS_ONCE => "MAP_FIXED_NOREPLACE",
    GROWS_DOWN => "MAP_GROWSDOWN",
    HUGE_TABLES => "MAP_HUGETLB",
    HUGE_2MB => "MAP_HUGE_2MB",
    HUGE_1GB => "MAP_HUGE_1GB",
    KEEP_AWAY_FROM_SWAP => "MAP_LOCKED",
    DO_NOT_RESERVE_SWAP => "MAP_NORESERVE",
    POPULATE => "MAP_POPULATE",
    STACK => "MAP_STACK",
    SYNC => "MAP_SYNC",
    UNINITIALIZED => "MAP_UNINITIALIZED",
});

flag_constants!(Poll {
    HAS_READ_AVAILABLE => "POLLIN",
    HAS_PRIORITY => "POLLPRI",
    HAS_WRITE_AVAILABLE => "POLLOUT",
    HAS_PEER_FINISHED_WRITING => "POLLRDHUP",
    HAS_PEER_CONNECTION_CLOSED => "POLLHUP",
    HAS_ERROR => "POLLERR",
    HAS_INVALID_REQUEST => "POLLNVAL",
});

enum_constants!(FileAccessMode {
    ReadOnly => "O_RDONLY",
    WriteOnly => "O_WRONLY",
    ReadWrite => "O_RDWR",
});

enum_constants!(MapType {
    Shared => "MAP_SHARED",
    Private => "MAP_PRIVATE",
    SharedValidateFlags => "MAP_SHARED_VALIDATE",
});

enum_constants!(SeekWhence {
    RelativeToStart => "SEEK_SET",
    Relative => "SEEK_CUR",
    RelativeToEnd => "SEEK_END",
    Data => "SEEK_DATA",
    Hole => "SEEK_HOLE",
});

enum_constants!(FileType {
    Fifo => "S_IFIFO",
    CharacterDevice => "S_IFCHR",
    Directory => "S_IFDIR",
    BlockDevice => "S_IFBLK",
    Regular => "S_IFREG",
    SymbolicLink => "S_IFLNK",
    Socket => "S_IFSOCK",
});
