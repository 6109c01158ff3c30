//! # Linux ABI
//!
//! This crate defines the value types exchanged with the Linux kernel by the
//! syscall facade.
//!
//! ## Philosophy
//!
//! - **Bit-compatible, not translated**: the kernel writes directly into
//!   these records; there is no conversion step on the way out.
//! - **Named, not numeric**: every flag word is a typed set of named bits.
//! - **Verifiable layout**: every type describes its own shape so the
//!   layout can be checked against the native definitions instead of being
//!   trusted by convention.
//!
//! ## Key Types
//!
//! - [`FileHeader`], [`Time`], [`FileToPoll`]: kernel records
//! - [`FileCreationFlags`], [`FileStatusFlags`], [`FilePermissions`],
//!   [`MemoryProtection`], [`MapFlags`], [`Poll`]: flag sets
//! - [`FileAccessMode`], [`MapType`], [`SeekWhence`]: exclusive enumerations
//! - [`AbiShape`], [`NativeConstants`]: layout and constant introspection
//!
//! ## Non-Goals
//!
//! Only the Linux ABI on x86_64 and aarch64 is mirrored.

#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
compile_error!("linux_abi mirrors the Linux ABI on x86_64 and aarch64 only");

pub mod flags;
pub mod layout;
pub mod records;

pub use flags::{
    FileAccessMode, FileCreationFlags, FilePermissions, FileStatusFlags, FileType, MapFlags,
    MapType, MemoryProtection, Poll, SeekWhence,
};
pub use layout::{AbiShape, Field, Kind, Leaf, NativeConstant, NativeConstants, NativeRecord, Shape};
pub use records::{
    Bytes, DeviceId, FileDescriptor, FileHeader, FileToPoll, GroupId, IndexNode, Time, UserId,
    MAX_READ,
};
