//! Record layout conformance
//!
//! Native shapes are described from the `libc` definitions with the same
//! field projection the records themselves use. Native padding fields are
//! private and therefore left out; the comparison flattens both sides and
//! requires our reserved fields to fill exactly the gaps.

use linux_abi::{field, Shape};

/// Shape of `struct timespec`
pub fn native_timespec() -> Shape {
    Shape::record::<libc::timespec>(vec![
        field!(libc::timespec, tv_sec),
        field!(libc::timespec, tv_nsec),
    ])
}

/// Shape of `struct pollfd`
pub fn native_pollfd() -> Shape {
    Shape::record::<libc::pollfd>(vec![
        field!(libc::pollfd, fd),
        field!(libc::pollfd, events),
        field!(libc::pollfd, revents),
    ])
}

/// Shape of the visible fields of `struct stat`
#[cfg(target_arch = "x86_64")]
pub fn native_stat() -> Shape {
    Shape::record::<libc::stat>(vec![
        field!(libc::stat, st_dev),
        field!(libc::stat, st_ino),
        field!(libc::stat, st_nlink),
        field!(libc::stat, st_mode),
        field!(libc::stat, st_uid),
        field!(libc::stat, st_gid),
        field!(libc::stat, st_rdev),
        field!(libc::stat, st_size),
        field!(libc::stat, st_blksize),
        field!(libc::stat, st_blocks),
        field!(libc::stat, st_atime),
        field!(libc::stat, st_atime_nsec),
        field!(libc::stat, st_mtime),
        field!(libc::stat, st_mtime_nsec),
        field!(libc::stat, st_ctime),
        field!(libc::stat, st_ctime_nsec),
    ])
}

/// Shape of the visible fields of `struct stat`
#[cfg(target_arch = "aarch64")]
pub fn native_stat() -> Shape {
    Shape::record::<libc::stat>(vec![
        field!(libc::stat, st_dev),
        field!(libc::stat, st_ino),
        field!(libc::stat, st_mode),
        field!(libc::stat, st_nlink),
        field!(libc::stat, st_uid),
        field!(libc::stat, st_gid),
        field!(libc::stat, st_rdev),
        field!(libc::stat, st_size),
        field!(libc::stat, st_blksize),
        field!(libc::stat, st_blocks),
        field!(libc::stat, st_atime),
        field!(libc::stat, st_atime_nsec),
        field!(libc::stat, st_mtime),
        field!(libc::stat, st_mtime_nsec),
        field!(libc::stat, st_ctime),
        field!(libc::stat, st_ctime_nsec),
    ])
}
