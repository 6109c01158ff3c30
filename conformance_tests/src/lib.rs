//! # ABI Conformance Tests
//!
//! This crate checks the typed facade against the C library's own
//! definitions so the mirrored values cannot drift silently.
//!
//! ## Philosophy
//!
//! - **Native reference**: `libc` is the source of truth; nothing here
//!   restates a kernel value by hand unless `libc` does not export it
//! - **Exhaustive**: every declared constant, record and error row is checked
//! - **Validation only**: the runtime crates never depend on this one
//!
//! ## Structure
//!
//! - `constants`: every flag and enumeration value equals its native macro
//! - `layouts`: every record matches its native structure
//! - `messages`: every error row's text equals the C library's description

pub mod constants;
pub mod layouts;
pub mod messages;

/// Common helpers for conformance checks
pub mod test_helpers {
    use linux_abi::{Leaf, NativeConstants, NativeRecord, Shape};
    use std::ffi::CStr;

    /// `PROT_SEM`, which `libc` does not export
    const PROT_SEM: i64 = 0x8;
    /// `MAP_UNINITIALIZED`, which `libc` does not export
    const MAP_UNINITIALIZED: i64 = 0x400_0000;
    /// `MAP_SYNC`, which `libc` does not export on every target
    const MAP_SYNC: i64 = 0x8_0000;

    /// Value of a native macro, as the C library defines it
    pub fn native_constant(native: &str) -> Option<i64> {
        let value = match native {
            "O_RDONLY" => libc::O_RDONLY as i64,
            "O_WRONLY" => libc::O_WRONLY as i64,
            "O_RDWR" => libc::O_RDWR as i64,
            "O_CLOEXEC" => libc::O_CLOEXEC as i64,
            "O_CREAT" => libc::O_CREAT as i64,
            "O_DIRECTORY" => libc::O_DIRECTORY as i64,
            "O_EXCL" => libc::O_EXCL as i64,
            "O_NOCTTY" => libc::O_NOCTTY as i64,
            "O_NOFOLLOW" => libc::O_NOFOLLOW as i64,
            "O_TMPFILE" => libc::O_TMPFILE as i64,
            "O_TRUNC" => libc::O_TRUNC as i64,
            "O_APPEND" => libc::O_APPEND as i64,
            "FASYNC" => libc::O_ASYNC as i64,
            "O_DIRECT" => libc::O_DIRECT as i64,
            "O_DSYNC" => libc::O_DSYNC as i64,
            "O_NOATIME" => libc::O_NOATIME as i64,
            "O_NONBLOCK" => libc::O_NONBLOCK as i64,
            "O_PATH" => libc::O_PATH as i64,
            "O_SYNC" => libc::O_SYNC as i64,

            "S_IRUSR" => libc::S_IRUSR as i64,
            "S_IWUSR" => libc::S_IWUSR as i64,
            "S_IXUSR" => libc::S_IXUSR as i64,
            "S_IRGRP" => libc::S_IRGRP as i64,
            "S_IWGRP" => libc::S_IWGRP as i64,
            "S_IXGRP" => libc::S_IXGRP as i64,
            "S_IROTH" => libc::S_IROTH as i64,
            "S_IWOTH" => libc::S_IWOTH as i64,
            "S_IXOTH" => libc::S_IXOTH as i64,
            "S_ISUID" => libc::S_ISUID as i64,
            "S_ISGID" => libc::S_ISGID as i64,
            "S_ISVTX" => libc::S_ISVTX as i64,
            "S_IFIFO" => libc::S_IFIFO as i64,
            "S_IFCHR" => libc::S_IFCHR as i64,
            "S_IFDIR" => libc::S_IFDIR as i64,
            "S_IFBLK" => libc::S_IFBLK as i64,
            "S_IFREG" => libc::S_IFREG as i64,
            "S_IFLNK" => libc::S_IFLNK as i64,
            "S_IFSOCK" => libc::S_IFSOCK as i64,

            "PROT_NONE" => libc::PROT_NONE as i64,
            "PROT_READ" => libc::PROT_READ as i64,
            "PROT_WRITE" => libc::PROT_WRITE as i64,
            "PROT_EXEC" => libc::PROT_EXEC as i64,
            "PROT_SEM" => PROT_SEM,

            "MAP_SHARED" => libc::MAP_SHARED as i64,
            "MAP_PRIVATE" => libc::MAP_PRIVATE as i64,
            "MAP_SHARED_VALIDATE" => libc::MAP_SHARED_VALIDATE as i64,
            "MAP_ANONYMOUS" => libc::MAP_ANONYMOUS as i64,
            #[cfg(target_arch = "x86_64")]
            "MAP_32BIT" => libc::MAP_32BIT as i64,
            "MAP_FIXED" => libc::MAP_FIXED as i64,
            "MAP_FIXED_NOREPLACE" => libc::MAP_FIXED_NOREPLACE as i64,
            "MAP_GROWSDOWN" => libc::MAP_GROWSDOWN as i64,
            "MAP_HUGETLB" => libc::MAP_HUGETLB as i64,
            "MAP_HUGE_2MB" => libc::MAP_HUGE_2MB as i64,
            "MAP_HUGE_1GB" => libc::MAP_HUGE_1GB as i64,
            "MAP_LOCKED" => libc::MAP_LOCKED as i64,
            "MAP_NORESERVE" => libc::MAP_NORESERVE as i64,
            "MAP_POPULATE" => libc::MAP_POPULATE as i64,
            "MAP_STACK" => libc::MAP_STACK as i64,
            "MAP_SYNC" => MAP_SYNC,
            "MAP_UNINITIALIZED" => MAP_UNINITIALIZED,

            "POLLIN" => libc::POLLIN as i64,
            "POLLPRI" => libc::POLLPRI as i64,
            "POLLOUT" => libc::POLLOUT as i64,
            "POLLRDHUP" => libc::POLLRDHUP as i64,
            "POLLHUP" => libc::POLLHUP as i64,
            "POLLERR" => libc::POLLERR as i64,
            "POLLNVAL" => libc::POLLNVAL as i64,

            "SEEK_SET" => libc::SEEK_SET as i64,
            "SEEK_CUR" => libc::SEEK_CUR as i64,
            "SEEK_END" => libc::SEEK_END as i64,
            "SEEK_DATA" => libc::SEEK_DATA as i64,
            "SEEK_HOLE" => libc::SEEK_HOLE as i64,
            _ => return None,
        };
        Some(value)
    }

    /// Verifies every declared value of `T` equals its native macro
    pub fn verify_constants<T: NativeConstants>(type_name: &str) {
        assert!(!T::NATIVE.is_empty(), "{type_name} declares no constants");
        for constant in T::NATIVE {
            let expected = native_constant(constant.native).unwrap_or_else(|| {
                panic!(
                    "{type_name}::{} mirrors unknown native {}",
                    constant.name, constant.native
                )
            });
            assert_eq!(
                constant.value, expected,
                "{type_name}::{} drifted from {}: expected {:#x}, got {:#x}",
                constant.name, constant.native, expected, constant.value
            );
        }
    }

    /// Verifies two shapes match field by field, recursing into composites
    ///
    /// Zero-sized fields are skipped on both sides.
    pub fn verify_same_shape(context: &str, ours: &Shape, native: &Shape) {
        assert_eq!(ours.size, native.size, "{context}: size changed");
        assert_eq!(ours.align, native.align, "{context}: alignment changed");
        assert_eq!(ours.kind, native.kind, "{context}: kind changed");

        let ours_fields: Vec<_> = ours.fields.iter().filter(|f| f.shape.size != 0).collect();
        let native_fields: Vec<_> = native.fields.iter().filter(|f| f.shape.size != 0).collect();
        assert_eq!(
            ours_fields.len(),
            native_fields.len(),
            "{context}: field count changed"
        );
        for (ours, native) in ours_fields.iter().zip(&native_fields) {
            let context = format!("{context}.{}", ours.name);
            assert_eq!(ours.offset, native.offset, "{context}: offset changed");
            verify_same_shape(&context, &ours.shape, &native.shape);
        }
    }

    /// Verifies two shapes agree slot by slot after flattening
    ///
    /// For native structures whose padding fields are private: every
    /// non-reserved slot of ours must equal the native slot at the same
    /// position, and reserved slots must not overlap any native slot.
    pub fn verify_same_leaves(context: &str, ours: &Shape, native: &Shape) {
        assert_eq!(ours.size, native.size, "{context}: size changed");
        assert_eq!(ours.align, native.align, "{context}: alignment changed");

        let leaves = ours.leaves();
        let native_leaves = native.leaves();
        let visible: Vec<&Leaf> = leaves.iter().filter(|l| !l.reserved).collect();
        assert_eq!(
            visible.len(),
            native_leaves.len(),
            "{context}: field count changed"
        );
        for (ours, native) in visible.iter().zip(&native_leaves) {
            assert_eq!(ours.offset, native.offset, "{context}: slot moved");
            assert_eq!(
                (ours.kind, ours.bits),
                (native.kind, native.bits),
                "{context}: slot at offset {} changed",
                ours.offset
            );
        }

        for padding in leaves.iter().filter(|l| l.reserved) {
            let end = padding.offset + padding.bits / 8;
            assert!(
                native_leaves
                    .iter()
                    .all(|n| n.offset + n.bits / 8 <= padding.offset || n.offset >= end),
                "{context}: padding at offset {} overlaps a native field",
                padding.offset
            );
        }
        let covered: usize = leaves.iter().map(|l| l.bits / 8).sum();
        assert_eq!(covered, ours.size, "{context}: layout has implicit padding");
    }

    /// Verifies a record against its native structure's shape
    pub fn verify_record<T: NativeRecord>(native: &Shape) {
        verify_same_leaves(T::NATIVE, &T::shape(), native);
    }

    /// The C library's description of an error number
    pub fn native_message(errno: i32) -> String {
        let mut buffer = [0 as libc::c_char; 256];
        // SAFETY: the buffer is valid for its full length, and strerror_r
        // NUL-terminates whatever it writes into it.
        let ret = unsafe { libc::strerror_r(errno, buffer.as_mut_ptr(), buffer.len()) };
        assert_eq!(ret, 0, "strerror_r({errno}) failed");
        // SAFETY: see above.
        unsafe { CStr::from_ptr(buffer.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}
