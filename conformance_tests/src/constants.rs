//! Flag and enumeration constant conformance
//!
//! Every named value must equal the native macro it mirrors.

#[cfg(test)]
mod tests {
    use crate::test_helpers::{native_constant, verify_constants};
    use linux_abi::{
        FileAccessMode, FileCreationFlags, FilePermissions, FileStatusFlags, FileType, MapFlags,
        MapType, MemoryProtection, NativeConstants, Poll, SeekWhence,
    };

    #[test]
    fn test_file_creation_flags() {
        verify_constants::<FileCreationFlags>("FileCreationFlags");
    }

    #[test]
    fn test_file_status_flags() {
        verify_constants::<FileStatusFlags>("FileStatusFlags");
    }

    #[test]
    fn test_file_permissions() {
        verify_constants::<FilePermissions>("FilePermissions");
    }

    #[test]
    fn test_file_types() {
        verify_constants::<FileType>("FileType");
    }

    #[test]
    fn test_file_access_modes() {
        verify_constants::<FileAccessMode>("FileAccessMode");
    }

    #[test]
    fn test_memory_protection() {
        verify_constants::<MemoryProtection>("MemoryProtection");
    }

    #[test]
    fn test_map_types() {
        verify_constants::<MapType>("MapType");
    }

    #[test]
    fn test_map_flags() {
        verify_constants::<MapFlags>("MapFlags");
    }

    #[test]
    fn test_poll_events() {
        verify_constants::<Poll>("Poll");
    }

    #[test]
    fn test_seek_origins() {
        verify_constants::<SeekWhence>("SeekWhence");
    }

    #[test]
    fn test_lookup_by_native_name() {
        let sync = FileStatusFlags::native("O_SYNC").unwrap();
        assert_eq!(sync.name, "SYNC");
        assert_eq!(Some(sync.value), native_constant("O_SYNC"));
        assert!(FileStatusFlags::native("O_CREAT").is_none());
    }

    #[test]
    fn test_sync_includes_data_sync() {
        // O_SYNC is O_DSYNC plus the metadata bit.
        assert!(FileStatusFlags::SYNC.contains(FileStatusFlags::SYNC_DATA));
        assert_eq!(
            FileStatusFlags::SYNC.bits() & libc::O_DSYNC,
            libc::O_DSYNC
        );
    }

    #[test]
    fn test_temporary_file_flag_matches_native() {
        assert_eq!(FileCreationFlags::TEMPORARY_INSIDE.bits(), libc::O_TMPFILE);
        assert!(FileCreationFlags::TEMPORARY_INSIDE.contains(FileCreationFlags::ASSERT_DIRECTORY));
    }
}
