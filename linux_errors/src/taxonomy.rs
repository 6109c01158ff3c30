//! # Error Taxonomy Engine
//!
//! Every kernel operation fails for its own closed set of reasons. Rather
//! than hand-writing a match per operation, each operation declares an
//! ordered table of `(name, errno, message)` rows with [`error_taxonomy!`]
//! and shares the classification logic on [`ErrorTaxonomy`].
//!
//! Classification never fails: a code missing from the table comes back
//! untouched as [`SysError::Raw`], so callers always receive some error,
//! typed or not.

use crate::errno::Errno;
use std::fmt;
use std::io;
use thiserror::Error;

/// One row of an operation's error table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorEntry {
    /// Semantic identifier, e.g. `WouldBlock`
    pub name: &'static str,
    /// Kernel error number this row matches
    pub errno: Errno,
    /// Human-readable text of the error
    pub message: &'static str,
}

impl ErrorEntry {
    pub const fn new(name: &'static str, errno: Errno, message: &'static str) -> Self {
        Self {
            name,
            errno,
            message,
        }
    }
}

/// A closed set of named failures for one kernel operation
///
/// Implemented by [`error_taxonomy!`]; only [`ErrorTaxonomy::ordinal`] and
/// the three constants are generated, everything else is shared.
pub trait ErrorTaxonomy:
    Copy + Eq + fmt::Debug + std::error::Error + Send + Sync + 'static
{
    /// Operation the table belongs to, e.g. `read`
    const OPERATION: &'static str;
    /// Declared rows, in ordinal order
    const TABLE: &'static [ErrorEntry];
    /// One variant per row, in ordinal order
    const ALL: &'static [Self];

    /// Position of this variant's row in [`ErrorTaxonomy::TABLE`]
    fn ordinal(self) -> usize;

    /// Row declaring this variant
    fn entry(self) -> &'static ErrorEntry {
        &Self::TABLE[self.ordinal()]
    }

    /// Kernel error number this variant stands for
    fn errno(self) -> Errno {
        self.entry().errno
    }

    /// Declared message, or the semantic identifier if no message was declared
    fn name(self) -> &'static str {
        let entry = self.entry();
        if entry.message.is_empty() {
            entry.name
        } else {
            entry.message
        }
    }

    /// Variant at the given ordinal
    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    /// Every declared variant, one per table row
    fn all_variants() -> &'static [Self] {
        Self::ALL
    }

    /// Maps a raw kernel error onto this operation's table
    fn classify(raw: Errno) -> SysError<Self> {
        match Self::TABLE
            .iter()
            .position(|entry| entry.errno == raw)
            .and_then(Self::from_ordinal)
        {
            Some(variant) => SysError::Known(variant),
            None => {
                log::debug!(
                    "{}: kernel error {} has no named variant",
                    Self::OPERATION,
                    raw.code()
                );
                SysError::Raw(raw)
            }
        }
    }
}

/// Failure of a kernel operation: classified, or passed through raw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SysError<E: ErrorTaxonomy> {
    /// The error matched a row of the operation's table
    #[error(transparent)]
    Known(E),

    /// The kernel reported a code the table does not name
    #[error(transparent)]
    Raw(Errno),
}

impl<E: ErrorTaxonomy> SysError<E> {
    /// Classifies a raw kernel error through `E`'s table
    pub fn classify(raw: Errno) -> Self {
        E::classify(raw)
    }

    /// Classifies the calling thread's last error number
    pub fn last() -> Self {
        E::classify(Errno::last())
    }

    /// Returns the named variant, if the error was classified
    pub fn known(&self) -> Option<E> {
        match self {
            Self::Known(variant) => Some(*variant),
            Self::Raw(_) => None,
        }
    }

    /// Kernel error number behind this error
    pub fn errno(&self) -> Errno {
        match self {
            Self::Known(variant) => variant.errno(),
            Self::Raw(errno) => *errno,
        }
    }

    /// Returns true if this is the given named variant
    pub fn is(&self, variant: E) -> bool {
        self.known() == Some(variant)
    }
}

impl<E: ErrorTaxonomy> From<E> for SysError<E> {
    fn from(variant: E) -> Self {
        Self::Known(variant)
    }
}

impl<E: ErrorTaxonomy> From<SysError<E>> for io::Error {
    fn from(error: SysError<E>) -> Self {
        io::Error::from_raw_os_error(error.errno().code())
    }
}

/// Declares an operation's closed error enumeration and its table
///
/// ```ignore
/// error_taxonomy! {
///     /// Errors returned by `close`
///     pub enum CloseError for "close" {
///         /// The descriptor is not open.
///         BadFile = libc::EBADF => "bad file descriptor",
///     }
/// }
/// ```
macro_rules! error_taxonomy {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident for $operation:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $errno:expr => $message:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
        #[repr(u8)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant,
            )+
        }

        impl $crate::taxonomy::ErrorTaxonomy for $name {
            const OPERATION: &'static str = $operation;
            const TABLE: &'static [$crate::taxonomy::ErrorEntry] = &[
                $(
                    $crate::taxonomy::ErrorEntry::new(
                        stringify!($variant),
                        $crate::errno::Errno($errno),
                        $message,
                    ),
                )+
            ];
            const ALL: &'static [Self] = &[$(Self::$variant,)+];

            fn ordinal(self) -> usize {
                self as usize
            }
        }
    };
}

pub(crate) use error_taxonomy;

#[cfg(test)]
mod tests {
    use super::*;

    error_taxonomy! {
        /// Errors of a made-up operation
        enum SampleError for "sample" {
            /// First row.
            Busy = libc::EBUSY => "device or resource busy",
            Unnamed = libc::EPERM => "",
            Invalid = libc::EINVAL => "invalid argument",
        }
    }

    error_taxonomy! {
        enum OtherError for "other" {
            Invalid = libc::EINVAL => "invalid argument",
        }
    }

    #[test]
    fn test_classify_matching_row() {
        let err = SampleError::classify(Errno::new(libc::EINVAL));
        assert_eq!(err, SysError::Known(SampleError::Invalid));
        assert!(err.is(SampleError::Invalid));
        assert_eq!(err.known().unwrap().ordinal(), 2);
    }

    #[test]
    fn test_classify_passes_unknown_codes_through() {
        let raw = Errno::new(libc::ENOTSOCK);
        let err = SampleError::classify(raw);
        assert_eq!(err, SysError::Raw(raw));
        assert_eq!(err.errno(), raw);
        assert!(err.known().is_none());
    }

    #[test]
    fn test_classify_stays_within_operation() {
        // Same errno, different table: each operation gets its own variant.
        let sample = SampleError::classify(Errno::new(libc::EINVAL));
        let other = OtherError::classify(Errno::new(libc::EINVAL));
        assert_eq!(sample.known().unwrap().ordinal(), 2);
        assert_eq!(other.known().unwrap().ordinal(), 0);
        assert_eq!(SampleError::OPERATION, "sample");
        assert_eq!(OtherError::OPERATION, "other");
    }

    #[test]
    fn test_classify_is_total_over_small_codes() {
        for code in 0..200 {
            let err = SampleError::classify(Errno::new(code));
            match err {
                SysError::Known(variant) => assert_eq!(variant.errno().code(), code),
                SysError::Raw(raw) => assert_eq!(raw.code(), code),
            }
        }
    }

    #[test]
    fn test_all_variants_one_per_row() {
        let all = SampleError::all_variants();
        assert_eq!(all.len(), SampleError::TABLE.len());
        for (ordinal, variant) in all.iter().enumerate() {
            assert_eq!(variant.ordinal(), ordinal);
            assert_eq!(SampleError::from_ordinal(ordinal), Some(*variant));
        }
        assert_eq!(SampleError::from_ordinal(all.len()), None);
    }

    #[test]
    fn test_name_prefers_message_then_identifier() {
        assert_eq!(SampleError::Busy.name(), "device or resource busy");
        assert_eq!(SampleError::Unnamed.name(), "Unnamed");
        assert_eq!(SampleError::Busy.entry().name, "Busy");
    }

    #[test]
    fn test_display_is_declared_message() {
        assert_eq!(SampleError::Invalid.to_string(), "invalid argument");
        let err: SysError<SampleError> = SampleError::Busy.into();
        assert_eq!(err.to_string(), "device or resource busy");
    }

    #[test]
    fn test_into_io_error_keeps_errno() {
        let err: io::Error = SysError::<SampleError>::Known(SampleError::Invalid).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err: io::Error = SysError::<SampleError>::Raw(Errno::new(libc::ENOENT)).into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
