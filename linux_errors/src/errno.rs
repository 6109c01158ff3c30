//! Raw kernel error codes

use std::fmt;
use std::io;

/// A raw, unclassified kernel error number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Errno(pub i32);

impl Errno {
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// Returns the raw error number
    pub const fn code(&self) -> i32 {
        self.0
    }

    /// Reads the calling thread's last error number
    ///
    /// Falls back to `EIO` if the platform reports no code at all.
    pub fn last() -> Self {
        Self(io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO))
    }

    /// The C library's description of this error number
    pub fn describe(&self) -> String {
        let text = io::Error::from_raw_os_error(self.0).to_string();
        match text.rfind(" (os error ") {
            Some(end) => text[..end].to_string(),
            None => text,
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (errno {})", self.describe(), self.0)
    }
}

impl std::error::Error for Errno {}

impl From<Errno> for io::Error {
    fn from(errno: Errno) -> Self {
        io::Error::from_raw_os_error(errno.0)
    }
}
