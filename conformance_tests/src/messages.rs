//! Error message conformance
//!
//! Each error row carries the C library's description of its error number,
//! lowercased. Descriptions differ between C libraries; the rows follow
//! glibc.

use crate::test_helpers::native_message;
use linux_errors::ErrorTaxonomy;

/// Verifies every row of `E` against the C library's descriptions
pub fn verify_messages<E: ErrorTaxonomy>() {
    for variant in E::all_variants() {
        let entry = variant.entry();
        let native = native_message(entry.errno.code()).to_lowercase();
        assert_eq!(
            entry.message, native,
            "{}::{} drifted from strerror({})",
            E::OPERATION,
            entry.name,
            entry.errno.code()
        );
        assert_eq!(variant.to_string(), entry.message);
    }
}
