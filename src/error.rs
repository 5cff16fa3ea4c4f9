//! Error handling for archive operations
//!
//! This module re-exports the crate-wide error type. Structural problems fail
//! a whole `open`/`load`; per-entry problems are scoped to the entry that
//! caused them so batch operations can skip it and continue.

pub use crate::common::ArchiveError;
pub use crate::common::Result;
