//! Error types for the [`scan`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A scan error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a scan failure.
///
/// ### Per-entry Errors (logged, entry skipped, scan continues)
/// - [`ErrorKind::Storage`]
/// - [`ErrorKind::Extract`]
/// - [`ErrorKind::Traversal`]
///
/// ### Fatal Errors (scan ends, nothing is persisted)
/// - [`ErrorKind::Discovery`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A file could not be read, hashed or inspected.
    #[display("could not read {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    /// An arcade definition is malformed.
    #[display("could not parse {}", _0.display())]
    Extract(#[error(not(source))] PathBuf),
    /// Part of a category root could not be walked.
    #[display("could not walk directory")]
    Traversal,
    /// The storage root itself could not be enumerated.
    #[display("could not list category roots in {}", _0.display())]
    Discovery(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if the whole scan has to be abandoned.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Discovery(_))
    }
}
