//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a library failure.
///
/// ### Operational Errors
/// - [`ErrorKind::Scan`]
/// - [`ErrorKind::Persist`]
/// - [`ErrorKind::Launch`]
///
/// ### Setup Errors
/// - [`ErrorKind::Config`]
/// - [`ErrorKind::Read`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The configured storage root can't be used.
    #[display("invalid storage configuration")]
    Config,
    /// A scan could not run to completion (per-file failures don't count).
    #[display("scan failed")]
    Scan,
    /// The index could not be serialized or written; the previously
    /// persisted index (if any) is untouched.
    #[display("could not persist index")]
    Persist,
    /// The persisted index could not be read back.
    #[display("could not read persisted index")]
    Read,
    /// The launch command could not be delivered.
    #[display("could not launch core")]
    Launch,
}
