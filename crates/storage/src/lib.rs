//! Filesystem access for the core index.
//!
//! Everything that touches the SD card lives here: enumerating category roots,
//! walking them, hashing file contents, looking up ROM archives and atomically
//! replacing the persisted index.

mod digest;
pub mod error;
mod local;
mod lpath;
mod models;
mod persist;

pub use crate::digest::{digest_file, digest_reader};
pub use crate::local::{FileInfoStream, LocalStorage};
pub use crate::lpath::logical_path;
pub use crate::models::FileInfo;
pub use crate::persist::write_atomic;
