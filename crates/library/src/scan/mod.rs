pub mod error;
mod deps;
mod file;
mod stream;

pub use self::deps::{Resolution, resolve_dependencies, search_dirs};
pub use self::file::scan_file;
pub use self::stream::{ScanEvent, build_index, scan};
