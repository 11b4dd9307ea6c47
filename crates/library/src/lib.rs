pub mod cache;
pub mod error;
pub mod launch;
pub mod models;
pub mod scan;

pub use crate::cache::{Ensured, IndexCache};
pub use crate::launch::{FifoLauncher, Launcher};
pub use crate::models::{ArcadeDefinitionEntry, Entry, Index, LogicImageEntry, ScanSummary};

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use webmenu_config::Config;
use webmenu_storage::LocalStorage;

/// Upper bound on files processed at once during a scan, whatever the
/// configuration asks for.
pub const MAX_PROCESS_CONCURRENCY: usize = 100;

/// Everything a scan needs to know about the storage medium.
#[derive(Debug, Clone)]
pub struct Context {
    pub storage: LocalStorage,
    /// Subdirectories searched for ROM archives, in order, after an arcade
    /// definition's own directory.
    pub archive_dirs: Vec<String>,
    pub concurrency: usize,
}
impl Context {
    pub fn new(storage: LocalStorage, archive_dirs: Vec<String>) -> Self {
        Self { storage, archive_dirs, concurrency: 16 }
    }

    /// Clamped to `1..=MAX_PROCESS_CONCURRENCY`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_PROCESS_CONCURRENCY);
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = LocalStorage::new(&config.storage_root, config.category_marker).or_raise(|| ErrorKind::Config)?;
        Ok(Self::new(storage, config.archive_dirs.clone()).with_concurrency(config.scan_concurrency))
    }
}
