//! Persisted, single-flight index builds.
//!
//! A persisted index is considered valid for as long as the file exists.
//! There is no staleness check against the storage medium: a rescan only
//! happens when the index is missing or a caller forces one.

use crate::Context;
use crate::error::{ErrorKind, Result};
use crate::models::{Index, ScanSummary};
use crate::scan::build_index;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use webmenu_storage::write_atomic;

/// What [`IndexCache::ensure`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    /// A persisted index already existed and was left alone.
    Cached,
    /// A full scan ran and its result replaced the persisted index.
    Rebuilt(ScanSummary),
}

/// Owns the persisted index location and the lock serializing every build.
///
/// One instance per running service. Only the holder of the lock ever writes
/// to [`path`](Self::path), and only by atomic replacement, so readers never
/// observe a half-written index.
pub struct IndexCache {
    ctx: Context,
    path: PathBuf,
    lock: Mutex<()>,
}
impl IndexCache {
    pub fn new(ctx: Context, path: impl Into<PathBuf>) -> Self {
        Self { ctx, path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if a persisted index exists.
    pub async fn is_cached(&self) -> bool {
        self.ctx.storage.exists(&self.path).await
    }

    /// Makes sure a persisted index exists, scanning the storage medium if
    /// it doesn't or if `force` is set.
    ///
    /// At most one scan runs at a time. Callers arriving while a scan is in
    /// flight wait for it; unforced callers then find the fresh index and
    /// return [`Ensured::Cached`] instead of scanning again.
    ///
    /// # Errors
    /// - [`ErrorKind::Scan`] if the storage root couldn't be enumerated, for
    ///   example because the card isn't mounted. Forced calls fail too rather
    ///   than persisting an empty index.
    /// - [`ErrorKind::Persist`] if the index couldn't be serialized or written.
    ///
    /// Either way the previously persisted index, if any, is left untouched.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn ensure(&self, force: bool) -> Result<Ensured> {
        if !force && self.is_cached().await {
            return Ok(Ensured::Cached);
        }
        let _guard = self.lock.lock().await;
        // Another caller may have finished a build while we were waiting.
        if !force && self.is_cached().await {
            tracing::debug!("Index was built while waiting for the lock");
            return Ok(Ensured::Cached);
        }
        tracing::info!(force, "Building index");
        let (index, summary) = build_index(&self.ctx).await?;
        let bytes = serde_json::to_vec(&index).or_raise(|| ErrorKind::Persist)?;
        write_atomic(&self.path, bytes).await.or_raise(|| ErrorKind::Persist)?;
        tracing::info!(entries = index.len(), "Index persisted");
        Ok(Ensured::Rebuilt(summary))
    }

    /// The persisted index exactly as stored, for handing to a client verbatim.
    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path).await.or_raise(|| ErrorKind::Read)
    }

    /// The persisted index, deserialized.
    pub async fn load(&self) -> Result<Index> {
        let bytes = self.read().await?;
        serde_json::from_slice(&bytes).or_raise(|| ErrorKind::Read)
    }
}
