//! Whole-file replacement for the persisted index.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically replaces `path` with `data`.
///
/// The bytes are written to a temporary file in the destination directory,
/// flushed to disk, then renamed over the target; concurrent readers either
/// see the previous file or the complete new one, never a partial write.
/// Parent directories are created as needed. On failure the previous file is
/// left untouched.
pub async fn write_atomic(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<()> {
    let path = path.into();
    tokio::task::spawn_blocking(move || write_atomic_sync(&path, &data)).await.or_raise(|| ErrorKind::Task)?
}

fn write_atomic_sync(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
    };
    std::fs::create_dir_all(parent).map_err(|e| ErrorKind::from_io(e, parent))?;
    let mut temp = NamedTempFile::new_in(parent).map_err(|e| ErrorKind::from_io(e, parent))?;
    temp.write_all(data).map_err(ErrorKind::Io)?;
    temp.as_file().sync_all().map_err(ErrorKind::Io)?;
    temp.persist(path).map_err(|e| ErrorKind::from_io(e.error, path))?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "Replaced file atomically");
    Ok(())
}
