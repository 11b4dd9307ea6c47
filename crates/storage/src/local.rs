//! Local filesystem access rooted at the SD card mount point.
//!
//! Uses `tokio::fs` for directory listings and metadata, so a slow card only
//! ever blocks the blocking pool.

use crate::error::{ErrorKind, Result};
use crate::lpath::logical_path;
use crate::models::FileInfo;
use async_stream::stream;
use futures::Stream;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs::{self, DirEntry};

pub type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// The storage root (SD card) and its category naming convention.
///
/// # Examples
///
/// ```no_run
/// use webmenu_storage::LocalStorage;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = LocalStorage::new("/media/fat", '_')?;
/// for root in storage.category_roots().await? {
///     println!("{}", root.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Mount point of the SD card
    root: PathBuf,
    /// Leading character of category directory names
    marker: char,
}
impl LocalStorage {
    /// Create a new storage handle.
    ///
    /// The root does not have to exist yet (the card may be mounted later),
    /// but it must be absolute and, if it exists, a directory.
    pub fn new(root: impl AsRef<Path>, marker: char) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() && !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { root, marker })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    /// Category labels for a file somewhere beneath the root.
    pub fn logical_path(&self, file: &Path) -> Vec<String> {
        logical_path(&self.root, file, self.marker)
    }

    /// Lists the category roots: directories directly under the storage root
    /// whose name starts with the marker. Sorted by name.
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if the root itself is
    /// missing. Entries that can't be inspected are logged and skipped.
    pub async fn category_roots(&self) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| ErrorKind::from_io(e, &self.root))?;
        let mut roots = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(path = %self.root.display(), error = %e, "Could not read storage root entry");
                    continue;
                },
            };
            if !entry.file_name().to_string_lossy().starts_with(self.marker) {
                continue;
            }
            let path = entry.path();
            // Follows symlinks: a linked category root is still a category root.
            match fs::metadata(&path).await {
                Ok(metadata) if metadata.is_dir() => roots.push(path),
                Ok(_) => tracing::debug!(path = %path.display(), "Skipping marker-prefixed non-directory"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not inspect category root"),
            }
        }
        roots.sort();
        Ok(roots)
    }

    /// Recursively streams every regular file beneath `dir`.
    ///
    /// Unreadable directories and entries are yielded as errors without
    /// ending the stream. Symlinks to files are followed; symlinked
    /// directories are never descended into, so link cycles can't trap the
    /// walk. Order is whatever the filesystem returns and must not be relied
    /// upon.
    pub fn walk<'a>(&'a self, dir: &'a Path) -> FileInfoStream<'a> {
        let mut stack = vec![dir.to_path_buf()];
        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    Err(err) => {
                        yield Err(exn::Exn::from(ErrorKind::from_io(err, &current)));
                        continue 'dirs;
                    }
                };

                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(e) => { yield Err(exn::Exn::from(ErrorKind::from_io(e, &current))); continue 'entries; },
                    };
                    match Self::process_entry(entry).await {
                        Ok(WalkEntry::File(f)) => yield Ok(f),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }

    /// Returns `true` if something exists at `path`.
    ///
    /// Any failure to check (permissions, I/O) counts as "not there"; a
    /// missing file is a normal answer, not an error.
    pub async fn exists(&self, path: &Path) -> bool {
        match fs::try_exists(path).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Existence check failed; treating as missing");
                false
            },
        }
    }

    /// Read the complete contents of a file.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path).await.map_err(|e| ErrorKind::from_io(e, path))?)
    }

    /// Metadata of a single file, following symlinks.
    pub async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let metadata = fs::metadata(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        Self::metadata(path, metadata)
    }

    /// Re-use same data collection from file metadata for both walk and stat functions
    fn metadata(path: &Path, metadata: Metadata) -> Result<FileInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        Ok(FileInfo::new(path, metadata.len(), modified))
    }

    async fn process_entry(entry: DirEntry) -> Result<WalkEntry> {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(|e| ErrorKind::from_io(e, &path))?;
        if file_type.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if file_type.is_file() {
            let metadata = entry.metadata().await.map_err(|e| ErrorKind::from_io(e, &path))?;
            return Ok(WalkEntry::File(Self::metadata(&path, metadata)?));
        }
        if file_type.is_symlink() {
            return match fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => Ok(WalkEntry::File(Self::metadata(&path, metadata)?)),
                Ok(_) => Ok(WalkEntry::Skip),
                // Note: silently drop what is most likely a broken symlink.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(WalkEntry::Skip),
                Err(e) => Err(exn::Exn::from(ErrorKind::from_io(e, &path))),
            };
        }
        Ok(WalkEntry::Skip)
    }
}
