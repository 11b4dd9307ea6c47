//! Content fingerprints.
//!
//! Files are streamed through a BLAKE3 hasher in fixed-size chunks, so a
//! multi-megabyte logic image never has to sit in memory in one piece.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Hashes everything `reader` yields until EOF, returning the lowercase hex
/// BLAKE3 digest.
///
/// # Examples
///
/// ```
/// use webmenu_storage::digest_reader;
///
/// let a = digest_reader(&b"load_core"[..]).unwrap();
/// let b = digest_reader(&b"load_core"[..]).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn digest_reader(mut reader: impl Read) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    std::io::copy(&mut reader, &mut hasher).map_err(ErrorKind::Io)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Streams a file from disk into [`digest_reader`] on the blocking pool.
pub async fn digest_file(path: impl Into<PathBuf>) -> Result<String> {
    let path = path.into();
    tokio::task::spawn_blocking(move || digest_path(&path)).await.or_raise(|| ErrorKind::Task)?
}

fn digest_path(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| ErrorKind::from_io(e, path))?;
    digest_reader(BufReader::new(file))
}
