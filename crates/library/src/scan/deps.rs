//! ROM archive presence checks for arcade definitions.

use std::iter;
use std::path::{Component, Path, PathBuf};
use webmenu_extract::models::ArchiveReference;
use webmenu_storage::LocalStorage;

/// Outcome of checking an arcade definition's archive references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Every non-empty reference, in declared order.
    pub archives: Vec<ArchiveReference>,
    /// `true` only if every reference in `archives` was found.
    pub satisfied: bool,
}

/// Directories searched for archives, in order: the definition's own
/// directory, then each archive subdirectory beneath it.
pub fn search_dirs<'a>(dir: &'a Path, archive_dirs: &'a [String]) -> impl Iterator<Item = PathBuf> + 'a {
    iter::once(dir.to_path_buf()).chain(archive_dirs.iter().map(move |sub| dir.join(sub)))
}

/// Checks that every archive `references` asks for is present.
///
/// Empty references are dropped first and never influence the verdict. A
/// reference is satisfied when any of its pipe-delimited alternatives exists
/// in any of the [`search_dirs`]. Only bare filenames are looked up: absolute
/// alternatives, `..` and nested paths never match. The search stops at the
/// first unsatisfied reference, but all non-empty references are still
/// returned.
///
/// A missing archive is a normal answer, not an error.
pub async fn resolve_dependencies(
    storage: &LocalStorage,
    dir: &Path,
    archive_dirs: &[String],
    references: Vec<ArchiveReference>,
) -> Resolution {
    let archives: Vec<_> = references.into_iter().filter(|r| !r.is_empty()).collect();
    let mut satisfied = true;
    for reference in &archives {
        if !is_available(storage, dir, archive_dirs, reference).await {
            tracing::debug!(dir = %dir.display(), zip = %reference.zip, "Required archive not found");
            satisfied = false;
            break;
        }
    }
    Resolution { archives, satisfied }
}

async fn is_available(storage: &LocalStorage, dir: &Path, archive_dirs: &[String], reference: &ArchiveReference) -> bool {
    for candidate_dir in search_dirs(dir, archive_dirs) {
        for alternative in reference.alternatives().filter(|alt| is_bare_filename(alt)) {
            if storage.exists(&candidate_dir.join(alternative)).await {
                return true;
            }
        }
    }
    false
}

fn is_bare_filename(alternative: &str) -> bool {
    let mut components = Path::new(alternative).components();
    matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}
