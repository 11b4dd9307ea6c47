//! Logical (category) paths derived from directory names.

use std::path::{Component, Path};

/// Derives the category labels of `file` from its enclosing directories.
///
/// The directory portion of `file` is made relative to `root`, then only the
/// components starting with `marker` are kept, in order, with every leading
/// `marker` stripped. Organisational folders without the marker (`mame`,
/// `cores`, ...) are skipped. If `file` is not under `root` at all, every
/// ancestor component is considered.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use webmenu_storage::logical_path;
///
/// let lpath = logical_path(Path::new("/sd"), Path::new("/sd/_Arcade/cores/_Console/game.mra"), '_');
/// assert_eq!(lpath, vec!["Arcade", "Console"]);
/// ```
pub fn logical_path(root: &Path, file: &Path, marker: char) -> Vec<String> {
    let Some(dir) = file.parent() else {
        return Vec::new();
    };
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .filter(|segment| segment.starts_with(marker))
        .map(|segment| segment.trim_start_matches(marker).to_string())
        .collect()
}
