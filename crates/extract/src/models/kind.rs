use crate::consts::{ARCADE_DEFINITION_EXTENSION, LOGIC_IMAGE_EXTENSION};
use std::path::Path;

/// The closed set of file kinds a scan cares about.
///
/// Selected purely from the file extension (case-insensitive); the contents
/// are never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Binary logic image (`.rbf`).
    LogicImage,
    /// Arcade definition (`.mra`).
    ArcadeDefinition,
    /// Anything else; not indexed.
    Ignored,
}
impl FileKind {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let Some(extension) = path.as_ref().extension().and_then(|e| e.to_str()) else {
            return Self::Ignored;
        };
        Self::from_extension(extension)
    }

    pub fn from_extension(extension: &str) -> Self {
        if extension.eq_ignore_ascii_case(LOGIC_IMAGE_EXTENSION) {
            Self::LogicImage
        } else if extension.eq_ignore_ascii_case(ARCADE_DEFINITION_EXTENSION) {
            Self::ArcadeDefinition
        } else {
            Self::Ignored
        }
    }
}
