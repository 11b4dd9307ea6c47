use crate::consts::ALTERNATIVE_SEPARATOR;
use serde::{Deserialize, Serialize};

/// The parts of an arcade definition document that the index cares about.
///
/// The root element name is not checked, and any element not listed here is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcadeDefinition {
    /// Human-readable name (`<name>`); empty if the document has none.
    pub name: String,
    /// Logic image the definition runs on (`<rbf>`).
    pub logic_image: Option<String>,
    /// Every `<rom>` element, in document order, including the ones without
    /// a `zip` attribute.
    pub archives: Vec<ArchiveReference>,
}

/// One required archive, given as a pipe-delimited set of acceptable
/// filenames (`zip="pacman.zip|puckman.zip"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchiveReference {
    #[serde(default)]
    pub zip: String,
}
impl ArchiveReference {
    pub fn new(zip: impl Into<String>) -> Self {
        Self { zip: zip.into() }
    }

    /// An empty reference requires nothing and is dropped before resolution.
    pub fn is_empty(&self) -> bool {
        self.zip.is_empty()
    }

    /// Acceptable filenames, in declared order. Empty candidates (`a.zip||b.zip`)
    /// are skipped.
    pub fn alternatives(&self) -> impl Iterator<Item = &str> {
        self.zip.split(ALTERNATIVE_SEPARATOR).filter(|alt| !alt.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternatives() {
        let reference = ArchiveReference::new("rom1.zip|rom2.zip");
        assert_eq!(reference.alternatives().collect::<Vec<_>>(), vec!["rom1.zip", "rom2.zip"]);
        let reference = ArchiveReference::new("|rom1.zip||");
        assert_eq!(reference.alternatives().collect::<Vec<_>>(), vec!["rom1.zip"]);
    }

    #[test]
    fn test_empty() {
        assert!(ArchiveReference::new("").is_empty());
        assert!(ArchiveReference::default().is_empty());
        assert!(!ArchiveReference::new("a.zip").is_empty());
        assert_eq!(ArchiveReference::new("").alternatives().count(), 0);
    }
}
