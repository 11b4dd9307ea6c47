//! The index and its entries.
//!
//! Serialized field names follow what the web front-end already consumes
//! (`rbfs`, `mras`, `lpath`, `ctime`, `roms`, `roms_found`, ...). The one
//! exception is the content hash: it is BLAKE3, so it is stored under
//! `digest` and a front-end expecting an `md5` key has to be pointed at it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::OffsetDateTime;
use webmenu_extract::models::ArchiveReference;

/// One binary logic image (`.rbf`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicImageEntry {
    /// Absolute path on the storage medium
    pub path: PathBuf,
    /// Base name of `path`
    pub filename: String,
    /// Parsed from the filename; `None` if it doesn't follow the
    /// dated-codename convention.
    #[serde(rename = "codename")]
    pub code_name: Option<String>,
    #[serde(rename = "codedate")]
    pub code_date: Option<String>,
    /// File modification time at scan time (Unix seconds when serialized)
    #[serde(rename = "ctime", with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
    /// Category labels, outermost first
    #[serde(rename = "lpath")]
    pub logical_path: Vec<String>,
    /// BLAKE3 hex digest of the file contents
    pub digest: String,
}

/// One arcade definition (`.mra`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcadeDefinitionEntry {
    pub path: PathBuf,
    pub filename: String,
    #[serde(rename = "ctime", with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "lpath")]
    pub logical_path: Vec<String>,
    pub digest: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// Logic image the definition runs on. Internal only.
    #[serde(skip)]
    pub logic_image_ref: Option<String>,
    /// Non-empty archive references, in document order. Exactly the
    /// references that [`dependencies_satisfied`](Self::dependencies_satisfied)
    /// was computed over.
    #[serde(rename = "roms")]
    pub required_archives: Vec<ArchiveReference>,
    #[serde(rename = "roms_found")]
    pub dependencies_satisfied: bool,
}

/// A single indexed file, of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    LogicImage(LogicImageEntry),
    ArcadeDefinition(ArcadeDefinitionEntry),
}

/// Everything one scan pass found.
///
/// Entry order follows traversal order, which is not deterministic; only the
/// ordered fields *within* an entry are meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    #[serde(rename = "rbfs")]
    pub logic_images: Vec<LogicImageEntry>,
    #[serde(rename = "mras")]
    pub arcade_definitions: Vec<ArcadeDefinitionEntry>,
}
impl Index {
    pub fn push(&mut self, entry: Entry) {
        match entry {
            Entry::LogicImage(entry) => self.logic_images.push(entry),
            Entry::ArcadeDefinition(entry) => self.arcade_definitions.push(entry),
        }
    }

    pub fn len(&self) -> usize {
        self.logic_images.len() + self.arcade_definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters describing one scan pass, for logging and progress output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub category_roots: u64,
    pub logic_images: usize,
    pub arcade_definitions: usize,
    /// Files and directories that were skipped because of an error.
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logic_image() -> LogicImageEntry {
        LogicImageEntry {
            path: PathBuf::from("/sd/_Console/NeoGeo_20210615_v2.rbf"),
            filename: "NeoGeo_20210615_v2.rbf".to_string(),
            code_name: Some("NeoGeo".to_string()),
            code_date: Some("20210615".to_string()),
            created_at: OffsetDateTime::from_unix_timestamp(1_623_715_200).unwrap(),
            logical_path: vec!["Console".to_string()],
            digest: "abc".to_string(),
        }
    }

    fn arcade_definition() -> ArcadeDefinitionEntry {
        ArcadeDefinitionEntry {
            path: PathBuf::from("/sd/_Arcade/_Console/game.mra"),
            filename: "game.mra".to_string(),
            created_at: OffsetDateTime::from_unix_timestamp(1_600_000_000).unwrap(),
            logical_path: vec!["Arcade".to_string(), "Console".to_string()],
            digest: "def".to_string(),
            display_name: "Game".to_string(),
            logic_image_ref: Some("game".to_string()),
            required_archives: vec![ArchiveReference::new("rom1.zip|rom2.zip")],
            dependencies_satisfied: true,
        }
    }

    #[test]
    fn test_push_routes_by_kind() {
        let mut index = Index::default();
        assert!(index.is_empty());
        index.push(Entry::LogicImage(logic_image()));
        index.push(Entry::ArcadeDefinition(arcade_definition()));
        assert_eq!(index.logic_images.len(), 1);
        assert_eq!(index.arcade_definitions.len(), 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_serialized_shape() {
        let mut index = Index::default();
        index.push(Entry::LogicImage(logic_image()));
        index.push(Entry::ArcadeDefinition(arcade_definition()));
        let json = serde_json::to_value(&index).unwrap();
        let rbf = &json["rbfs"][0];
        assert_eq!(rbf["codename"], "NeoGeo");
        assert_eq!(rbf["codedate"], "20210615");
        assert_eq!(rbf["ctime"], 1_623_715_200);
        assert_eq!(rbf["lpath"], serde_json::json!(["Console"]));
        assert!(rbf["digest"].is_string());
        assert!(rbf.get("md5").is_none());
        let mra = &json["mras"][0];
        assert_eq!(mra["name"], "Game");
        assert_eq!(mra["roms"], serde_json::json!([{ "zip": "rom1.zip|rom2.zip" }]));
        assert_eq!(mra["roms_found"], true);
        assert!(mra["digest"].is_string());
        assert!(mra.get("md5").is_none());
        // The logic image reference stays internal.
        assert!(mra.get("logic_image_ref").is_none());
        assert!(mra.get("rbf").is_none());
    }

    #[test]
    fn test_unparsed_codename_serializes_as_null() {
        let entry = LogicImageEntry { code_name: None, code_date: None, ..logic_image() };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["codename"].is_null());
        assert!(json["codedate"].is_null());
    }

    #[test]
    fn test_deserialize_persisted_form() {
        let mut index = Index::default();
        index.push(Entry::ArcadeDefinition(arcade_definition()));
        let bytes = serde_json::to_vec(&index).unwrap();
        let restored: Index = serde_json::from_slice(&bytes).unwrap();
        let entry = &restored.arcade_definitions[0];
        assert_eq!(entry.required_archives, vec![ArchiveReference::new("rom1.zip|rom2.zip")]);
        assert_eq!(entry.logic_image_ref, None);
    }
}
