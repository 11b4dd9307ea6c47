//! Configuration for webmenu.
//!
//! Values are layered with [`figment`], later sources winning:
//!
//! 1. Built-in defaults matching a stock MiSTer SD card layout.
//! 2. An optional configuration file (TOML, YAML or JSON, chosen by
//!    extension). Either given explicitly or found in the platform
//!    configuration directory as `config.toml`.
//! 3. Environment variables prefixed with `WEBMENU_` (for example
//!    `WEBMENU_STORAGE_ROOT=/mnt/sd` or `WEBMENU_ARCHIVE_DIRS=[mame,hbmame]`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const ENV_PREFIX: &str = "WEBMENU_";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mount point of the SD card. Category roots live directly beneath it.
    pub storage_root: PathBuf,
    /// Where the serialized index is persisted.
    pub index_path: PathBuf,
    /// Leading character that turns a directory into a category.
    pub category_marker: char,
    /// Subdirectories (relative to an arcade definition) searched for ROM
    /// archives, after the definition's own directory.
    pub archive_dirs: Vec<String>,
    /// Control channel of the menu process, used to launch cores.
    pub command_fifo: PathBuf,
    /// Maximum number of files processed at once during a scan.
    pub scan_concurrency: usize,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("/media/fat"),
            index_path: PathBuf::from("/media/fat/Scripts/.webmenu/cache/cores.json"),
            category_marker: '_',
            archive_dirs: vec!["mame".to_string(), "hbmame".to_string()],
            command_fifo: PathBuf::from("/dev/MiSTer_cmd"),
            scan_concurrency: 16,
        }
    }
}

impl Config {
    /// Loads and validates the configuration.
    ///
    /// With `file` set, that file must exist. Without it, `config.toml` in
    /// the platform configuration directory is used if present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match file {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::Invalid {
                        field: "config",
                        reason: format!("{} is not a file", path.display()),
                    });
                }
                figment = Self::merge_file(figment, path)?;
            },
            None => {
                if let Some(path) = Self::default_file()
                    && path.is_file()
                {
                    figment = Self::merge_file(figment, &path)?;
                }
            },
        }
        let config: Config = figment.merge(Env::prefixed(ENV_PREFIX)).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// `config.toml` inside the platform configuration directory, if the
    /// platform has one.
    pub fn default_file() -> Option<PathBuf> {
        ProjectDirs::from("", "", "webmenu").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        tracing::debug!(path = %path.display(), "Loading configuration file");
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
        Ok(match extension.as_str() {
            "toml" => figment.merge(Toml::file(path)),
            "yaml" | "yml" => figment.merge(Yaml::file(path)),
            "json" => figment.merge(Json::file(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
        })
    }

    /// Checks the values that would otherwise fail confusingly (or silently)
    /// halfway through a scan.
    pub fn validate(&self) -> Result<()> {
        if !self.storage_root.is_absolute() {
            exn::bail!(ErrorKind::Invalid {
                field: "storage_root",
                reason: "must be an absolute path".to_string(),
            });
        }
        if !self.index_path.is_absolute() || self.index_path.file_name().is_none() {
            exn::bail!(ErrorKind::Invalid {
                field: "index_path",
                reason: "must be an absolute path to a file".to_string(),
            });
        }
        if std::path::is_separator(self.category_marker) || self.category_marker == '.' {
            exn::bail!(ErrorKind::Invalid {
                field: "category_marker",
                reason: format!("`{}` can't be used as a marker", self.category_marker),
            });
        }
        for dir in &self.archive_dirs {
            let mut components = Path::new(dir).components();
            let single_plain = matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
            if !single_plain {
                exn::bail!(ErrorKind::Invalid {
                    field: "archive_dirs",
                    reason: format!("`{dir}` must be a single directory name"),
                });
            }
        }
        if self.scan_concurrency == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "scan_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.archive_dirs, vec!["mame", "hbmame"]);
        assert_eq!(config.category_marker, '_');
    }

    #[rstest]
    #[case("toml", "storage_root = \"/mnt/sd\"\narchive_dirs = [\"roms\"]\nscan_concurrency = 2\n")]
    #[case("yaml", "storage_root: /mnt/sd\narchive_dirs: [roms]\nscan_concurrency: 2\n")]
    #[case("json", r#"{"storage_root": "/mnt/sd", "archive_dirs": ["roms"], "scan_concurrency": 2}"#)]
    fn test_load_file_formats(#[case] extension: &str, #[case] contents: &str) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(format!("webmenu.{extension}"));
        std::fs::write(&path, contents).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.storage_root, PathBuf::from("/mnt/sd"));
        assert_eq!(config.archive_dirs, vec!["roms"]);
        assert_eq!(config.scan_concurrency, 2);
        // Untouched keys keep their defaults.
        assert_eq!(config.index_path, Config::default().index_path);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&temp_dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid { field: "config", .. }));
    }

    #[test]
    fn test_load_unsupported_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("webmenu.ini");
        std::fs::write(&path, "storage_root=/mnt/sd").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_rejects_wrong_types() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("webmenu.toml");
        std::fs::write(&path, "scan_concurrency = \"lots\"\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load));
    }

    #[rstest]
    #[case(Config { storage_root: PathBuf::from("relative"), ..Config::default() }, "storage_root")]
    #[case(Config { index_path: PathBuf::from("cores.json"), ..Config::default() }, "index_path")]
    #[case(Config { category_marker: '/', ..Config::default() }, "category_marker")]
    #[case(Config { archive_dirs: vec!["mame/sub".to_string()], ..Config::default() }, "archive_dirs")]
    #[case(Config { archive_dirs: vec!["..".to_string()], ..Config::default() }, "archive_dirs")]
    #[case(Config { archive_dirs: vec![String::new()], ..Config::default() }, "archive_dirs")]
    #[case(Config { scan_concurrency: 0, ..Config::default() }, "scan_concurrency")]
    fn test_validate_rejects(#[case] config: Config, #[case] expected: &str) {
        let err = config.validate().unwrap_err();
        match &*err {
            ErrorKind::Invalid { field, .. } => assert_eq!(*field, expected),
            other => panic!("unexpected error: {other}"),
        }
    }
}
