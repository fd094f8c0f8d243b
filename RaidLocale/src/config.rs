//! Persistent configuration
//!
//! Settings come from the first file found of:
//!
//! 1. an explicit `--config` path
//! 2. `./raidlocale.toml`
//! 3. `<config dir>/raidlocale/config.toml`
//!
//! A missing file means defaults. Command-line flags override whatever is
//! loaded here.
//!
//! ```toml
//! root = "~/src/cactbot/ui/raidboss/data"
//! api_dir = "~/xivapi/sheets"
//! padding = 100
//! actor_prefixes = ["Clone", "Doppelganger"]
//! locales = ["de", "fr", "ja"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::Locale;
use crate::discovery::DEFAULT_EXCLUDES;
use crate::error::{Error, Result};
use crate::timeline_replace::{DEFAULT_ACTOR_PREFIXES, DEFAULT_PADDING, Options};

/// Config file looked up in the working directory
pub const LOCAL_CONFIG: &str = "raidlocale.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raidboss data directory to scan
    pub root: PathBuf,
    /// Directory holding the structured-API sheet dumps
    pub api_dir: PathBuf,
    /// Directory holding `<locale>/<Sheet>.csv` community tables
    pub community_dir: PathBuf,
    pub padding: u32,
    pub actor_prefixes: Vec<String>,
    pub flag_new_blocks: bool,
    pub locales: Vec<Locale>,
    /// Path segments to skip during discovery
    pub exclude: Vec<String>,
    /// Process at most this many files
    pub limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("ui/raidboss/data"),
            api_dir: PathBuf::from("resources/xivapi"),
            community_dir: PathBuf::from("resources/community"),
            padding: DEFAULT_PADDING,
            actor_prefixes: DEFAULT_ACTOR_PREFIXES.iter().map(ToString::to_string).collect(),
            flag_new_blocks: false,
            locales: Locale::MANAGED.to_vec(),
            exclude: DEFAULT_EXCLUDES.iter().map(ToString::to_string).collect(),
            limit: None,
        }
    }
}

impl Config {
    /// Load from `explicit`, or the first default location that exists.
    ///
    /// # Errors
    /// Fails if a config file exists but cannot be read or parsed. An
    /// explicit path that does not exist is an error too.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(&expand(path));
        }

        for path in Self::search_paths() {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Default lookup locations, most specific first
    #[must_use]
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("raidlocale").join("config.toml"));
        }
        paths
    }

    /// Read and parse one file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::parse(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text, expanding `~` in the path settings
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        config.root = expand(&config.root);
        config.api_dir = expand(&config.api_dir);
        config.community_dir = expand(&config.community_dir);
        Ok(config)
    }

    /// Pipeline options from these settings
    #[must_use]
    pub fn to_options(&self) -> Options {
        Options {
            padding: self.padding,
            actor_prefixes: self.actor_prefixes.clone(),
            flag_new_blocks: self.flag_new_blocks,
            locales: self.locales.clone(),
        }
    }
}

/// `~` expansion; non-UTF-8 paths pass through untouched
fn expand(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            padding = 40
            actor_prefixes = ["Clone", "Doppelganger"]
            locales = ["de", "cn"]
            limit = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.padding, 40);
        assert_eq!(config.locales, vec![Locale::De, Locale::Cn]);
        assert_eq!(config.limit, Some(3));
        assert_eq!(config.exclude, vec!["00-misc".to_string()]);
        assert_eq!(config.root, PathBuf::from("ui/raidboss/data"));

        let options = config.to_options();
        assert_eq!(options.padding, 40);
        assert_eq!(options.actor_prefixes, vec!["Clone", "Doppelganger"]);
    }

    #[test]
    fn test_tilde_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let config = Config::parse(r#"root = "~/raidboss""#).unwrap();
        assert_eq!(config.root, home.join("raidboss"));
    }

    #[test]
    fn test_unknown_locale_rejected() {
        assert!(Config::parse(r#"locales = ["xx"]"#).is_err());
    }

    #[test]
    fn test_bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raidlocale.toml");
        fs::write(&path, "padding = \"wide\"").unwrap();

        match Config::load(Some(&path)) {
            Err(Error::Config { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(Some(&dir.path().join("nope.toml"))),
            Err(Error::Io(_))
        ));
    }
}
