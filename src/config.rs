//! TOML configuration for reader defaults.
//!
//! Settings are read from an explicit file, or from the platform config folder:
//! - Linux: ~/.config/lineio/config.toml
//! - macOS: ~/Library/Application Support/lineio/config.toml
//! - Windows: %APPDATA%/lineio/config.toml
//!
//! Every section and key is optional; missing values take their defaults.

use crate::error::{LineIoError, Result};
use crate::file_handler::compression::{GzipListEstimator, DEFAULT_ESTIMATE_RATIO};
use crate::file_handler::csv_file::CsvControl;
use crate::file_handler::flags::LineFlags;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "lineio";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reader: ReaderConfig,
    pub csv: CsvConfig,
    pub gzip: GzipConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub skip_empty: bool,
    pub drop_newline: bool,
    pub read_ahead: bool,
    pub remove_bom: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            skip_empty: true,
            drop_newline: true,
            read_ahead: true,
            remove_bom: false,
        }
    }
}

/// CSV control characters, each a single ASCII character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub delimiter: String,
    pub enclosure: String,
    pub escape: Option<String>,
    /// Candidates tried after the common ones during delimiter detection
    pub extra_delimiters: Vec<String>,
    pub skip_header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            enclosure: "\"".to_string(),
            escape: Some("\\".to_string()),
            extra_delimiters: Vec::new(),
            skip_header: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GzipConfig {
    pub list_tool: String,
    pub estimate_ratio: u64,
}

impl Default for GzipConfig {
    fn default() -> Self {
        Self {
            list_tool: "gzip".to_string(),
            estimate_ratio: DEFAULT_ESTIMATE_RATIO,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| LineIoError::config(format!("Failed to parse config: {e}")))
    }

    /// Load `path`, failing if it cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LineIoError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the platform config file if there is one, else defaults
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// [`Config::load`] for an explicit path, [`Config::load_default`] otherwise
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        }
    }

    pub fn line_flags(&self) -> LineFlags {
        let mut flags = LineFlags::empty();
        flags.set(LineFlags::SKIP_EMPTY, self.reader.skip_empty);
        flags.set(LineFlags::DROP_NEWLINE, self.reader.drop_newline);
        flags.set(LineFlags::READ_AHEAD, self.reader.read_ahead);
        flags
    }

    pub fn csv_control(&self) -> Result<CsvControl> {
        let delimiter = ascii_byte("csv.delimiter", &self.csv.delimiter)?;
        let enclosure = ascii_byte("csv.enclosure", &self.csv.enclosure)?;
        let escape = self
            .csv
            .escape
            .as_deref()
            .map(|escape| ascii_byte("csv.escape", escape))
            .transpose()?;

        Ok(CsvControl::new(delimiter, enclosure, escape))
    }

    pub fn extra_delimiters(&self) -> Result<Vec<u8>> {
        self.csv
            .extra_delimiters
            .iter()
            .map(|delimiter| ascii_byte("csv.extra_delimiters", delimiter))
            .collect()
    }

    pub fn size_estimator(&self) -> GzipListEstimator {
        GzipListEstimator::new(self.gzip.list_tool.clone(), self.gzip.estimate_ratio)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

fn ascii_byte(key: &str, value: &str) -> Result<u8> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(LineIoError::config(format!(
            "{key} must be a single ASCII character, got {value:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.csv_control().unwrap(), CsvControl::default());
        assert_eq!(
            config.line_flags(),
            LineFlags::SKIP_EMPTY | LineFlags::DROP_NEWLINE | LineFlags::READ_AHEAD
        );
        assert!(config.extra_delimiters().unwrap().is_empty());
        assert_eq!(config.gzip.estimate_ratio, DEFAULT_ESTIMATE_RATIO);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [reader]
            skip_empty = false

            [csv]
            delimiter = ";"
            escape = ""
            extra_delimiters = ["%"]
            "#,
        );

        // An empty escape is not a single character
        assert!(config.as_ref().unwrap().csv_control().is_err());

        let config = Config::from_toml_str(
            r#"
            [reader]
            skip_empty = false

            [csv]
            delimiter = ";"
            extra_delimiters = ["%"]
            "#,
        )
        .unwrap();

        assert!(!config.line_flags().contains(LineFlags::SKIP_EMPTY));
        assert!(config.line_flags().contains(LineFlags::DROP_NEWLINE));
        assert_eq!(config.csv_control().unwrap().delimiter, b';');
        assert_eq!(config.csv_control().unwrap().enclosure, b'"');
        assert_eq!(config.extra_delimiters().unwrap(), vec![b'%']);
        assert_eq!(config.gzip, GzipConfig::default());
    }

    #[test]
    fn test_rejects_non_ascii_and_multi_char_values() {
        let mut config = Config::default();
        config.csv.delimiter = "é".to_string();
        assert!(matches!(
            config.csv_control(),
            Err(LineIoError::ConfigError { .. })
        ));

        config.csv.delimiter = ",,".to_string();
        assert!(config.csv_control().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gzip]\nlist_tool = \"pigz\"\nestimate_ratio = 7\n").unwrap();

        let config = Config::resolve(Some(&path)).unwrap();
        assert_eq!(config.gzip.list_tool, "pigz");
        assert_eq!(config.gzip.estimate_ratio, 7);

        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            Config::from_toml_str("[reader\nskip_empty = 1"),
            Err(LineIoError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let content = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::from_toml_str(&content).unwrap(), config);
    }
}
