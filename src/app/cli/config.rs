//! TOML configuration file loading and merging with CLI arguments
//!
//! The file is optional: without `--config-file` the default location is
//! read if it exists. A file that was asked for explicitly must exist and
//! parse, otherwise start-up fails.

use super::args::{split_names, Args};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of `modlife.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<String>,
    pub color: Option<bool>,
    #[serde(default)]
    pub modules: ModulesConfig,
}

/// `[modules]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModulesConfig {
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl AppConfig {
    /// `<config_dir>/Modlife/modlife.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Modlife").join("modlife.toml"))
    }

    /// Load the given file, or the default file if present, or defaults
    pub async fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let contents =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
        Self::parse(&contents, &path)
    }

    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Effective settings after merging the config file with CLI arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_level: String,
    pub log_format: String,
    pub log_file: Option<PathBuf>,
    pub color: bool,
    pub disabled: Vec<String>,
    pub check: bool,
}

impl Settings {
    /// CLI values override file values; disabled lists are merged
    ///
    /// `tty` decides colour when neither source sets it.
    pub fn resolve(args: &Args, config: &AppConfig, tty: bool) -> Self {
        let log_file = args
            .log_file
            .clone()
            .or_else(|| config.log_file.as_ref().map(PathBuf::from))
            .filter(|path| !is_disabled_log_file(path));

        let mut disabled = config.modules.disabled.clone();
        disabled.extend(args.disabled_modules());

        Self {
            log_level: args
                .log_level
                .clone()
                .or_else(|| config.log_level.clone())
                .unwrap_or_else(|| "info".to_string()),
            log_format: args
                .log_format
                .clone()
                .or_else(|| config.log_format.clone())
                .unwrap_or_else(|| "text".to_string()),
            log_file,
            color: args.color_override().or(config.color).unwrap_or(tty),
            disabled: split_names(&disabled),
            check: args.check,
        }
    }

    /// Whether the module with this display name was disabled
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|d| d.eq_ignore_ascii_case(name))
    }
}

// "none" and "-" turn file logging off
fn is_disabled_log_file(path: &Path) -> bool {
    let value = path.to_string_lossy();
    value.eq_ignore_ascii_case("none") || value == "-"
}
