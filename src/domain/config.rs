use std::{io, path::Path};

use serde::{Deserialize, Serialize};

use crate::storage::{ExportOptions, WalkOptions};

/// Default settings for walking and exporting requirements files.
///
/// Stored as TOML, e.g. in `requirement-walker.toml`:
///
/// ```toml
/// _version = "1"
/// no_empty_lines = true
/// no_comment_only_lines = true
/// no_duplicates = true
/// max_depth = 32
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Drop blank lines when flattening.
    pub no_empty_lines: bool,

    /// Drop lines that carry only a comment when flattening.
    pub no_comment_only_lines: bool,

    /// Drop lines whose text was already written when exporting.
    pub no_duplicates: bool,

    /// The deepest level of nested includes to follow.
    ///
    /// Unset by default, in which case a file that includes itself is walked
    /// forever.
    pub max_depth: Option<usize>,
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the configuration at `path`, or the defaults if it can't be
    /// loaded.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config from {}: {e}", path.display());
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or the file
    /// cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Traversal settings derived from this configuration.
    #[must_use]
    pub const fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            no_empty_lines: self.no_empty_lines,
            no_comment_only_lines: self.no_comment_only_lines,
            max_depth: self.max_depth,
        }
    }

    /// Export settings derived from this configuration.
    #[must_use]
    pub const fn export_options(&self) -> ExportOptions {
        ExportOptions {
            walk: self.walk_options(),
            no_duplicates: self.no_duplicates,
        }
    }
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid configuration TOML.
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors that can occur when saving a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The configuration could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Toml(#[from] toml::ser::Error),
    /// The file could not be written.
    #[error("Failed to write config file: {0}")]
    Io(#[from] io::Error),
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        no_empty_lines: bool,

        #[serde(default)]
        no_comment_only_lines: bool,

        #[serde(default)]
        no_duplicates: bool,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_depth: Option<usize>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                no_empty_lines,
                no_comment_only_lines,
                no_duplicates,
                max_depth,
            } => Self {
                no_empty_lines,
                no_comment_only_lines,
                no_duplicates,
                max_depth,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            no_empty_lines: config.no_empty_lines,
            no_comment_only_lines: config.no_comment_only_lines,
            no_duplicates: config.no_duplicates,
            max_depth: config.max_depth,
        }
    }
}
