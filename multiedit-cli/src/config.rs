use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::output::OutputFormat;
use crate::core::{EditError, Result};
use crate::edit::EditOptions;

/// Project-level config file name, looked up in the current directory
pub const PROJECT_CONFIG_FILE: &str = "multiedit.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub edit: EditConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Defaults for batch options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditConfig {
    /// Write a `.backup.{millis}` snapshot before every non-dry-run batch
    #[serde(default)]
    pub backup: bool,

    /// Never write target files
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Print a line diff for dry runs in text output
    #[serde(default = "default_show_diff")]
    pub show_diff: bool,
}

fn default_show_diff() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            show_diff: default_show_diff(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Priority, highest first:
    /// 1. `./multiedit.toml`
    /// 2. `~/.config/multiedit/config.toml`
    /// 3. Built-in defaults
    ///
    /// A file that exists replaces the layer below it entirely; missing keys
    /// inside it fall back to the defaults.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                tracing::debug!("Loading global config from: {}", global_path.display());
                config = Self::load_from_file(&global_path)?;
            }
        }

        let project_path = PathBuf::from(PROJECT_CONFIG_FILE);
        if project_path.exists() {
            tracing::debug!("Loading project config from: {}", project_path.display());
            config = Self::load_from_file(&project_path)?;
        }

        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            EditError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&contents)
            .map_err(|e| EditError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// `~/.config/multiedit/config.toml`
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("multiedit").join("config.toml"))
    }

    /// Batch options from config, with command-line switches able to turn
    /// either one on but never off
    pub fn edit_options(&self, backup: bool, dry_run: bool) -> EditOptions {
        EditOptions {
            backup: self.edit.backup || backup,
            dry_run: self.edit.dry_run || dry_run,
        }
    }
}
