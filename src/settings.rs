//! Program settings, read from `settings.toml` in the episim config directory.
use crate::get_episim_config_dir;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

const SETTINGS_FILE_HEADER: &str = "# episim program settings
# Settings which are commented out take their default value
";

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Location of the settings file for the current user
pub fn get_settings_file_path() -> PathBuf {
    get_episim_config_dir().join(SETTINGS_FILE_NAME)
}

/// Defaults applied to every `run` and `validate` command
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Log level, unless overridden by EPISIM_LOG_LEVEL
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether to replace a non-empty output folder
    #[serde(default)]
    pub overwrite: bool,
    /// Whether to write the state of every individual on every day to CSV
    #[serde(default)]
    pub debug_model: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            overwrite: false,
            debug_model: false,
        }
    }
}

impl Settings {
    /// Load the user's settings, falling back on the defaults if there is no settings file
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if file_path.is_file() {
            read_toml(file_path)
        } else {
            Ok(Settings::default())
        }
    }

    /// A settings file with every setting commented out and preceded by its description
    pub fn default_file_contents() -> Result<String> {
        let defaults = toml::to_string(&Settings::default())?;

        let mut out = SETTINGS_FILE_HEADER.to_string();
        for line in defaults.lines() {
            let Some((field, _)) = line.split_once('=') else {
                continue;
            };
            let field = field.trim();
            let docs = Settings::get_field_docs(field)
                .ok()
                .with_context(|| format!("No description for setting {field}"))?;

            writeln!(out)?;
            for doc_line in docs.lines() {
                writeln!(out, "# # {}", doc_line.trim())?;
            }
            writeln!(out, "# {}", line.trim())?;
        }

        Ok(out)
    }
}
