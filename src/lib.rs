//! Common functionality for episim, an agent-based simulation of infectious disease spread.
#![warn(missing_docs)]
use std::path::PathBuf;

/// Define a function returning the default value of a parameter, for `#[serde(default)]`
macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

pub mod cli;
pub mod disease;
pub mod environment;
pub mod error;
pub mod individual;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod settings;
pub mod simulation;
pub mod spatial;

#[cfg(test)]
mod fixture;

/// Get the path to the episim configuration directory.
///
/// Falls back on the current directory if the platform has no standard config location.
pub fn get_episim_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_default().join("episim")
}
