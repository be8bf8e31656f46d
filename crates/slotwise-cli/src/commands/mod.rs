pub mod config;
pub mod engine;

use std::path::Path;

use slotwise_core::{Config, ConfigError};

/// Load config from `--config` if given, otherwise from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
