mod config;

pub use config::Config;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `<config dir>/slotwise[-dev]/` based on SLOTWISE_ENV.
///
/// Set SLOTWISE_ENV=dev to use a development configuration directory.
/// The directory is not created here; [`Config::save_to`] creates it on write.
///
/// # Errors
/// Returns an error if the platform configuration directory cannot be
/// determined.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

    let env = std::env::var("SLOTWISE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("slotwise-dev")
    } else {
        base_dir.join("slotwise")
    };

    Ok(dir)
}
