//! Default paths for simfleet
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/simfleet/config.toml` or `~/.config/simfleet/config.toml`
//! - Data: `$XDG_DATA_HOME/simfleet` or `~/.local/share/simfleet`
//!
//! The session file and the audit log live in the data directory.

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const SIMFLEET_CONFIG_ENV: &str = "SIMFLEET_CONFIG";

/// Environment variable for overriding the data directory
pub const SIMFLEET_DATA_DIR_ENV: &str = "SIMFLEET_DATA_DIR";

/// Session file name within the data directory
pub const SESSION_FILENAME: &str = "token";

/// Audit log file name within the data directory
pub const AUDIT_LOG_FILENAME: &str = "simfleet.log";

const CONFIG_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "simfleet";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$SIMFLEET_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/simfleet/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/simfleet/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(SIMFLEET_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the config path without checking SIMFLEET_CONFIG.
pub fn config_path_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/tmp").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory, ignoring `$SIMFLEET_DATA_DIR`.
///
/// The CLI applies `--data-dir` / `$SIMFLEET_DATA_DIR` on top of this.
/// 1. `$XDG_DATA_HOME/simfleet` (if XDG_DATA_HOME is set)
/// 2. `~/.local/share/simfleet` (fallback)
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
