//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Management API settings
    #[serde(default)]
    pub api: RawApiConfig,

    /// File locations
    #[serde(default)]
    pub paths: RawPathsConfig,

    /// Usage query window
    #[serde(default)]
    pub usage: RawUsageConfig,

    /// SIM listing
    #[serde(default)]
    pub listing: RawListingConfig,
}

/// Management API settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawApiConfig {
    /// Base URL, without trailing `/v1`
    pub base_url: Option<String>,

    /// SIMs per page for `list`
    pub page_size: Option<u32>,

    /// Events per page for `events`
    pub events_page_size: Option<u32>,

    /// Sort expression passed to the events endpoint
    pub events_sort: Option<String>,
}

/// File locations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPathsConfig {
    /// Directory holding the session file and audit log
    pub data_dir: Option<PathBuf>,

    /// Session file (default: `<data_dir>/token`)
    pub session_file: Option<PathBuf>,

    /// Audit log (default: `<data_dir>/simfleet.log`)
    pub audit_log: Option<PathBuf>,
}

/// Usage query window
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawUsageConfig {
    /// Days covered when no range is given
    pub default_window_days: Option<u32>,

    /// Longest window the API accepts
    pub max_window_days: Option<u32>,
}

/// SIM listing
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawListingConfig {
    /// Upper bound for `list --pages`
    pub max_pages: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_sections() {
        let toml_str = r#"
            config_version = 1

            [api]
            base_url = "https://api.example.com/management-api"
            page_size = 50
            events_sort = "timestamp"

            [paths]
            data_dir = "/var/lib/simfleet"
            audit_log = "/var/log/simfleet.log"

            [usage]
            default_window_days = 7

            [listing]
            max_pages = 3
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.page_size, Some(50));
        assert_eq!(config.paths.session_file, None);
        assert_eq!(config.usage.default_window_days, Some(7));
        assert_eq!(config.listing.max_pages, Some(3));
    }
}
