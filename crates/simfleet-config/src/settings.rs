//! Validated settings

use crate::schema::{RawApiConfig, RawConfig, RawListingConfig, RawPathsConfig, RawUsageConfig};
use simfleet_util::{data_dir_without_env, AUDIT_LOG_FILENAME, SESSION_FILENAME};
use std::path::{Path, PathBuf};

/// Default management API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.1nce.com/management-api";

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_EVENTS_SORT: &str = "-timestamp";
pub const DEFAULT_WINDOW_DAYS: u32 = 14;
pub const MAX_WINDOW_DAYS: u32 = 180;
pub const MAX_LIST_PAGES: u32 = 10;

/// Validated configuration ready for use by the engine
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub api: ApiSettings,
    pub paths: PathSettings,
    pub usage: UsageSettings,
    pub listing: ListingSettings,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            api: ApiSettings::from_raw(raw.api),
            paths: PathSettings::from_raw(raw.paths),
            usage: UsageSettings::from_raw(raw.usage),
            listing: ListingSettings::from_raw(raw.listing),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub page_size: u32,
    pub events_page_size: u32,
    pub events_sort: String,
}

impl ApiSettings {
    fn from_raw(raw: RawApiConfig) -> Self {
        Self {
            base_url: raw
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            page_size: raw.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            events_page_size: raw.events_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            events_sort: raw
                .events_sort
                .unwrap_or_else(|| DEFAULT_EVENTS_SORT.to_string()),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self::from_raw(RawApiConfig::default())
    }
}

/// Where the session file and the audit log live
#[derive(Debug, Clone)]
pub struct PathSettings {
    data_dir: PathBuf,
    session_file: Option<PathBuf>,
    audit_log: Option<PathBuf>,
}

impl PathSettings {
    fn from_raw(raw: RawPathsConfig) -> Self {
        Self {
            data_dir: raw.data_dir.unwrap_or_else(data_dir_without_env),
            session_file: raw.session_file,
            audit_log: raw.audit_log,
        }
    }

    /// Replace the data directory; explicitly configured files stay put
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn session_file(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(SESSION_FILENAME))
    }

    pub fn audit_log(&self) -> PathBuf {
        self.audit_log
            .clone()
            .unwrap_or_else(|| self.data_dir.join(AUDIT_LOG_FILENAME))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self::from_raw(RawPathsConfig::default())
    }
}

/// Bounds for usage query windows, in days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSettings {
    pub default_window_days: u32,
    pub max_window_days: u32,
}

impl UsageSettings {
    fn from_raw(raw: RawUsageConfig) -> Self {
        Self {
            default_window_days: raw.default_window_days.unwrap_or(DEFAULT_WINDOW_DAYS),
            max_window_days: raw.max_window_days.unwrap_or(MAX_WINDOW_DAYS),
        }
    }
}

impl Default for UsageSettings {
    fn default() -> Self {
        Self::from_raw(RawUsageConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSettings {
    pub max_pages: u32,
}

impl ListingSettings {
    fn from_raw(raw: RawListingConfig) -> Self {
        Self {
            max_pages: raw.max_pages.unwrap_or(MAX_LIST_PAGES),
        }
    }
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self::from_raw(RawListingConfig::default())
    }
}
