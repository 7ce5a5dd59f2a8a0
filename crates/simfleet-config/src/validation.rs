//! Configuration validation

use crate::schema::RawConfig;
use crate::settings::{MAX_LIST_PAGES, MAX_WINDOW_DAYS};
use thiserror::Error;

const MAX_PAGE_SIZE: u32 = 1000;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.base_url '{0}' must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("usage.default_window_days ({default}) exceeds usage.max_window_days ({max})")]
    DefaultWindowTooLong { default: u32, max: u32 },

    #[error("api.events_sort cannot be empty")]
    EmptyEventsSort,
}

/// Validate a raw configuration, collecting every problem
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(url) = &config.api.base_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push(ValidationError::InvalidBaseUrl(url.clone()));
    }

    check_range(&mut errors, "api.page_size", config.api.page_size, 1, MAX_PAGE_SIZE);
    check_range(
        &mut errors,
        "api.events_page_size",
        config.api.events_page_size,
        1,
        MAX_PAGE_SIZE,
    );

    if let Some(sort) = &config.api.events_sort
        && sort.trim().is_empty()
    {
        errors.push(ValidationError::EmptyEventsSort);
    }

    check_range(
        &mut errors,
        "usage.max_window_days",
        config.usage.max_window_days,
        1,
        MAX_WINDOW_DAYS,
    );
    check_range(
        &mut errors,
        "usage.default_window_days",
        config.usage.default_window_days,
        1,
        MAX_WINDOW_DAYS,
    );

    let default = config.usage.default_window_days.unwrap_or(crate::DEFAULT_WINDOW_DAYS);
    let max = config.usage.max_window_days.unwrap_or(MAX_WINDOW_DAYS);
    if default > max {
        errors.push(ValidationError::DefaultWindowTooLong { default, max });
    }

    check_range(
        &mut errors,
        "listing.max_pages",
        config.listing.max_pages,
        1,
        MAX_LIST_PAGES,
    );

    errors
}

fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: Option<u32>,
    min: u32,
    max: u32,
) {
    if let Some(value) = value
        && !(min..=max).contains(&value)
    {
        errors.push(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}
