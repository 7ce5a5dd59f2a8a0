//! Strongly-typed identifiers for simfleet

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::InputError;

const ICCID_MIN_LEN: usize = 18;
const ICCID_MAX_LEN: usize = 22;

/// Integrated circuit card identifier of a SIM
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iccid(String);

impl Iccid {
    /// Validate and wrap an ICCID
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        let len_ok = (ICCID_MIN_LEN..=ICCID_MAX_LEN).contains(&trimmed.len());
        if !len_ok || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(InputError::InvalidIccid(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iccid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Iccid {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse a comma-separated ICCID list, keeping input order
pub fn parse_iccid_list(raw: &str) -> Result<Vec<Iccid>, InputError> {
    if raw.trim().is_empty() {
        return Err(InputError::EmptyIccidList);
    }
    raw.split(',').map(Iccid::parse).collect()
}

/// Split a comma-separated value list positionally. Empty segments are kept.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}
