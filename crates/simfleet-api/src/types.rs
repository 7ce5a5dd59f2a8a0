//! SIM record types

use serde::{Deserialize, Serialize};
use simfleet_util::Iccid;
use std::fmt;
use std::str::FromStr;

/// Administrative state of a SIM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimStatus {
    Enabled,
    Disabled,
}

impl SimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimStatus::Enabled => "Enabled",
            SimStatus::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for SimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enabled" => Ok(SimStatus::Enabled),
            "disabled" => Ok(SimStatus::Disabled),
            other => Err(format!("unknown SIM status '{}'", other)),
        }
    }
}

/// Current state of one SIM as the management API reports it.
///
/// Only `imei_lock`, `status` and `label` are writable; everything else is
/// informational. Fields the client does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimRecord {
    pub iccid: Iccid,

    #[serde(default)]
    pub imsi: Option<String>,

    #[serde(default)]
    pub msisdn: Option<String>,

    #[serde(default)]
    pub imei: Option<String>,

    #[serde(default)]
    pub imei_lock: bool,

    pub status: SimStatus,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub activation_date: Option<String>,

    #[serde(default)]
    pub ip_address: Option<String>,

    #[serde(default)]
    pub current_quota: Option<serde_json::Value>,

    #[serde(default)]
    pub quota_status: Option<serde_json::Value>,

    #[serde(default, rename = "current_quota_SMS")]
    pub current_quota_sms: Option<serde_json::Value>,

    #[serde(default, rename = "quota_status_SMS")]
    pub quota_status_sms: Option<serde_json::Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SimRecord {
    /// Label as shown to operators; unset labels read as empty
    pub fn label_or_empty(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}
