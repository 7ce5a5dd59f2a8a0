//! Mutation intents and bulk-update patches

use serde::{Deserialize, Serialize};
use simfleet_util::Iccid;
use std::fmt;

use crate::SimStatus;

/// The writable SIM fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutableField {
    ImeiLock,
    Status,
    Label,
}

impl fmt::Display for MutableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutableField::ImeiLock => "imei_lock",
            MutableField::Status => "status",
            MutableField::Label => "label",
        })
    }
}

/// A change to exactly one writable field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum MutationIntent {
    ImeiLock(bool),
    Status(SimStatus),
    Label(String),
}

impl MutationIntent {
    pub fn target_field(&self) -> MutableField {
        match self {
            MutationIntent::ImeiLock(_) => MutableField::ImeiLock,
            MutationIntent::Status(_) => MutableField::Status,
            MutationIntent::Label(_) => MutableField::Label,
        }
    }

    /// New value rendered for logs
    pub fn value_display(&self) -> String {
        match self {
            MutationIntent::ImeiLock(locked) => locked.to_string(),
            MutationIntent::Status(status) => status.to_string(),
            MutationIntent::Label(label) => label.clone(),
        }
    }
}

/// One element of the `POST /v1/sims` array.
///
/// The API replaces every writable field on write, so a patch built from a
/// fetched record carries all three. A field left `None` is omitted from the
/// body; that only happens when the prior record could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationPatch {
    pub iccid: Iccid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imei_lock: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SimStatus>,
}

impl MutationPatch {
    /// A patch carrying only the identifier and the changed field
    pub fn targeted(iccid: Iccid, intent: &MutationIntent) -> Self {
        let mut patch = Self {
            iccid,
            label: None,
            imei_lock: None,
            status: None,
        };
        patch.apply(intent);
        patch
    }

    /// Overwrite the field the intent targets
    pub fn apply(&mut self, intent: &MutationIntent) {
        match intent {
            MutationIntent::ImeiLock(locked) => self.imei_lock = Some(*locked),
            MutationIntent::Status(status) => self.status = Some(*status),
            MutationIntent::Label(label) => self.label = Some(label.clone()),
        }
    }
}
