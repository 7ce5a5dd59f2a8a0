//! Read-modify-write bulk mutations
//!
//! The management API replaces every writable field of a SIM on write, so a
//! change to one field has to resend the other two as they currently are:
//!
//! 1. fetch each target SIM, one at a time
//! 2. merge the intended change into what was fetched
//! 3. submit all patches in a single request
//! 4. record one audit entry per ICCID
//!
//! A failed fetch does not abort the batch. That SIM's patch carries only
//! the targeted field and its prior value is logged as `UNKNOWN`.

use simfleet_api::{MutableField, MutationIntent, MutationPatch, RemoteError, SimRecord};
use simfleet_client::SimRepository;
use simfleet_store::AuditSink;
use simfleet_util::{Iccid, InputError, InputResult};
use tracing::{debug, info, warn};

use crate::{classify, Classification, CommandResult};

/// Logged in place of a prior value that could not be fetched
pub const UNKNOWN_PRIOR: &str = "UNKNOWN";

/// What step 1 learned about one SIM
#[derive(Debug, Clone, PartialEq)]
pub enum PriorState {
    Fetched(SimRecord),
    Failed(RemoteError),
}

impl PriorState {
    /// Prior value of `field`, rendered for the audit log
    pub fn prior_display(&self, field: MutableField) -> String {
        match self {
            PriorState::Fetched(record) => match field {
                MutableField::ImeiLock => record.imei_lock.to_string(),
                MutableField::Status => record.status.to_string(),
                MutableField::Label => record.label_or_empty().to_string(),
            },
            PriorState::Failed(_) => UNKNOWN_PRIOR.to_string(),
        }
    }
}

/// One SIM and the change to apply to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub iccid: Iccid,
    pub intent: MutationIntent,
}

/// Apply the same change to every ICCID
pub fn plan_uniform(iccids: Vec<Iccid>, intent: MutationIntent) -> InputResult<Vec<BatchItem>> {
    if iccids.is_empty() {
        return Err(InputError::EmptyIccidList);
    }
    Ok(iccids
        .into_iter()
        .map(|iccid| BatchItem {
            iccid,
            intent: intent.clone(),
        })
        .collect())
}

/// Pair ICCIDs with labels by position
pub fn plan_labels(iccids: Vec<Iccid>, labels: Vec<String>) -> InputResult<Vec<BatchItem>> {
    if iccids.is_empty() {
        return Err(InputError::EmptyIccidList);
    }
    if iccids.len() != labels.len() {
        return Err(InputError::ArityMismatch {
            iccids: iccids.len(),
            labels: labels.len(),
        });
    }
    Ok(iccids
        .into_iter()
        .zip(labels)
        .map(|(iccid, label)| BatchItem {
            iccid,
            intent: MutationIntent::Label(label),
        })
        .collect())
}

/// Carry every writable field of `record` over, then apply `intent`
pub fn merge_patch(record: &SimRecord, intent: &MutationIntent) -> MutationPatch {
    let mut patch = MutationPatch {
        iccid: record.iccid.clone(),
        label: Some(record.label_or_empty().to_string()),
        imei_lock: Some(record.imei_lock),
        status: Some(record.status),
    };
    patch.apply(intent);
    patch
}

pub fn build_patch(iccid: &Iccid, prior: &PriorState, intent: &MutationIntent) -> MutationPatch {
    match prior {
        PriorState::Fetched(record) => {
            let mut patch = merge_patch(record, intent);
            patch.iccid = iccid.clone();
            patch
        }
        PriorState::Failed(_) => MutationPatch::targeted(iccid.clone(), intent),
    }
}

fn field_title(field: MutableField) -> &'static str {
    match field {
        MutableField::ImeiLock => "IMEI lock",
        MutableField::Status => "Status",
        MutableField::Label => "Label",
    }
}

/// Per-ICCID record of what was attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub iccid: Iccid,
    pub prior: String,
    pub new_value: String,
    /// Message written to the audit log
    pub message: String,
}

/// Result of one bulk mutation
#[derive(Debug, Clone, PartialEq)]
pub struct BulkReport {
    /// Classification of the single bulk-update response
    pub classification: Classification,
    pub items: Vec<ItemOutcome>,
    pub patches: Vec<MutationPatch>,
}

/// Runs one bulk mutation against an authenticated repository
pub struct BulkMutationCoordinator<'a> {
    repo: &'a SimRepository,
    audit: &'a dyn AuditSink,
}

impl<'a> BulkMutationCoordinator<'a> {
    pub fn new(repo: &'a SimRepository, audit: &'a dyn AuditSink) -> Self {
        Self { repo, audit }
    }

    /// Fetch prior state for every item, sequentially
    async fn fetch_priors(&self, items: &[BatchItem]) -> Vec<PriorState> {
        let mut priors = Vec::with_capacity(items.len());
        for item in items {
            let prior = match self.repo.get_one(&item.iccid).await {
                Ok(fetched) => PriorState::Fetched(fetched.value),
                Err(e) => {
                    warn!(
                        iccid = %item.iccid,
                        error = %e,
                        "Prior state unavailable; only the targeted field will be sent"
                    );
                    PriorState::Failed(e)
                }
            };
            priors.push(prior);
        }
        priors
    }

    /// Run the full protocol under `action`
    pub async fn run(&self, action: &str, items: Vec<BatchItem>) -> CommandResult<BulkReport> {
        if items.is_empty() {
            return Err(InputError::EmptyIccidList.into());
        }

        let priors = self.fetch_priors(&items).await;
        let patches: Vec<MutationPatch> = items
            .iter()
            .zip(&priors)
            .map(|(item, prior)| build_patch(&item.iccid, prior, &item.intent))
            .collect();

        let (status, server_message) = match self.repo.bulk_update(&patches).await {
            Ok(ack) => (i32::from(ack.status), ack.message),
            Err(e) => (e.code, e.message),
        };
        debug!(action, status, count = patches.len(), "Bulk update answered");

        let field = items[0].intent.target_field();
        let summary = format!(
            "{} updated on {} SIM(s)",
            field_title(field),
            items.len()
        );
        let verdict = classify(status, &summary, false);
        let succeeded = verdict.outcome.is_success();
        let classification = if succeeded {
            verdict
        } else {
            classify(status, &server_message, false)
        };

        let mut outcomes = Vec::with_capacity(items.len());
        for (item, prior) in items.into_iter().zip(&priors) {
            let field = item.intent.target_field();
            let prior = prior.prior_display(field);
            let new_value = item.intent.value_display();
            let message = if succeeded {
                format!(
                    "{} changed from '{}' to '{}'",
                    field_title(field),
                    prior,
                    new_value
                )
            } else {
                format!(
                    "{} change from '{}' to '{}' failed: {}",
                    field_title(field),
                    prior,
                    new_value,
                    server_message
                )
            };

            self.audit
                .append(action, item.iccid.as_str(), &message, status)?;
            outcomes.push(ItemOutcome {
                iccid: item.iccid,
                prior,
                new_value,
                message,
            });
        }

        if succeeded {
            info!(action, status, count = outcomes.len(), "Bulk update applied");
        } else {
            info!(action, status, message = %server_message, "Bulk update failed");
        }

        Ok(BulkReport {
            classification,
            items: outcomes,
            patches,
        })
    }
}
