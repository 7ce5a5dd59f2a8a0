//! What a command produced, for the presentation layer

use serde_json::Value;
use simfleet_api::{SimRecord, UsageSample};
use simfleet_store::LogEntry;

use crate::{Classification, DateRange, Outcome, SessionState};

/// A line for the operator's terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// Regular output (stdout)
    Info(String),
    /// Recoverable adjustment (stderr)
    Warn(String),
    /// Failure (stderr)
    Error(String),
}

/// Data returned by a command
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Sims(Vec<SimRecord>),
    Sim(SimRecord),
    Json(Value),
    Usage {
        range: DateRange,
        samples: Vec<UsageSample>,
    },
    Log(Vec<LogEntry>),
    Session(SessionState),
}

/// Everything one command produced
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReport {
    /// Worst outcome seen while running the command
    pub outcome: Outcome,
    pub payload: Payload,
    pub console: Vec<ConsoleLine>,
}

impl CommandReport {
    pub fn new(outcome: Outcome, payload: Payload) -> Self {
        Self {
            outcome,
            payload,
            console: Vec::new(),
        }
    }

    /// Local-only command that cannot fail remotely
    pub fn local(payload: Payload) -> Self {
        Self::new(Outcome::Success, payload)
    }

    pub fn push(&mut self, line: ConsoleLine) {
        self.console.push(line);
    }

    /// Fold a classification into the report: worst outcome wins, console
    /// text is routed by outcome
    pub fn absorb(&mut self, classification: &Classification) {
        self.outcome = self.outcome.max(classification.outcome);
        if let Some(text) = &classification.console {
            self.console.push(match classification.outcome {
                Outcome::Success => ConsoleLine::Info(text.clone()),
                Outcome::SoftFailure | Outcome::HardFailure => ConsoleLine::Error(text.clone()),
            });
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.outcome.is_fatal()
    }
}
