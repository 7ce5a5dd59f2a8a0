//! Plain-text audit log
//!
//! One entry per line, newest first:
//!
//! ```text
//! 2025-02-14 09:30:00 | disable-sim | 8988228066602306711 | Status set to Disabled | 201
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{ensure_parent, AuditSink, StoreError, StoreResult};

/// Target used for actions that are not about a particular SIM
pub const NO_TARGET: &str = "NA";

const FIELD_SEPARATOR: &str = " | ";

/// One audit log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub action: String,
    /// ICCID or `NA`
    pub target: String,
    pub message: String,
    pub http_code: i32,
}

impl LogEntry {
    pub fn new(
        timestamp: DateTime<Local>,
        action: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
        http_code: i32,
    ) -> Self {
        Self {
            timestamp,
            action: field_value(&action.into()),
            target: field_value(&target.into()),
            message: single_line(&message.into()),
            http_code,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}{sep}{}",
            simfleet_util::format_timestamp(&self.timestamp),
            self.action,
            self.target,
            self.message,
            self.http_code,
            sep = FIELD_SEPARATOR,
        )
    }
}

impl FromStr for LogEntry {
    type Err = StoreError;

    /// Messages may themselves contain the separator, so the first three
    /// fields are split from the left and the status code from the right.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || StoreError::Malformed(line.to_string());

        let mut head = line.splitn(4, FIELD_SEPARATOR);
        let timestamp = head.next().ok_or_else(malformed)?;
        let action = head.next().ok_or_else(malformed)?;
        let target = head.next().ok_or_else(malformed)?;
        let rest = head.next().ok_or_else(malformed)?;

        let (message, code) = rest.rsplit_once(FIELD_SEPARATOR).ok_or_else(malformed)?;

        Ok(Self {
            timestamp: simfleet_util::parse_timestamp(timestamp).ok_or_else(malformed)?,
            action: action.to_string(),
            target: target.to_string(),
            message: message.to_string(),
            http_code: code.trim().parse().map_err(|_| malformed())?,
        })
    }
}

/// Audit log kept in a text file, most recent entry on the first line
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prepend entries, in the given order, above the existing content.
    /// The last entry in `entries` ends up on the first line.
    pub fn prepend(&self, entries: &[LogEntry]) -> StoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                ensure_parent(&self.path)?;
                debug!(path = %self.path.display(), "Initializing audit log");
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut content = String::with_capacity(existing.len() + entries.len() * 96);
        for entry in entries.iter().rev() {
            content.push_str(&entry.to_string());
            content.push('\n');
        }
        content.push_str(&existing);

        // Replace the log in one step so a failed write leaves the old one intact
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;

        debug!(count = entries.len(), "Audit entries written");
        Ok(())
    }
}

impl AuditSink for AuditLog {
    fn append(&self, action: &str, target: &str, message: &str, http_code: i32) -> StoreResult<()> {
        let timestamp = simfleet_util::now();
        let entries: Vec<LogEntry> = split_targets(target)
            .map(|t| LogEntry::new(timestamp, action, t, message, http_code))
            .collect();
        self.prepend(&entries)
    }

    fn recent(&self, limit: usize) -> StoreResult<Vec<LogEntry>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            if entries.len() >= limit {
                break;
            }
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<LogEntry>() {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, "Skipping unreadable audit line"),
            }
        }
        Ok(entries)
    }
}

fn split_targets(target: &str) -> impl Iterator<Item = &str> {
    let target = if target.trim().is_empty() { NO_TARGET } else { target };
    target.split(',').map(str::trim).filter(|t| !t.is_empty())
}

fn single_line(message: &str) -> String {
    message.replace(['\r', '\n'], " ")
}

/// Action and target are split from the left when read back, so they may
/// not contain the separator character
fn field_value(value: &str) -> String {
    single_line(value).replace('|', "/")
}
