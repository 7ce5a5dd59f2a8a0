//! Store trait definitions

use crate::{LogEntry, Session, StoreResult};

/// Append-only record of every attempted action
pub trait AuditSink: Send + Sync {
    /// Record one entry per ICCID in the comma-separated `target`.
    /// `"NA"` or any other single value yields exactly one entry.
    fn append(&self, action: &str, target: &str, message: &str, http_code: i32)
        -> StoreResult<()>;

    /// Newest entries first
    fn recent(&self, limit: usize) -> StoreResult<Vec<LogEntry>>;
}

/// Durable home of the current session
pub trait SessionVault: Send + Sync {
    /// Load the persisted session, if any
    fn load(&self) -> StoreResult<Option<Session>>;

    /// Replace the persisted session
    fn save(&self, session: &Session) -> StoreResult<()>;
}
