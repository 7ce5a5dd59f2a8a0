//! Session lifecycle
//!
//! A session is valid for one hour after issuance. Nothing revokes it;
//! it simply stops being usable and the operator has to sign in again.

use chrono::{DateTime, Duration, Local};
use simfleet_client::{exchange_credentials, Credentials, Transport};
use simfleet_store::{Session, SessionVault};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{AuthError, SessionError};

/// Seconds a token stays usable after issuance
pub const SESSION_LIFETIME_SECS: i64 = 3600;

pub fn session_lifetime() -> Duration {
    Duration::seconds(SESSION_LIFETIME_SECS)
}

/// Whether `session` may still be used at `now`
pub fn is_valid(session: &Session, now: DateTime<Local>) -> bool {
    session.age(now) <= session_lifetime()
}

/// Snapshot of the stored session, for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Missing,
    Valid {
        issued_at: DateTime<Local>,
        remaining: Duration,
    },
    Expired {
        issued_at: DateTime<Local>,
        age: Duration,
    },
}

/// Owns token acquisition and the validity check
pub struct SessionStore {
    vault: Arc<dyn SessionVault>,
    transport: Arc<dyn Transport>,
}

impl SessionStore {
    pub fn new(vault: Arc<dyn SessionVault>, transport: Arc<dyn Transport>) -> Self {
        Self { vault, transport }
    }

    /// Exchange credentials for a token and persist it.
    ///
    /// Nothing is written when the exchange fails.
    pub async fn acquire(
        &self,
        credentials: &Credentials,
        now: DateTime<Local>,
    ) -> Result<(Session, u16), AuthError> {
        let issued = exchange_credentials(self.transport.as_ref(), credentials)
            .await
            .map_err(AuthError::Rejected)?;

        let session = Session::new(issued.token, now);
        self.vault.save(&session)?;

        info!(issued_at = %session.issued_at, "Session acquired");
        Ok((session, issued.status))
    }

    /// The stored session, if it is still valid at `now`
    pub fn current(&self, now: DateTime<Local>) -> Result<Session, SessionError> {
        let session = self.vault.load()?.ok_or(SessionError::NoSession)?;

        if !is_valid(&session, now) {
            let age_secs = session.age(now).num_seconds();
            debug!(age_secs, "Session expired");
            return Err(SessionError::SessionExpired { age_secs });
        }

        Ok(session)
    }

    /// Describe the stored session without failing on expiry
    pub fn status(&self, now: DateTime<Local>) -> Result<SessionState, SessionError> {
        let Some(session) = self.vault.load()? else {
            return Ok(SessionState::Missing);
        };

        let age = session.age(now);
        Ok(if is_valid(&session, now) {
            SessionState::Valid {
                issued_at: session.issued_at,
                remaining: session_lifetime() - age,
            }
        } else {
            SessionState::Expired {
                issued_at: session.issued_at,
                age,
            }
        })
    }
}
