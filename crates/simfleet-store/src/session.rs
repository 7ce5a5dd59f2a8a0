//! Session file
//!
//! Holds the bearer token together with the moment it was issued. Files
//! written by older tools contain only the raw token; for those the file's
//! modification time stands in for the issuance time.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{ensure_parent, SessionVault, StoreResult};

/// A bearer token and when it was issued
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub issued_at: DateTime<Local>,
}

impl Session {
    pub fn new(token: impl Into<String>, issued_at: DateTime<Local>) -> Self {
        Self {
            token: token.into(),
            issued_at,
        }
    }

    /// Time elapsed since issuance
    pub fn age(&self, now: DateTime<Local>) -> chrono::Duration {
        now.signed_duration_since(self.issued_at)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Session persisted as a JSON file readable only by its owner
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn legacy_session(&self, token: &str) -> StoreResult<Session> {
        let modified = fs::metadata(&self.path)?.modified()?;
        debug!(path = %self.path.display(), "Reading legacy raw-token session file");
        Ok(Session::new(token, DateTime::<Local>::from(modified)))
    }
}

impl SessionVault for SessionFile {
    fn load(&self) -> StoreResult<Option<Session>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        if content.starts_with('{') {
            let session: Session = serde_json::from_str(content)?;
            return Ok(Some(session));
        }

        self.legacy_session(content).map(Some)
    }

    fn save(&self, session: &Session) -> StoreResult<()> {
        ensure_parent(&self.path)?;
        let json = serde_json::to_string(session)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;

        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_missing_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let vault = SessionFile::new(dir.path().join("token"));
        assert!(vault.load().unwrap().is_none());
    }

    #[test]
    fn test_empty_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "\n").unwrap();
        assert!(SessionFile::new(path).load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let vault = SessionFile::new(dir.path().join("nested").join("token"));
        let issued = Local.with_ymd_and_hms(2025, 2, 14, 9, 0, 0).unwrap();

        vault.save(&Session::new("abc123", issued)).unwrap();
        let loaded = vault.load().unwrap().unwrap();

        assert_eq!(loaded.token, "abc123");
        assert_eq!(loaded.issued_at, issued);
    }

    #[test]
    fn test_legacy_raw_token_uses_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "rawtoken\n").unwrap();

        let loaded = SessionFile::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded.token, "rawtoken");
        let age = loaded.age(Local::now());
        assert!(age.num_seconds().abs() < 60);
    }

    #[test]
    fn test_debug_hides_token() {
        let session = Session::new("secret", Local::now());
        assert!(!format!("{:?}", session).contains("secret"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let vault = SessionFile::new(dir.path().join("token"));
        vault.save(&Session::new("abc", Local::now())).unwrap();

        let mode = fs::metadata(vault.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
