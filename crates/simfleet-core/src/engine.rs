//! Command engine
//!
//! Every command follows the same path: validate input, check the session,
//! make the remote call(s), classify, record in the audit log. Fatal
//! conditions are recorded too before they are returned.

use chrono::{DateTime, Local};
use simfleet_api::{MutationIntent, RemoteResult, SimStatus, CLIENT_DETECTED_CODE};
use simfleet_client::{Credentials, Fetched, SimRepository, Transport};
use simfleet_config::Settings;
use simfleet_store::{AuditSink, SessionVault, NO_TARGET};
use simfleet_util::{parse_iccid_list, split_list, Iccid, InputError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    classify, plan_labels, plan_uniform, AuthError, BatchItem, BulkMutationCoordinator,
    Classification, CommandError, CommandReport, CommandResult, ConsoleLine, DateRangeResolver,
    Outcome, Payload, SessionStore,
};

/// Action names as they appear in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GetToken,
    GetSims,
    GetSim,
    GetSimStatus,
    GetSimUsage,
    GetSimQuota,
    GetSimEvents,
    GetSimConnectivity,
    ResetSimConnectivity,
    SetSimLabel,
    EnableSim,
    DisableSim,
    LockSimImei,
    UnlockSimImei,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GetToken => "get-token",
            Action::GetSims => "get-sims",
            Action::GetSim => "get-sim",
            Action::GetSimStatus => "get-sim-status",
            Action::GetSimUsage => "get-sim-usage",
            Action::GetSimQuota => "get-sim-quota",
            Action::GetSimEvents => "get-sim-events",
            Action::GetSimConnectivity => "get-sim-connectivity",
            Action::ResetSimConnectivity => "reset-sim-connectivity",
            Action::SetSimLabel => "set-sim-label",
            Action::EnableSim => "enable-sim",
            Action::DisableSim => "disable-sim",
            Action::LockSimImei => "lock-sim-imei",
            Action::UnlockSimImei => "unlock-sim-imei",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs operator commands against the management API
pub struct FleetEngine {
    transport: Arc<dyn Transport>,
    sessions: SessionStore,
    audit: Arc<dyn AuditSink>,
    resolver: DateRangeResolver,
    settings: Settings,
}

impl FleetEngine {
    pub fn new(
        settings: Settings,
        transport: Arc<dyn Transport>,
        vault: Arc<dyn SessionVault>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        debug!(base_url = %settings.api.base_url, "Fleet engine initialized");
        Self {
            sessions: SessionStore::new(vault, transport.clone()),
            resolver: DateRangeResolver::from_settings(&settings.usage),
            transport,
            audit,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Record an aborted command and hand the error back
    fn fatal(&self, action: Action, target: &str, err: impl Into<CommandError>) -> CommandError {
        let err = err.into();
        info!(action = %action, error = %err, "Command aborted");

        let target = if target.trim().is_empty() { NO_TARGET } else { target };
        if let Err(log_err) =
            self.audit
                .append(action.as_str(), target, &err.to_string(), CLIENT_DETECTED_CODE)
        {
            warn!(error = %log_err, "Failed to record aborted command");
        }
        err
    }

    fn parse_iccid(&self, action: Action, raw: &str) -> CommandResult<Iccid> {
        Iccid::parse(raw).map_err(|e| self.fatal(action, raw, e))
    }

    /// Repository bound to the current session, or the reason there is none
    fn authorize(&self, action: Action, target: &str, now: DateTime<Local>) -> CommandResult<SimRepository> {
        let session = self
            .sessions
            .current(now)
            .map_err(|e| self.fatal(action, target, e))?;
        Ok(SimRepository::new(self.transport.clone(), session.token))
    }

    fn record(&self, action: Action, target: &str, classification: &Classification) -> CommandResult<()> {
        if classification.outcome.is_fatal() {
            info!(
                action = %action,
                status = classification.http_code,
                message = %classification.log_message,
                "Request failed"
            );
        }
        self.audit.append(
            action.as_str(),
            target,
            &classification.log_message,
            classification.http_code,
        )?;
        Ok(())
    }

    /// Classify and record a read. On success the payload is the output, so
    /// the success message only goes to the audit log.
    fn finish_read<T>(
        &self,
        action: Action,
        iccid: &Iccid,
        success_message: &str,
        result: RemoteResult<Fetched<T>>,
        into_payload: impl FnOnce(T) -> Payload,
    ) -> CommandResult<CommandReport> {
        let (classification, payload) = match result {
            Ok(fetched) => (
                classify(i32::from(fetched.status), success_message, false),
                into_payload(fetched.value),
            ),
            Err(e) => (classify(e.code, &e.message, false), Payload::None),
        };

        self.record(action, iccid.as_str(), &classification)?;

        let mut report = CommandReport::new(Outcome::Success, payload);
        if classification.outcome.is_success() {
            report.outcome = classification.outcome;
        } else {
            report.payload = Payload::None;
            report.absorb(&classification);
        }
        Ok(report)
    }

    /// Exchange credentials for a fresh session
    pub async fn acquire_token(
        &self,
        credentials: &Credentials,
        now: DateTime<Local>,
    ) -> CommandResult<CommandReport> {
        let action = Action::GetToken;

        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(self.fatal(
                action,
                NO_TARGET,
                InputError::argument("username and password are required"),
            ));
        }

        match self.sessions.acquire(credentials, now).await {
            Ok((session, status)) => {
                let classification = classify(
                    i32::from(status),
                    "Token acquired; valid for 60 minutes",
                    false,
                );
                self.record(action, NO_TARGET, &classification)?;
                info!(issued_at = %session.issued_at, "Token stored");

                let mut report = CommandReport::local(Payload::None);
                report.absorb(&classification);
                Ok(report)
            }
            Err(AuthError::Rejected(e)) => {
                let classification = classify(e.code, &e.message, false);
                self.record(action, NO_TARGET, &classification)?;

                let mut report = CommandReport::local(Payload::None);
                report.absorb(&classification);
                if classification.outcome.is_fatal() {
                    report.push(ConsoleLine::Error(e.message));
                }
                // Without a token there is nothing to continue with
                report.outcome = Outcome::HardFailure;
                Ok(report)
            }
            Err(e) => Err(self.fatal(action, NO_TARGET, e)),
        }
    }

    /// List SIMs one page at a time, pages `1..=pages`.
    ///
    /// Each page is classified and logged on its own with its actual status.
    /// Client-detected failures stay out of the console. A hard failure or
    /// an empty page ends the listing.
    pub async fn list_sims(&self, pages: u32, now: DateTime<Local>) -> CommandResult<CommandReport> {
        let action = Action::GetSims;
        let max_pages = self.settings.listing.max_pages;

        if pages == 0 || pages > max_pages {
            return Err(self.fatal(
                action,
                NO_TARGET,
                InputError::argument(format!("pages must be between 1 and {}", max_pages)),
            ));
        }

        let repo = self.authorize(action, NO_TARGET, now)?;
        let page_size = self.settings.api.page_size;

        let mut report = CommandReport::local(Payload::None);
        let mut sims = Vec::new();

        for page in 1..=pages {
            let (classification, fetched) = match repo.list_page(page, page_size).await {
                Ok(fetched) => {
                    let message = format!("Page {}: {} SIM(s)", page, fetched.value.len());
                    (
                        classify(i32::from(fetched.status), &message, true),
                        fetched.value,
                    )
                }
                Err(e) => (classify(e.code, &e.message, true), Vec::new()),
            };

            self.record(action, NO_TARGET, &classification)?;
            debug!(page, status = classification.http_code, count = fetched.len(), "Page done");

            if !classification.outcome.is_success() {
                report.absorb(&classification);
            }
            if classification.outcome.is_fatal() {
                break;
            }

            let last = fetched.len() < page_size as usize;
            sims.extend(fetched);
            if classification.outcome.is_success() && last {
                break;
            }
        }

        report.payload = Payload::Sims(sims);
        Ok(report)
    }

    pub async fn get_sim(&self, iccid: &str, now: DateTime<Local>) -> CommandResult<CommandReport> {
        let action = Action::GetSim;
        let iccid = self.parse_iccid(action, iccid)?;
        let repo = self.authorize(action, iccid.as_str(), now)?;

        let result = repo.get_one(&iccid).await;
        self.finish_read(action, &iccid, "SIM details retrieved", result, Payload::Sim)
    }

    pub async fn sim_status(&self, iccid: &str, now: DateTime<Local>) -> CommandResult<CommandReport> {
        let action = Action::GetSimStatus;
        let iccid = self.parse_iccid(action, iccid)?;
        let repo = self.authorize(action, iccid.as_str(), now)?;

        let result = repo.status(&iccid).await;
        self.finish_read(action, &iccid, "SIM status retrieved", result, Payload::Json)
    }

    pub async fn sim_quota(&self, iccid: &str, now: DateTime<Local>) -> CommandResult<CommandReport> {
        let action = Action::GetSimQuota;
        let iccid = self.parse_iccid(action, iccid)?;
        let repo = self.authorize(action, iccid.as_str(), now)?;

        let result = repo.quota_data(&iccid).await;
        self.finish_read(action, &iccid, "Data quota retrieved", result, Payload::Json)
    }

    pub async fn sim_connectivity(&self, iccid: &str, now: DateTime<Local>) -> CommandResult<CommandReport> {
        let action = Action::GetSimConnectivity;
        let iccid = self.parse_iccid(action, iccid)?;
        let repo = self.authorize(action, iccid.as_str(), now)?;

        let result = repo.connectivity_info(&iccid).await;
        self.finish_read(action, &iccid, "Connectivity info retrieved", result, Payload::Json)
    }

    pub async fn sim_events(
        &self,
        iccid: &str,
        page: u32,
        now: DateTime<Local>,
    ) -> CommandResult<CommandReport> {
        let action = Action::GetSimEvents;
        let iccid = self.parse_iccid(action, iccid)?;
        if page == 0 {
            return Err(self.fatal(action, iccid.as_str(), InputError::argument("page must be at least 1")));
        }
        let repo = self.authorize(action, iccid.as_str(), now)?;

        let api = &self.settings.api;
        let result = repo
            .events(&iccid, page, api.events_page_size, &api.events_sort)
            .await;
        let message = format!("Events page {} retrieved", page);
        self.finish_read(action, &iccid, &message, result, Payload::Json)
    }

    /// Daily usage over a window resolved from `range` and today's date.
    /// Window adjustments are reported as warnings.
    pub async fn sim_usage(
        &self,
        iccid: &str,
        range: Option<&str>,
        now: DateTime<Local>,
    ) -> CommandResult<CommandReport> {
        let action = Action::GetSimUsage;
        let iccid = self.parse_iccid(action, iccid)?;
        let resolved = self
            .resolver
            .resolve(range, now.date_naive())
            .map_err(|e| self.fatal(action, iccid.as_str(), e))?;
        let repo = self.authorize(action, iccid.as_str(), now)?;

        for adjustment in &resolved.adjustments {
            debug!(iccid = %iccid, %adjustment, "Usage window adjusted");
        }

        let window = resolved.range;
        let result = repo.usage(&iccid, window.start, window.end).await;
        let message = format!("Usage retrieved for {}", window);
        let mut report = self.finish_read(action, &iccid, &message, result, |samples| {
            Payload::Usage {
                range: window,
                samples,
            }
        })?;

        let mut console: Vec<ConsoleLine> = resolved
            .adjustments
            .iter()
            .map(|a| ConsoleLine::Warn(a.to_string()))
            .collect();
        console.append(&mut report.console);
        report.console = console;
        Ok(report)
    }

    /// Ask the API to reset the SIM's network attachment
    pub async fn reset_connectivity(&self, iccid: &str, now: DateTime<Local>) -> CommandResult<CommandReport> {
        let action = Action::ResetSimConnectivity;
        let iccid = self.parse_iccid(action, iccid)?;
        let repo = self.authorize(action, iccid.as_str(), now)?;

        let classification = match repo.reset_connectivity(&iccid).await {
            Ok(ack) => {
                let status = i32::from(ack.status);
                if matches!(ack.status, 200 | 201) {
                    classify(status, "Connectivity reset requested", false)
                } else {
                    classify(status, &ack.message, false)
                }
            }
            Err(e) => classify(e.code, &e.message, false),
        };
        self.record(action, iccid.as_str(), &classification)?;

        let mut report = CommandReport::local(Payload::None);
        report.absorb(&classification);
        Ok(report)
    }

    /// Relabel SIMs; `iccids` and `labels` are comma-separated and paired by position
    pub async fn set_labels(
        &self,
        iccids: &str,
        labels: &str,
        now: DateTime<Local>,
    ) -> CommandResult<CommandReport> {
        let action = Action::SetSimLabel;
        let items = parse_iccid_list(iccids)
            .and_then(|parsed| plan_labels(parsed, split_list(labels)))
            .map_err(|e| self.fatal(action, iccids, e))?;
        self.mutate(action, iccids, items, now).await
    }

    pub async fn set_status(
        &self,
        iccids: &str,
        status: SimStatus,
        now: DateTime<Local>,
    ) -> CommandResult<CommandReport> {
        let action = match status {
            SimStatus::Enabled => Action::EnableSim,
            SimStatus::Disabled => Action::DisableSim,
        };
        let items = parse_iccid_list(iccids)
            .and_then(|parsed| plan_uniform(parsed, MutationIntent::Status(status)))
            .map_err(|e| self.fatal(action, iccids, e))?;
        self.mutate(action, iccids, items, now).await
    }

    pub async fn set_imei_lock(
        &self,
        iccids: &str,
        locked: bool,
        now: DateTime<Local>,
    ) -> CommandResult<CommandReport> {
        let action = if locked {
            Action::LockSimImei
        } else {
            Action::UnlockSimImei
        };
        let items = parse_iccid_list(iccids)
            .and_then(|parsed| plan_uniform(parsed, MutationIntent::ImeiLock(locked)))
            .map_err(|e| self.fatal(action, iccids, e))?;
        self.mutate(action, iccids, items, now).await
    }

    async fn mutate(
        &self,
        action: Action,
        target: &str,
        items: Vec<BatchItem>,
        now: DateTime<Local>,
    ) -> CommandResult<CommandReport> {
        let repo = self.authorize(action, target, now)?;
        let bulk = BulkMutationCoordinator::new(&repo, self.audit.as_ref())
            .run(action.as_str(), items)
            .await?;

        let mut report = CommandReport::local(Payload::None);
        report.absorb(&bulk.classification);
        Ok(report)
    }

    /// Newest audit entries
    pub fn recent_log(&self, limit: usize) -> CommandResult<CommandReport> {
        let entries = self.audit.recent(limit)?;
        Ok(CommandReport::local(Payload::Log(entries)))
    }

    /// Report on the stored session without touching the network
    pub fn session_status(&self, now: DateTime<Local>) -> CommandResult<CommandReport> {
        let state = self.sessions.status(now)?;
        Ok(CommandReport::local(Payload::Session(state)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionState;
    use chrono::{Duration, TimeZone};
    use serde_json::{json, Value};
    use simfleet_client::{sim_path, Method, MockTransport, SIMS_PATH};
    use simfleet_store::{AuditLog, Session, SessionFile};

    const A: &str = "8988228066602306711";

    struct Fixture {
        _dir: tempfile::TempDir,
        mock: Arc<MockTransport>,
        audit: Arc<AuditLog>,
        engine: FleetEngine,
    }

    fn issued() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 2, 14, 9, 0, 0).unwrap()
    }

    fn fixture(with_session: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let vault = Arc::new(SessionFile::new(dir.path().join("token")));
        if with_session {
            vault.save(&Session::new("tok", issued())).unwrap();
        }
        let audit = Arc::new(AuditLog::new(dir.path().join("simfleet.log")));
        let mock = Arc::new(MockTransport::new());
        let engine = FleetEngine::new(Settings::default(), mock.clone(), vault, audit.clone());
        Fixture {
            _dir: dir,
            mock,
            audit,
            engine,
        }
    }

    fn later() -> DateTime<Local> {
        issued() + Duration::minutes(5)
    }

    #[tokio::test]
    async fn test_read_without_session_is_fatal_and_logged() {
        let fx = fixture(false);
        let err = fx.engine.get_sim(A, later()).await.unwrap_err();
        assert!(matches!(err, CommandError::Session(_)));
        assert!(fx.mock.requests().is_empty());

        let entries = fx.audit.recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "get-sim");
        assert_eq!(entries[0].target, A);
        assert_eq!(entries[0].http_code, -1);
    }

    #[tokio::test]
    async fn test_expired_session_blocks_remote_call() {
        let fx = fixture(true);
        let err = fx
            .engine
            .sim_status(A, issued() + Duration::seconds(3601))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Session(crate::SessionError::SessionExpired { .. })));
        assert!(fx.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_successful_read_prints_nothing_but_logs() {
        let fx = fixture(true);
        fx.mock.respond(
            Method::Get,
            &format!("{}/{}/status", SIMS_PATH, A),
            200,
            json!({"status": "ONLINE"}),
        );

        let report = fx.engine.sim_status(A, later()).await.unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert!(report.console.is_empty());
        assert_eq!(report.payload, Payload::Json(json!({"status": "ONLINE"})));
        assert_eq!(fx.audit.recent(1).unwrap()[0].http_code, 200);
    }

    #[tokio::test]
    async fn test_embedded_error_is_soft_failure() {
        let fx = fixture(true);
        fx.mock.respond(
            Method::Get,
            &format!("{}/{}/quota/data", SIMS_PATH, A),
            200,
            json!({"message": "No quota assigned"}),
        );

        let report = fx.engine.sim_quota(A, later()).await.unwrap();
        assert_eq!(report.outcome, Outcome::SoftFailure);
        assert_eq!(report.console, vec![ConsoleLine::Error("No quota assigned".into())]);
        let entry = &fx.audit.recent(1).unwrap()[0];
        assert_eq!(entry.message, "No quota assigned");
        assert_eq!(entry.http_code, -1);
    }

    #[tokio::test]
    async fn test_listing_logs_actual_status_per_page() {
        let fx = fixture(true);
        let full: Vec<Value> = (0..100)
            .map(|i| json!({"iccid": format!("89882280666023{:05}", i), "status": "Enabled"}))
            .collect();
        fx.mock.respond(Method::Get, SIMS_PATH, 200, Value::Array(full));
        fx.mock.respond(Method::Get, SIMS_PATH, 200, json!([{"iccid": A, "status": "Disabled"}]));

        let report = fx.engine.list_sims(3, later()).await.unwrap();
        let Payload::Sims(sims) = &report.payload else {
            panic!("expected SIM list");
        };
        assert_eq!(sims.len(), 101);
        // Second page was short, so there is no third request
        assert_eq!(fx.mock.count(Method::Get, SIMS_PATH), 2);

        let entries = fx.audit.recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.http_code == 200 && e.action == "get-sims"));
    }

    #[tokio::test]
    async fn test_listing_stops_on_hard_failure() {
        let fx = fixture(true);
        fx.mock.respond(Method::Get, SIMS_PATH, 503, Value::Null);

        let report = fx.engine.list_sims(5, later()).await.unwrap();
        assert!(report.is_fatal());
        assert_eq!(
            report.console,
            vec![ConsoleLine::Error("Error: HTTP status code: 503".into())]
        );
        assert_eq!(fx.mock.count(Method::Get, SIMS_PATH), 1);
    }

    #[tokio::test]
    async fn test_page_count_is_bounded() {
        let fx = fixture(true);
        let err = fx.engine.list_sims(11, later()).await.unwrap_err();
        assert!(err.is_input_error());
        assert!(fx.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_usage_reports_clamp_as_warning() {
        let fx = fixture(true);
        fx.mock.respond(
            Method::Get,
            &format!("{}/{}/usage", SIMS_PATH, A),
            200,
            json!({"stats": []}),
        );

        let report = fx
            .engine
            .sim_usage(A, Some("2025-02-01:2025-03-01"), later())
            .await
            .unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.console.len(), 1);
        assert!(matches!(report.console[0], ConsoleLine::Warn(_)));

        let query = &fx.mock.requests()[0].query;
        assert!(query.contains(&("end_dt".to_string(), "2025-02-14".to_string())));
    }

    #[tokio::test]
    async fn test_bad_range_is_input_error_before_any_call() {
        let fx = fixture(true);
        let err = fx
            .engine
            .sim_usage(A, Some("2025-03-01:2025-01-01"), later())
            .await
            .unwrap_err();
        assert!(err.is_input_error());
        assert!(fx.mock.requests().is_empty());
        assert_eq!(fx.audit.recent(1).unwrap()[0].action, "get-sim-usage");
    }

    #[tokio::test]
    async fn test_label_arity_mismatch_logs_before_network() {
        let fx = fixture(true);
        let err = fx
            .engine
            .set_labels("8988228066602306711,8988228066602306729", "only-one", later())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Input(InputError::ArityMismatch { iccids: 2, labels: 1 })
        ));
        assert!(fx.mock.requests().is_empty());
        assert_eq!(fx.audit.recent(10).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_enable_prints_summary() {
        let fx = fixture(true);
        fx.mock.respond(
            Method::Get,
            &sim_path(&Iccid::parse(A).unwrap(), None),
            200,
            json!({"iccid": A, "status": "Disabled", "imei_lock": true, "label": "t"}),
        );
        fx.mock.respond(Method::Post, SIMS_PATH, 201, Value::Null);

        let report = fx.engine.set_status(A, SimStatus::Enabled, later()).await.unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(
            report.console,
            vec![ConsoleLine::Info("Status updated on 1 SIM(s)".into())]
        );
        assert_eq!(fx.audit.recent(1).unwrap()[0].action, "enable-sim");
    }

    #[tokio::test]
    async fn test_rejected_token_request_fails_command() {
        let fx = fixture(false);
        fx.mock.respond(
            Method::Post,
            simfleet_client::TOKEN_PATH,
            401,
            json!({"statusCode": 401, "message": "Unauthorized"}),
        );

        let report = fx
            .engine
            .acquire_token(&Credentials::new("ops", "bad"), issued())
            .await
            .unwrap();
        assert!(report.is_fatal());
        assert_eq!(
            report.console,
            vec![
                ConsoleLine::Error("Error: HTTP status code: 401".into()),
                ConsoleLine::Error("Unauthorized".into()),
            ]
        );
        assert_eq!(fx.engine.session_status(issued()).unwrap().payload, Payload::Session(SessionState::Missing));
    }

    #[tokio::test]
    async fn test_token_with_unexpected_success_status_is_not_stored() {
        let fx = fixture(false);
        fx.mock.respond(
            Method::Post,
            simfleet_client::TOKEN_PATH,
            202,
            json!({"access_token": "t"}),
        );

        let report = fx
            .engine
            .acquire_token(&Credentials::new("ops", "pw"), issued())
            .await
            .unwrap();
        assert!(report.is_fatal());
        assert_eq!(
            fx.engine.session_status(issued()).unwrap().payload,
            Payload::Session(SessionState::Missing)
        );

        let entry = &fx.audit.recent(1).unwrap()[0];
        assert_eq!(entry.http_code, 202);
        assert_eq!(entry.message, "HTTP status code: 202");
    }

    #[tokio::test]
    async fn test_listing_keeps_client_detected_errors_off_console() {
        let fx = fixture(true);
        fx.mock.respond(Method::Get, SIMS_PATH, 200, json!({"message": "Page unavailable"}));
        fx.mock.respond(Method::Get, SIMS_PATH, 200, json!([{"iccid": A, "status": "Enabled"}]));

        let report = fx.engine.list_sims(3, later()).await.unwrap();
        assert_eq!(report.outcome, Outcome::SoftFailure);
        assert!(!report.is_fatal());
        assert!(report.console.is_empty());
        assert_eq!(fx.mock.count(Method::Get, SIMS_PATH), 2);

        let Payload::Sims(sims) = &report.payload else {
            panic!("expected SIM list");
        };
        assert_eq!(sims.len(), 1);

        let entries = fx.audit.recent(10).unwrap();
        let codes: Vec<i32> = entries.iter().map(|e| e.http_code).collect();
        assert_eq!(codes, vec![200, -1]);
        assert_eq!(entries[1].message, "Page unavailable");
    }

    #[tokio::test]
    async fn test_operator_input_cannot_forge_log_lines() {
        let fx = fixture(false);
        let forged = "x\n2020-01-01 00:00:00 | enable-sim | 8988228066602306711 | forged | 201";
        assert!(fx.engine.get_sim(forged, later()).await.is_err());

        let content = std::fs::read_to_string(fx.audit.path()).unwrap();
        assert_eq!(content.lines().count(), 1);

        let entries = fx.audit.recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "get-sim");
        assert_eq!(entries[0].http_code, -1);
        assert!(!entries[0].target.contains(" | "));
    }

    #[tokio::test]
    async fn test_token_then_session_status() {
        let fx = fixture(false);
        fx.mock.respond(
            Method::Post,
            simfleet_client::TOKEN_PATH,
            200,
            json!({"access_token": "fresh"}),
        );

        let report = fx
            .engine
            .acquire_token(&Credentials::new("ops", "pw"), issued())
            .await
            .unwrap();
        assert_eq!(report.outcome, Outcome::Success);

        let status = fx.engine.session_status(issued() + Duration::minutes(15)).unwrap();
        assert!(matches!(
            status.payload,
            Payload::Session(SessionState::Valid { remaining, .. }) if remaining == Duration::minutes(45)
        ));

        let log = fx.engine.recent_log(5).unwrap();
        let Payload::Log(entries) = log.payload else {
            panic!("expected log entries");
        };
        assert_eq!(entries[0].action, "get-token");
        assert_eq!(entries[0].target, "NA");
    }
}
