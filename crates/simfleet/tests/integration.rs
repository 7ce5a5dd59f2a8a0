//! Integration tests for simfleet
//!
//! The engine tests run whole commands against a scripted transport with
//! the real session file and audit log in a temporary directory. The CLI
//! tests run the built binary for paths that never reach the network.

use chrono::{DateTime, Duration, Local, TimeZone};
use serde_json::{json, Value};
use simfleet_api::SimStatus;
use simfleet_client::{sim_path, Credentials, Method, MockTransport, SIMS_PATH, TOKEN_PATH};
use simfleet_config::Settings;
use simfleet_core::{CommandError, ConsoleLine, FleetEngine, Outcome, Payload, SessionError};
use simfleet_store::{AuditLog, AuditSink, SessionFile};
use simfleet_util::Iccid;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

const A: &str = "8988228066602306711";
const B: &str = "8988228066602306729";

struct Harness {
    dir: tempfile::TempDir,
    mock: Arc<MockTransport>,
    audit: Arc<AuditLog>,
    engine: FleetEngine,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::default();
    let paths = settings.paths.clone().with_data_dir(dir.path());

    let mock = Arc::new(MockTransport::new());
    let vault = Arc::new(SessionFile::new(paths.session_file()));
    let audit = Arc::new(AuditLog::new(paths.audit_log()));
    let engine = FleetEngine::new(settings, mock.clone(), vault, audit.clone());

    Harness {
        dir,
        mock,
        audit,
        engine,
    }
}

fn signed_in_at() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 2, 14, 8, 0, 0).unwrap()
}

async fn sign_in(h: &Harness) {
    h.mock.respond(Method::Post, TOKEN_PATH, 200, json!({"access_token": "tok-1"}));
    let report = h
        .engine
        .acquire_token(&Credentials::new("ops", "pw"), signed_in_at())
        .await
        .unwrap();
    assert_eq!(report.outcome, Outcome::Success);
}

fn script_sim(h: &Harness, iccid: &str, status: &str, imei_lock: bool, label: &str) {
    h.mock.respond(
        Method::Get,
        &sim_path(&Iccid::parse(iccid).unwrap(), None),
        200,
        json!({
            "iccid": iccid,
            "imsi": "901405100000001",
            "status": status,
            "imei_lock": imei_lock,
            "label": label,
        }),
    );
}

#[tokio::test]
async fn test_token_is_used_for_later_calls() {
    let h = harness();
    sign_in(&h).await;
    assert!(h.dir.path().join("token").exists());

    script_sim(&h, A, "Enabled", false, "pump-7");
    let report = h
        .engine
        .get_sim(A, signed_in_at() + Duration::minutes(30))
        .await
        .unwrap();

    let Payload::Sim(sim) = report.payload else {
        panic!("expected a SIM record");
    };
    assert_eq!(sim.label.as_deref(), Some("pump-7"));

    let last = h.mock.requests().last().cloned().unwrap();
    assert_eq!(last.auth, simfleet_client::Auth::Bearer("tok-1".into()));
}

#[tokio::test]
async fn test_session_boundary_is_one_hour() {
    let h = harness();
    sign_in(&h).await;
    script_sim(&h, A, "Enabled", false, "x");

    let at = |secs| signed_in_at() + Duration::seconds(secs);
    assert!(h.engine.get_sim(A, at(3599)).await.is_ok());
    assert!(h.engine.get_sim(A, at(3600)).await.is_ok());

    let before = h.mock.requests().len();
    let err = h.engine.get_sim(A, at(3601)).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Session(SessionError::SessionExpired { .. })
    ));
    assert_eq!(h.mock.requests().len(), before);

    let newest = &h.audit.recent(1).unwrap()[0];
    assert_eq!(newest.action, "get-sim");
    assert_eq!(newest.http_code, -1);
}

#[tokio::test]
async fn test_relabel_two_sims_in_one_request() {
    let h = harness();
    sign_in(&h).await;
    script_sim(&h, A, "Enabled", true, "old-a");
    script_sim(&h, B, "Disabled", false, "old-b");
    h.mock.respond(Method::Post, SIMS_PATH, 201, Value::Null);

    let report = h
        .engine
        .set_labels(&format!("{},{}", A, B), "x,y", signed_in_at() + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(h.mock.count(Method::Post, SIMS_PATH), 1);

    let body = h.mock.requests().last().unwrap().body.clone().unwrap();
    assert_eq!(body[0]["label"], "x");
    assert_eq!(body[0]["status"], "Enabled");
    assert_eq!(body[0]["imei_lock"], true);
    assert_eq!(body[1]["label"], "y");
    assert_eq!(body[1]["status"], "Disabled");
    assert_eq!(body[1]["imei_lock"], false);

    let entries = h.audit.recent(10).unwrap();
    let relabels: Vec<_> = entries.iter().filter(|e| e.action == "set-sim-label").collect();
    assert_eq!(relabels.len(), 2);
    assert!(relabels
        .iter()
        .any(|e| e.target == A && e.message == "Label changed from 'old-a' to 'x'"));
}

#[tokio::test]
async fn test_disable_with_one_unreadable_sim_still_submits() {
    let h = harness();
    sign_in(&h).await;
    script_sim(&h, A, "Enabled", true, "a");
    h.mock.respond(
        Method::Get,
        &sim_path(&Iccid::parse(B).unwrap(), None),
        500,
        Value::Null,
    );
    h.mock.respond(Method::Post, SIMS_PATH, 201, Value::Null);

    let report = h
        .engine
        .set_status(&format!("{},{}", A, B), SimStatus::Disabled, signed_in_at())
        .await
        .unwrap();
    assert_eq!(report.outcome, Outcome::Success);

    let body = h.mock.requests().last().unwrap().body.clone().unwrap();
    assert_eq!(
        body,
        json!([
            {"iccid": A, "label": "a", "imei_lock": true, "status": "Disabled"},
            {"iccid": B, "status": "Disabled"}
        ])
    );

    let entries = h.audit.recent(10).unwrap();
    assert!(entries
        .iter()
        .any(|e| e.target == B && e.message.contains("'UNKNOWN'")));
}

#[tokio::test]
async fn test_failed_bulk_update_is_fatal() {
    let h = harness();
    sign_in(&h).await;
    script_sim(&h, A, "Enabled", false, "a");
    h.mock.respond(
        Method::Post,
        SIMS_PATH,
        400,
        json!({"statusCode": 400, "message": "Invalid payload"}),
    );

    let report = h
        .engine
        .set_imei_lock(A, true, signed_in_at())
        .await
        .unwrap();
    assert!(report.is_fatal());
    assert_eq!(
        report.console,
        vec![ConsoleLine::Error("Error: HTTP status code: 400".into())]
    );

    let newest = &h.audit.recent(1).unwrap()[0];
    assert_eq!(newest.action, "lock-sim-imei");
    assert_eq!(newest.http_code, 400);
}

#[tokio::test]
async fn test_default_usage_window_is_two_weeks() {
    let h = harness();
    sign_in(&h).await;
    h.mock.respond(
        Method::Get,
        &format!("{}/{}/usage", SIMS_PATH, A),
        200,
        json!({"stats": [{"date": "2025-02-14", "data": {"volume_tx": "0.25", "volume_rx": "1.5"}, "sms": {"volume": "2"}}]}),
    );

    let report = h.engine.sim_usage(A, None, signed_in_at()).await.unwrap();
    assert!(report.console.is_empty());

    let Payload::Usage { range, samples } = report.payload else {
        panic!("expected usage");
    };
    assert_eq!(range.to_string(), "2025-01-31:2025-02-14");
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].rx_volume, 1.5);
}

#[tokio::test]
async fn test_log_lists_newest_first() {
    let h = harness();
    sign_in(&h).await;
    h.mock.respond(
        Method::Post,
        &format!("{}/{}/reset", SIMS_PATH, A),
        201,
        Value::Null,
    );
    h.engine
        .reset_connectivity(A, signed_in_at())
        .await
        .unwrap();

    let report = h.engine.recent_log(10).unwrap();
    let Payload::Log(entries) = report.payload else {
        panic!("expected log entries");
    };
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["reset-sim-connectivity", "get-token"]);
}

fn simfleet(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_simfleet"));
    cmd.env_remove("SIMFLEET_CONFIG")
        .env_remove("SIMFLEET_USERNAME")
        .env_remove("SIMFLEET_PASSWORD")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env("SIMFLEET_DATA_DIR", dir.join("data"));
    cmd
}

#[test]
fn test_cli_session_without_token() {
    let dir = tempfile::tempdir().unwrap();
    let output = simfleet(dir.path()).arg("session").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No session"));
}

#[test]
fn test_cli_label_arity_mismatch_exits_with_usage_status() {
    let dir = tempfile::tempdir().unwrap();
    let output = simfleet(dir.path())
        .args(["label", &format!("{},{}", A, B), "only-one"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));

    let log = AuditLog::new(dir.path().join("data").join("simfleet.log"));
    let entries = log.recent(10).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.action == "set-sim-label" && e.http_code == -1));
}

#[test]
fn test_cli_read_without_session_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = simfleet(dir.path()).args(["status", A]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simfleet token"));
}

#[test]
fn test_cli_missing_explicit_config_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = simfleet(dir.path())
        .args(["--config", dir.path().join("absent.toml").to_str().unwrap(), "session"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}
