//! Terminal presentation of command reports

use simfleet_api::{SimRecord, UsageSample};
use simfleet_core::{ConsoleLine, DateRange, Payload, SessionState};
use simfleet_store::LogEntry;
use simfleet_util::{format_date, format_duration, format_timestamp};
use std::fmt::Write;

/// Render a payload as the text printed on stdout
pub fn payload(payload: &Payload) -> Option<String> {
    match payload {
        Payload::None => None,
        Payload::Sims(sims) => Some(sim_table(sims)),
        Payload::Sim(sim) => Some(pretty(&serde_json::to_value(sim).unwrap_or_default())),
        Payload::Json(value) => Some(pretty(value)),
        Payload::Usage { range, samples } => Some(usage_table(range, samples)),
        Payload::Log(entries) => Some(log_lines(entries)),
        Payload::Session(state) => Some(session_text(state)),
    }
}

/// Print console lines: information to stdout, the rest to stderr
pub fn console(lines: &[ConsoleLine]) {
    for line in lines {
        match line {
            ConsoleLine::Info(text) => println!("{}", text),
            ConsoleLine::Warn(text) => eprintln!("Warning: {}", text),
            ConsoleLine::Error(text) => eprintln!("{}", text),
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn sim_table(sims: &[SimRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<22} {:<9} {:<9} {:<15} {}",
        "ICCID", "STATUS", "IMEI_LOCK", "IP_ADDRESS", "LABEL"
    );
    for sim in sims {
        let _ = writeln!(
            out,
            "{:<22} {:<9} {:<9} {:<15} {}",
            sim.iccid.as_str(),
            sim.status.as_str(),
            sim.imei_lock,
            sim.ip_address.as_deref().unwrap_or("-"),
            sim.label_or_empty()
        );
    }
    let _ = write!(out, "{} SIM(s)", sims.len());
    out
}

fn usage_table(range: &DateRange, samples: &[UsageSample]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Usage from {} to {}",
        format_date(range.start),
        format_date(range.end)
    );
    let _ = writeln!(out, "{:<10} {:>12} {:>12} {:>8}", "DATE", "TX_MB", "RX_MB", "SMS");

    let (mut tx, mut rx, mut sms) = (0.0, 0.0, 0.0);
    for sample in samples {
        let _ = writeln!(
            out,
            "{:<10} {:>12.3} {:>12.3} {:>8}",
            format_date(sample.date),
            sample.tx_volume,
            sample.rx_volume,
            sample.sms_volume
        );
        tx += sample.tx_volume;
        rx += sample.rx_volume;
        sms += sample.sms_volume;
    }
    let _ = write!(out, "{:<10} {:>12.3} {:>12.3} {:>8}", "TOTAL", tx, rx, sms);
    out
}

fn log_lines(entries: &[LogEntry]) -> String {
    if entries.is_empty() {
        return "Audit log is empty".to_string();
    }
    entries
        .iter()
        .map(LogEntry::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn session_text(state: &SessionState) -> String {
    match state {
        SessionState::Missing => "No session; run `simfleet token` to sign in".to_string(),
        SessionState::Valid {
            issued_at,
            remaining,
        } => format!(
            "Session issued at {}, valid for another {}",
            format_timestamp(issued_at),
            format_duration(*remaining)
        ),
        SessionState::Expired { issued_at, age } => format!(
            "Session issued at {} expired ({} old); run `simfleet token` to sign in again",
            format_timestamp(issued_at),
            format_duration(*age)
        ),
    }
}
