//! Usage samples

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily traffic for one SIM. Data volumes are in MB, SMS volume is a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSample {
    pub date: NaiveDate,
    pub tx_volume: f64,
    pub rx_volume: f64,
    pub sms_volume: f64,
}

/// `GET /v1/sims/{iccid}/usage` payload
#[derive(Debug, Deserialize)]
struct UsageReport {
    #[serde(default)]
    stats: Vec<RawUsageDay>,
}

#[derive(Debug, Deserialize)]
struct RawUsageDay {
    date: NaiveDate,
    #[serde(default)]
    data: RawVolumes,
    #[serde(default)]
    sms: RawVolumes,
}

#[derive(Debug, Default, Deserialize)]
struct RawVolumes {
    #[serde(default)]
    volume: Volume,
    #[serde(default)]
    volume_tx: Volume,
    #[serde(default)]
    volume_rx: Volume,
}

/// The API sends volumes as decimal strings; accept plain numbers too.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum Volume {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl Volume {
    fn value(&self) -> Result<f64, String> {
        match self {
            Volume::Number(n) => Ok(*n),
            Volume::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("volume '{}' is not a number", s)),
            Volume::Missing => Ok(0.0),
        }
    }
}

impl UsageSample {
    /// Decode the per-day stats of a usage payload, oldest first as sent
    pub fn from_report(payload: &serde_json::Value) -> Result<Vec<UsageSample>, String> {
        let report: UsageReport =
            serde_json::from_value(payload.clone()).map_err(|e| e.to_string())?;

        report
            .stats
            .into_iter()
            .map(|day| {
                Ok(UsageSample {
                    date: day.date,
                    tx_volume: day.data.volume_tx.value()?,
                    rx_volume: day.data.volume_rx.value()?,
                    sms_volume: day.sms.volume.value()?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_string_volumes() {
        let payload = json!({
            "stats": [
                {
                    "date": "2025-02-13",
                    "data": {"volume": "1.5", "volume_tx": "0.5", "volume_rx": "1.0"},
                    "sms": {"volume": "3", "volume_tx": "2", "volume_rx": "1"}
                },
                {
                    "date": "2025-02-14",
                    "data": {"volume": 0, "volume_tx": 0, "volume_rx": 0},
                    "sms": {}
                }
            ]
        });

        let samples = UsageSample::from_report(&payload).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].date, NaiveDate::from_ymd_opt(2025, 2, 13).unwrap());
        assert_eq!(samples[0].tx_volume, 0.5);
        assert_eq!(samples[0].rx_volume, 1.0);
        assert_eq!(samples[0].sms_volume, 3.0);
        assert_eq!(samples[1].sms_volume, 0.0);
    }

    #[test]
    fn test_missing_stats_is_empty() {
        assert!(UsageSample::from_report(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_non_numeric_volume_is_an_error() {
        let payload = json!({
            "stats": [{"date": "2025-02-13", "data": {"volume_tx": "lots"}}]
        });
        assert!(UsageSample::from_report(&payload).is_err());
    }
}
