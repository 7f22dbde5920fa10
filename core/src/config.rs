use crate::prelude::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MIN_RSSI: i32 = -70;
pub const DEFAULT_MAX_BSSIDS_PER_SSID: usize = 3;
pub const DEFAULT_ANOMALY_MARGIN_DB: i32 = 10;
pub const DEFAULT_REFRESH_DELAY_SECS: u64 = 10;
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 10;

/// Lower RSSI edges of the signal-strength buckets, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    pub excellent: i32,
    pub good: i32,
    pub fair: i32,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            excellent: -50,
            good: -60,
            fair: -70,
        }
    }
}

/// Policy knobs for a scan cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub min_rssi: i32,
    pub max_bssids_per_ssid: usize,
    pub anomaly_margin_db: i32,
    pub auto_refresh: bool,
    pub refresh_delay_secs: u64,
    pub scan_timeout_secs: u64,
    pub thresholds: SignalThresholds,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_rssi: DEFAULT_MIN_RSSI,
            max_bssids_per_ssid: DEFAULT_MAX_BSSIDS_PER_SSID,
            anomaly_margin_db: DEFAULT_ANOMALY_MARGIN_DB,
            auto_refresh: false,
            refresh_delay_secs: DEFAULT_REFRESH_DELAY_SECS,
            scan_timeout_secs: DEFAULT_SCAN_TIMEOUT_SECS,
            thresholds: SignalThresholds::default(),
        }
    }
}

/// Parses one user-entered integer option, naming it in the validation error.
pub fn parse_input<T: std::str::FromStr>(name: &str, raw: &str) -> ScanResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ScanError::Validation(format!("{} must be an integer, got {:?}", name, raw)))
}

impl ScanConfig {
    /// Builds a config from text entered by the user, keeping the other knobs at their defaults.
    pub fn from_inputs(
        min_rssi: &str,
        max_bssids: &str,
        refresh_delay: &str,
        auto_refresh: bool,
    ) -> ScanResult<Self> {
        let config = Self {
            min_rssi: parse_input("minimum RSSI", min_rssi)?,
            max_bssids_per_ssid: parse_input("max BSSIDs per SSID", max_bssids)?,
            refresh_delay_secs: parse_input("refresh delay", refresh_delay)?,
            auto_refresh,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if !(-120..=0).contains(&self.min_rssi) {
            return Err(ScanError::Validation(format!(
                "minimum RSSI {} outside -120..=0 dBm",
                self.min_rssi
            )));
        }
        if self.max_bssids_per_ssid == 0 {
            return Err(ScanError::Validation(
                "max BSSIDs per SSID must be at least 1".into(),
            ));
        }
        if self.anomaly_margin_db < 0 {
            return Err(ScanError::Validation(format!(
                "anomaly margin {} must not be negative",
                self.anomaly_margin_db
            )));
        }
        if self.refresh_delay_secs == 0 {
            return Err(ScanError::Validation(
                "refresh delay must be at least 1 second".into(),
            ));
        }
        if self.scan_timeout_secs == 0 {
            return Err(ScanError::Validation(
                "scan timeout must be at least 1 second".into(),
            ));
        }
        let t = &self.thresholds;
        if !(t.excellent > t.good && t.good > t.fair) {
            return Err(ScanError::Validation(format!(
                "signal thresholds must descend strictly, got {}/{}/{}",
                t.excellent, t.good, t.fair
            )));
        }
        Ok(())
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_secs(self.refresh_delay_secs)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}
