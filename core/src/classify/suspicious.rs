use crate::classify::aggregator::Aggregation;
use crate::config::ScanConfig;
use crate::math::stats::StatsHelper;
use crate::prelude::{BssidGroup, SuspiciousGroup};
use crate::registry::ignore::IgnoreSet;
use crate::telemetry::log::LogManager;
use std::collections::HashSet;

/// Flags SSIDs advertised by too many BSSIDs with a wide RSSI spread.
pub struct SuspiciousDetector {
    max_bssids_per_ssid: usize,
    anomaly_margin_db: i32,
    logger: LogManager,
}

impl SuspiciousDetector {
    pub fn new(max_bssids_per_ssid: usize, anomaly_margin_db: i32) -> Self {
        Self {
            max_bssids_per_ssid,
            anomaly_margin_db,
            logger: LogManager::new("detector"),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.max_bssids_per_ssid, config.anomaly_margin_db)
    }

    /// Evaluates a single group, ignoring the ignore list.
    pub fn evaluate(&self, group: &BssidGroup) -> Option<SuspiciousGroup> {
        let bssid_count = group
            .observations
            .iter()
            .map(|obs| obs.bssid.as_str())
            .collect::<HashSet<_>>()
            .len();
        if bssid_count <= self.max_bssids_per_ssid {
            return None;
        }

        let readings: Vec<i32> = group.observations.iter().map(|obs| obs.rssi).collect();
        let rssi_spread = StatsHelper::spread(&readings);
        if rssi_spread <= self.anomaly_margin_db {
            return None;
        }

        Some(SuspiciousGroup {
            ssid: group.ssid.clone(),
            bssid_count,
            rssi_spread,
        })
    }

    pub fn detect(&self, aggregation: &Aggregation, ignored: &IgnoreSet) -> Vec<SuspiciousGroup> {
        let suspicious: Vec<SuspiciousGroup> = aggregation
            .groups()
            .iter()
            .filter(|group| !ignored.contains(&group.ssid))
            .filter_map(|group| self.evaluate(group))
            .collect();

        for group in &suspicious {
            self.logger.warn(&format!(
                "SSID {:?} advertised by {} BSSIDs with {} dB spread",
                group.ssid, group.bssid_count, group.rssi_spread
            ));
        }
        suspicious
    }
}
