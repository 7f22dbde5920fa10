use crate::prelude::{AggregatedNetwork, PersistenceError, SuspiciousGroup};
use crate::registry::store::JsonStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `bssid` written for suspicious rows, where no single access point applies.
pub const MULTIPLE_BSSIDS: &str = "Multiple BSSIDs";
/// `signal` written for suspicious rows.
pub const SUSPICIOUS_SIGNAL: &str = "Suspicious";

/// One row of the persisted scan snapshot. Both kinds carry `ssid`, `bssid`
/// and `signal`; suspicious rows add their group statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotEntry {
    Regular {
        ssid: String,
        bssid: String,
        signal: i32,
    },
    Suspicious {
        ssid: String,
        bssid: String,
        signal: String,
        bssid_count: usize,
        rssi_spread: i32,
    },
}

/// Last accepted classification, suspicious rows first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanSnapshot {
    pub entries: Vec<SnapshotEntry>,
}

impl ScanSnapshot {
    pub fn new<'a>(
        suspicious: &[SuspiciousGroup],
        networks: impl IntoIterator<Item = &'a AggregatedNetwork>,
    ) -> Self {
        let mut entries: Vec<SnapshotEntry> = suspicious
            .iter()
            .map(|group| SnapshotEntry::Suspicious {
                ssid: group.ssid.clone(),
                bssid: MULTIPLE_BSSIDS.to_string(),
                signal: SUSPICIOUS_SIGNAL.to_string(),
                bssid_count: group.bssid_count,
                rssi_spread: group.rssi_spread,
            })
            .collect();
        entries.extend(networks.into_iter().map(|network| SnapshotEntry::Regular {
            ssid: network.ssid.clone(),
            bssid: network.bssid.clone(),
            signal: network.rssi,
        }));
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Overwrites `scan_results.json` on every completed cycle.
pub struct SnapshotStore {
    store: JsonStore<ScanSnapshot>,
}

impl SnapshotStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            store: JsonStore::new(path),
        }
    }

    pub fn write(&self, snapshot: &ScanSnapshot) -> Result<(), PersistenceError> {
        self.store.save(snapshot)
    }

    pub fn read(&self) -> Result<ScanSnapshot, PersistenceError> {
        self.store.load()
    }
}
