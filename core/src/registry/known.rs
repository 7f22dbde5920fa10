use crate::prelude::{normalize_bssid, ScanError, ScanResult};
use crate::registry::store::JsonStore;
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Value stored under each BSSID key in `known_networks.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownNetworkRecord {
    pub ssid: String,
    pub color: String,
}

pub type KnownNetworkMap = BTreeMap<String, KnownNetworkRecord>;

/// Access point the user confirmed and tagged with a color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownNetworkEntry {
    pub bssid: String,
    pub ssid: String,
    pub color: String,
}

/// Durable BSSID -> color registry with write-through persistence.
pub struct KnownNetworkRegistry {
    store: JsonStore<KnownNetworkMap>,
    entries: KnownNetworkMap,
    logger: LogManager,
}

impl KnownNetworkRegistry {
    /// Loads the registry, starting empty when the file is missing or unreadable.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let store: JsonStore<KnownNetworkMap> = JsonStore::new(path);
        let entries = store
            .load_or_default()
            .into_iter()
            .map(|(bssid, record)| (normalize_bssid(&bssid), record))
            .collect();
        Self {
            store,
            entries,
            logger: LogManager::new("known"),
        }
    }

    pub fn lookup(&self, bssid: &str) -> Option<KnownNetworkEntry> {
        let key = normalize_bssid(bssid);
        self.entries.get(&key).map(|record| KnownNetworkEntry {
            bssid: key,
            ssid: record.ssid.clone(),
            color: record.color.clone(),
        })
    }

    pub fn is_known(&self, bssid: &str) -> bool {
        self.entries.contains_key(&normalize_bssid(bssid))
    }

    /// Upserts an entry and persists it before returning.
    ///
    /// The in-memory registry is left unchanged when the write fails.
    pub fn register(&mut self, bssid: &str, ssid: &str, color: &str) -> ScanResult<KnownNetworkEntry> {
        let key = normalize_bssid(bssid);
        if key.is_empty() {
            return Err(ScanError::Validation("BSSID must not be empty".into()));
        }
        let color = color.trim();
        if color.is_empty() {
            return Err(ScanError::Validation("color must not be empty".into()));
        }

        let entry = KnownNetworkEntry {
            bssid: key.clone(),
            ssid: ssid.to_string(),
            color: color.to_string(),
        };
        let record = KnownNetworkRecord {
            ssid: entry.ssid.clone(),
            color: entry.color.clone(),
        };
        if self.entries.get(&key) == Some(&record) {
            return Ok(entry);
        }

        let mut updated = self.entries.clone();
        updated.insert(key, record);
        self.store.save(&updated)?;
        self.entries = updated;

        self.logger.record(&format!(
            "registered {} ({:?}) as {}",
            entry.bssid, entry.ssid, entry.color
        ));
        Ok(entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = KnownNetworkEntry> + '_ {
        self.entries.iter().map(|(bssid, record)| KnownNetworkEntry {
            bssid: bssid.clone(),
            ssid: record.ssid.clone(),
            color: record.color.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
