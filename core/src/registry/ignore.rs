use crate::prelude::{ScanError, ScanResult};
use crate::registry::store::JsonStore;
use crate::telemetry::log::LogManager;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// SSIDs dismissed from anomaly reporting.
pub type IgnoreSet = BTreeSet<String>;

/// Durable, add-only ignore list stored as a JSON array of SSIDs.
pub struct IgnoreListRegistry {
    store: JsonStore<IgnoreSet>,
    ssids: IgnoreSet,
    logger: LogManager,
}

impl IgnoreListRegistry {
    /// Loads the list, starting empty when the file is missing or corrupt.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let store = JsonStore::new(path);
        let ssids = store.load_or_default();
        Self {
            store,
            ssids,
            logger: LogManager::new("ignore"),
        }
    }

    pub fn contains(&self, ssid: &str) -> bool {
        self.ssids.contains(ssid)
    }

    /// Adds `ssid` and persists the list. Returns `false` when it was already present.
    pub fn add(&mut self, ssid: &str) -> ScanResult<bool> {
        if ssid.trim().is_empty() {
            return Err(ScanError::Validation("SSID must not be empty".into()));
        }
        if self.ssids.contains(ssid) {
            return Ok(false);
        }

        let mut updated = self.ssids.clone();
        updated.insert(ssid.to_string());
        self.store.save(&updated)?;
        self.ssids = updated;
        self.logger.record(&format!("ignoring SSID {:?}", ssid));
        Ok(true)
    }

    pub fn ssids(&self) -> &IgnoreSet {
        &self.ssids
    }
}
