use serde::{Deserialize, Serialize};

/// Lowercases a BSSID so it can be used as a registry key or compared.
pub fn normalize_bssid(bssid: &str) -> String {
    bssid.trim().to_ascii_lowercase()
}

/// One access-point advertisement returned by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub ssid: String,
    pub bssid: String,
    pub rssi: i32,
}

impl Observation {
    pub fn new(ssid: impl Into<String>, bssid: &str, rssi: i32) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: normalize_bssid(bssid),
            rssi,
        }
    }

    /// Re-applies BSSID normalization to an observation built outside [`Observation::new`].
    pub fn normalized(&self) -> Self {
        Self::new(self.ssid.clone(), &self.bssid, self.rssi)
    }
}

/// Strongest observation for one SSID within a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedNetwork {
    pub ssid: String,
    pub bssid: String,
    pub rssi: i32,
}

/// Every observation sharing one SSID, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BssidGroup {
    pub ssid: String,
    pub observations: Vec<Observation>,
}

/// SSID advertised by too many BSSIDs with inconsistent signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousGroup {
    pub ssid: String,
    pub bssid_count: usize,
    pub rssi_spread: i32,
}

/// Scan-capable radio interface reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Failure while reading or writing a persisted registry.
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error on {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Common error type for scan cycles and registry mutations.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("invalid configuration: {0}")]
    Validation(String),
    #[error("scan provider failure: {0}")]
    Provider(String),
    #[error("scan did not complete within {0} seconds")]
    Timeout(u64),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Radio scanning facility consumed by the scan cycle.
///
/// Calls may block; the controller runs them on the blocking pool.
pub trait ScanProvider: Send + Sync + 'static {
    fn interfaces(&self) -> ScanResult<Vec<Interface>>;

    /// Starts a scan on `interface`. Completion is observed through `scan_results`.
    fn trigger_scan(&self, interface: &Interface) -> ScanResult<()>;

    /// Returns observations once the scan triggered on `interface` has finished.
    fn scan_results(&self, interface: &Interface) -> ScanResult<Vec<Observation>>;

    fn connection_status(&self, interface: &Interface) -> ScanResult<ConnectionStatus>;

    /// BSSID of the associated access point, when the provider can name it.
    fn connected_bssid(&self, _interface: &Interface) -> ScanResult<Option<String>> {
        Ok(None)
    }
}

/// External decision maker asked whether a newly connected access point
/// should be remembered. Returns the chosen color, or `None` when declined.
pub trait KnownNetworkPrompt: Send + Sync + 'static {
    fn confirm(&self, ssid: &str, bssid: &str) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_lowercases_bssid() {
        let obs = Observation::new("Home", " AA:BB:CC:DD:EE:FF ", -40);
        assert_eq!(obs.bssid, "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn normalized_fixes_directly_built_observation() {
        let raw = Observation {
            ssid: "Home".into(),
            bssid: "AA:BB:CC:DD:EE:FF".into(),
            rssi: -40,
        };
        assert_eq!(raw.normalized().bssid, "aa:bb:cc:dd:ee:ff");
    }
}
