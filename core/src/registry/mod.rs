pub mod ignore;
pub mod known;
pub mod snapshot;
pub mod store;

pub use ignore::{IgnoreListRegistry, IgnoreSet};
pub use known::{KnownNetworkEntry, KnownNetworkRegistry};
pub use snapshot::{ScanSnapshot, SnapshotEntry, SnapshotStore, MULTIPLE_BSSIDS, SUSPICIOUS_SIGNAL};
pub use store::JsonStore;

use std::path::Path;
use std::sync::{Arc, Mutex};

pub const IGNORED_FILE: &str = "ignored_ssids.json";
pub const KNOWN_FILE: &str = "known_networks.json";
pub const SNAPSHOT_FILE: &str = "scan_results.json";

/// Persisted state shared between the scan cycle and user actions.
#[derive(Clone)]
pub struct Registries {
    pub known: Arc<Mutex<KnownNetworkRegistry>>,
    pub ignored: Arc<Mutex<IgnoreListRegistry>>,
    pub snapshots: Arc<SnapshotStore>,
}

impl Registries {
    /// Opens the three stores under `data_dir` using their default file names.
    pub fn open(data_dir: &Path) -> Self {
        Self::from_paths(
            data_dir.join(KNOWN_FILE),
            data_dir.join(IGNORED_FILE),
            data_dir.join(SNAPSHOT_FILE),
        )
    }

    pub fn from_paths<K, I, S>(known: K, ignored: I, snapshots: S) -> Self
    where
        K: Into<std::path::PathBuf>,
        I: Into<std::path::PathBuf>,
        S: Into<std::path::PathBuf>,
    {
        Self {
            known: Arc::new(Mutex::new(KnownNetworkRegistry::open(known))),
            ignored: Arc::new(Mutex::new(IgnoreListRegistry::open(ignored))),
            snapshots: Arc::new(SnapshotStore::new(snapshots)),
        }
    }
}
