//! Scan classification and evil-twin detection core for the WiFi Identifier.
//!
//! Raw access-point observations flow through aggregation, anomaly detection
//! and known-network tagging inside a single-flight scan cycle. Registries
//! persist user decisions as JSON documents.

pub mod classify;
pub mod config;
pub mod cycle;
pub mod math;
pub mod prelude;
pub mod registry;
pub mod telemetry;

pub use config::ScanConfig;
pub use cycle::{AutoRefresh, CycleOutcome, ScanCycleController, ScanReport};
pub use prelude::{KnownNetworkPrompt, Observation, ScanError, ScanProvider, ScanResult};
pub use registry::Registries;
