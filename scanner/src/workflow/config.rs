use crate::provider::{ProviderKind, SyntheticConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use wifiidcore::config::{parse_input, ScanConfig};
use wifiidcore::prelude::ScanResult;
use wifiidcore::Registries;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub data_dir: PathBuf,
    pub provider: ProviderKind,
    pub interface: Option<String>,
    pub bridge: Option<SocketAddr>,
    pub scan: ScanConfig,
    pub synthetic: SyntheticConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            provider: ProviderKind::default(),
            interface: None,
            bridge: None,
            scan: ScanConfig::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Raw user-entered overrides, validated before any scan is issued.
#[derive(Clone, Debug, Default)]
pub struct ScanOverrides {
    pub min_rssi: Option<String>,
    pub max_bssids: Option<String>,
    pub refresh_delay: Option<String>,
    pub auto_refresh: bool,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .scan
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &ScanOverrides) -> ScanResult<()> {
        let mut scan = self.scan.clone();
        if let Some(raw) = overrides.min_rssi.as_deref() {
            scan.min_rssi = parse_input("minimum RSSI", raw)?;
        }
        if let Some(raw) = overrides.max_bssids.as_deref() {
            scan.max_bssids_per_ssid = parse_input("max BSSIDs per SSID", raw)?;
        }
        if let Some(raw) = overrides.refresh_delay.as_deref() {
            scan.refresh_delay_secs = parse_input("refresh delay", raw)?;
        }
        scan.auto_refresh |= overrides.auto_refresh;
        scan.validate()?;
        self.scan = scan;
        Ok(())
    }

    pub fn open_registries(&self) -> Registries {
        Registries::open(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wifiidcore::ScanError;

    #[test]
    fn defaults_match_documented_options() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.scan.min_rssi, -70);
        assert_eq!(cfg.scan.max_bssids_per_ssid, 3);
        assert!(!cfg.scan.auto_refresh);
        assert_eq!(cfg.scan.refresh_delay_secs, 10);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"data_dir: /var/lib/wifiid\nprovider: synthetic\nscan:\n  min_rssi: -60\n  max_bssids_per_ssid: 5\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.provider, ProviderKind::Synthetic);
        assert_eq!(cfg.scan.min_rssi, -60);
        assert_eq!(cfg.scan.max_bssids_per_ssid, 5);
        assert_eq!(cfg.scan.anomaly_margin_db, 10);
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/wifiid"));
    }

    #[test]
    fn config_load_rejects_non_integer_threshold() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"scan:\n  min_rssi: strong\n").unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }

    #[test]
    fn overrides_are_validated_and_atomic() {
        let mut cfg = WorkflowConfig::default();
        let bad = ScanOverrides {
            min_rssi: Some("-55".into()),
            max_bssids: Some("three".into()),
            ..Default::default()
        };
        assert!(matches!(cfg.apply_overrides(&bad), Err(ScanError::Validation(_))));
        assert_eq!(cfg.scan.min_rssi, -70);

        let good = ScanOverrides {
            min_rssi: Some("-55".into()),
            refresh_delay: Some("3".into()),
            auto_refresh: true,
            ..Default::default()
        };
        cfg.apply_overrides(&good).unwrap();
        assert_eq!(cfg.scan.min_rssi, -55);
        assert_eq!(cfg.scan.refresh_delay_secs, 3);
        assert!(cfg.scan.auto_refresh);
    }
}
