use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use wifiidcore::prelude::{
    ConnectionStatus, Interface, Observation, ScanError, ScanProvider, ScanResult,
};

/// Configuration for generating synthetic scan batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub networks: usize,
    pub twin_ssid: Option<String>,
    pub twin_bssids: usize,
    pub jitter_db: i32,
    pub connected: bool,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            networks: 8,
            twin_ssid: Some("CoffeeHouse".into()),
            twin_bssids: 4,
            jitter_db: 3,
            connected: true,
            seed: 0,
        }
    }
}

fn mac_from_index(prefix: u8, index: usize) -> String {
    let bytes = (index as u32).to_be_bytes();
    format!(
        "02:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        prefix, bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

struct Station {
    ssid: String,
    bssid: String,
    base_rssi: i32,
}

fn build_stations(config: &SyntheticConfig, rng: &mut StdRng) -> Vec<Station> {
    let mut stations: Vec<Station> = (0..config.networks)
        .map(|index| Station {
            ssid: format!("Network_{:02}", index),
            bssid: mac_from_index(0x10, index),
            base_rssi: rng.gen_range(-88..=-38),
        })
        .collect();

    if let Some(ssid) = config.twin_ssid.as_ref() {
        let count = config.twin_bssids.max(1);
        for index in 0..count {
            // Spread twins evenly from a strong to a weak reading.
            let step = if count > 1 { 45 * index as i32 / (count as i32 - 1) } else { 0 };
            stations.push(Station {
                ssid: ssid.clone(),
                bssid: mac_from_index(0xee, index),
                base_rssi: -40 - step,
            });
        }
    }
    stations
}

/// Offline provider producing a stable set of stations with per-scan jitter.
pub struct SyntheticProvider {
    config: SyntheticConfig,
    stations: Vec<Station>,
    rng: Mutex<StdRng>,
}

impl SyntheticProvider {
    pub fn new(config: SyntheticConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let stations = build_stations(&config, &mut rng);
        Self {
            config,
            stations,
            rng: Mutex::new(rng),
        }
    }
}

impl ScanProvider for SyntheticProvider {
    fn interfaces(&self) -> ScanResult<Vec<Interface>> {
        Ok(vec![Interface::new("synthetic0")])
    }

    fn trigger_scan(&self, _interface: &Interface) -> ScanResult<()> {
        Ok(())
    }

    fn scan_results(&self, _interface: &Interface) -> ScanResult<Vec<Observation>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ScanError::Provider("synthetic generator poisoned".into()))?;
        let jitter = self.config.jitter_db.abs();

        Ok(self
            .stations
            .iter()
            .map(|station| {
                let offset = if jitter > 0 { rng.gen_range(-jitter..=jitter) } else { 0 };
                Observation::new(
                    station.ssid.clone(),
                    &station.bssid,
                    (station.base_rssi + offset).min(0),
                )
            })
            .collect())
    }

    fn connection_status(&self, _interface: &Interface) -> ScanResult<ConnectionStatus> {
        if self.config.connected && !self.stations.is_empty() {
            Ok(ConnectionStatus::Connected)
        } else {
            Ok(ConnectionStatus::Disconnected)
        }
    }

    fn connected_bssid(&self, _interface: &Interface) -> ScanResult<Option<String>> {
        Ok(self
            .config
            .connected
            .then(|| self.stations.first().map(|s| s.bssid.clone()))
            .flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_station_count() {
        let provider = SyntheticProvider::new(SyntheticConfig::default());
        let iface = provider.interfaces().unwrap().remove(0);
        let batch = provider.scan_results(&iface).unwrap();
        assert_eq!(batch.len(), 8 + 4);
        assert_eq!(batch.iter().filter(|o| o.ssid == "CoffeeHouse").count(), 4);
    }

    #[test]
    fn twin_cluster_spans_wide_signal_range() {
        let provider = SyntheticProvider::new(SyntheticConfig {
            networks: 0,
            jitter_db: 0,
            ..Default::default()
        });
        let iface = Interface::new("synthetic0");
        let readings: Vec<i32> = provider
            .scan_results(&iface)
            .unwrap()
            .iter()
            .map(|o| o.rssi)
            .collect();
        assert_eq!(readings, vec![-40, -55, -70, -85]);
    }

    #[test]
    fn same_seed_repeats_station_layout() {
        let a = SyntheticProvider::new(SyntheticConfig {
            seed: 7,
            jitter_db: 0,
            ..Default::default()
        });
        let b = SyntheticProvider::new(SyntheticConfig {
            seed: 7,
            jitter_db: 0,
            ..Default::default()
        });
        let iface = Interface::new("synthetic0");
        assert_eq!(a.scan_results(&iface).unwrap(), b.scan_results(&iface).unwrap());
        assert_eq!(
            a.connected_bssid(&iface).unwrap(),
            Some("02:10:00:00:00:00".to_string())
        );
    }
}
