use serde::{Deserialize, Serialize};
use wifiidcore::cycle::{ClassifiedNetwork, CycleOutcome};
use wifiidcore::prelude::{ScanResult, SuspiciousGroup};
use wifiidcore::registry::KnownNetworkEntry;

/// What an external display renders: the last accepted scan plus a status line.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DisplayModel {
    pub observed: usize,
    pub networks: Vec<ClassifiedNetwork>,
    pub suspicious: Vec<SuspiciousGroup>,
    pub status: String,
}

impl DisplayModel {
    /// Folds a cycle result into the model. Failed and skipped cycles keep the previous rows.
    pub fn apply(&mut self, outcome: &ScanResult<CycleOutcome>) {
        match outcome {
            Ok(CycleOutcome::Completed(report)) => {
                self.observed = report.observed;
                self.networks = report.networks.clone();
                self.suspicious = report.suspicious.clone();
                self.status = format!(
                    "{} networks, {} suspicious",
                    report.networks.len(),
                    report.suspicious.len()
                );
            }
            Ok(CycleOutcome::Empty) => {
                *self = DisplayModel {
                    status: "No Wi-Fi networks found".into(),
                    ..Default::default()
                };
            }
            Ok(CycleOutcome::Skipped) => {}
            Err(err) => self.status = format!("scan failed: {}", err),
        }
    }

    /// Drops a dismissed SSID from the suspicious rows.
    pub fn dismiss(&mut self, ssid: &str) {
        self.suspicious.retain(|group| group.ssid != ssid);
    }

    /// Tags rows whose representative BSSID was just registered.
    pub fn tag(&mut self, entry: &KnownNetworkEntry) {
        for network in self.networks.iter_mut().filter(|n| n.bssid == entry.bssid) {
            network.known = Some(entry.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wifiidcore::classify::SignalStrength;
    use wifiidcore::cycle::ScanReport;
    use wifiidcore::ScanError;

    fn report() -> ScanReport {
        ScanReport {
            observed: 4,
            networks: vec![ClassifiedNetwork {
                ssid: "CoffeeHouse".into(),
                bssid: "aa:aa:aa:aa:aa:aa".into(),
                rssi: -45,
                strength: SignalStrength::Excellent,
                known: None,
            }],
            suspicious: vec![SuspiciousGroup {
                ssid: "CoffeeHouse".into(),
                bssid_count: 4,
                rssi_spread: 35,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn failures_keep_previous_rows_and_empty_clears() {
        let mut model = DisplayModel::default();
        model.apply(&Ok(CycleOutcome::Completed(report())));
        assert_eq!(model.networks.len(), 1);

        model.apply(&Err(ScanError::Provider("no interface".into())));
        assert_eq!(model.networks.len(), 1);
        assert!(model.status.starts_with("scan failed"));

        model.apply(&Ok(CycleOutcome::Empty));
        assert!(model.networks.is_empty());
        assert!(model.suspicious.is_empty());
    }

    #[test]
    fn dismiss_and_tag_update_rows() {
        let mut model = DisplayModel::default();
        model.apply(&Ok(CycleOutcome::Completed(report())));
        model.dismiss("CoffeeHouse");
        assert!(model.suspicious.is_empty());

        model.tag(&KnownNetworkEntry {
            bssid: "aa:aa:aa:aa:aa:aa".into(),
            ssid: "CoffeeHouse".into(),
            color: "#ff0000".into(),
        });
        assert_eq!(model.networks[0].known.as_ref().unwrap().color, "#ff0000");
    }
}
