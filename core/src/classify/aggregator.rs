use crate::math::stats::StatsHelper;
use crate::prelude::{AggregatedNetwork, BssidGroup, Observation};
use crate::telemetry::log::LogManager;
use std::collections::HashMap;

/// Per-SSID view of one scan, in first-seen SSID order.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    networks: Vec<AggregatedNetwork>,
    groups: Vec<BssidGroup>,
    index: HashMap<String, usize>,
}

impl Aggregation {
    pub fn networks(&self) -> &[AggregatedNetwork] {
        &self.networks
    }

    pub fn groups(&self) -> &[BssidGroup] {
        &self.groups
    }

    pub fn network(&self, ssid: &str) -> Option<&AggregatedNetwork> {
        self.index.get(ssid).map(|&idx| &self.networks[idx])
    }

    pub fn group(&self, ssid: &str) -> Option<&BssidGroup> {
        self.index.get(ssid).map(|&idx| &self.groups[idx])
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// Groups raw observations by SSID and keeps the strongest one per SSID.
pub struct Aggregator {
    logger: LogManager,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("aggregator"),
        }
    }

    pub fn aggregate(&self, observations: &[Observation]) -> Aggregation {
        let mut aggregation = Aggregation::default();

        for observation in observations {
            if observation.ssid.trim().is_empty() {
                continue;
            }
            let observation = &observation.normalized();

            match aggregation.index.get(&observation.ssid) {
                Some(&idx) => {
                    aggregation.groups[idx].observations.push(observation.clone());
                    let best = &mut aggregation.networks[idx];
                    // Strictly greater keeps the first-seen observation on ties.
                    if observation.rssi > best.rssi {
                        best.bssid = observation.bssid.clone();
                        best.rssi = observation.rssi;
                    }
                }
                None => {
                    aggregation
                        .index
                        .insert(observation.ssid.clone(), aggregation.networks.len());
                    aggregation.networks.push(AggregatedNetwork {
                        ssid: observation.ssid.clone(),
                        bssid: observation.bssid.clone(),
                        rssi: observation.rssi,
                    });
                    aggregation.groups.push(BssidGroup {
                        ssid: observation.ssid.clone(),
                        observations: vec![observation.clone()],
                    });
                }
            }
        }

        let strongest: Vec<i32> = aggregation.networks.iter().map(|n| n.rssi).collect();
        self.logger.record(&format!(
            "{} observations -> {} SSIDs, mean best RSSI {:.1}",
            observations.len(),
            aggregation.len(),
            StatsHelper::mean(&strongest)
        ));

        aggregation
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
