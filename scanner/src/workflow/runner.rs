use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use std::fmt::Write as _;
use std::sync::Arc;
use wifiidcore::cycle::{CycleOutcome, FirstSeen, ScanReport};
use wifiidcore::prelude::{KnownNetworkPrompt, ScanProvider, ScanResult};
use wifiidcore::registry::MULTIPLE_BSSIDS;
use wifiidcore::ScanCycleController;

#[derive(Clone)]
pub struct Runner {
    controller: Arc<ScanCycleController>,
}

impl Runner {
    pub fn new(
        config: &WorkflowConfig,
        provider: Arc<dyn ScanProvider>,
        prompt: Arc<dyn KnownNetworkPrompt>,
    ) -> anyhow::Result<Self> {
        let controller =
            ScanCycleController::new(config.scan.clone(), provider, prompt, config.open_registries())
                .context("building scan controller")?;
        Ok(Self {
            controller: Arc::new(controller),
        })
    }

    pub fn controller(&self) -> Arc<ScanCycleController> {
        Arc::clone(&self.controller)
    }

    pub async fn execute(&self) -> ScanResult<CycleOutcome> {
        self.controller.run_cycle().await
    }
}

fn truncate(ssid: &str, width: usize) -> String {
    if ssid.chars().count() > width {
        let head: String = ssid.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        ssid.to_string()
    }
}

/// Renders a cycle outcome as a terminal table.
pub fn render_outcome(outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::Completed(report) => render_report(report),
        CycleOutcome::Empty => "No Wi-Fi networks found.\n".to_string(),
        CycleOutcome::Skipped => "Scan already in progress, request ignored.\n".to_string(),
    }
}

pub fn render_report(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{:<30} {:<18} {:>8}  {:<10} {:<10}",
        "SSID", "BSSID", "Signal", "Strength", "Known"
    );
    let _ = writeln!(out, "{}", "─".repeat(82));

    for group in &report.suspicious {
        let _ = writeln!(
            out,
            "{:<30} {:<18} {:>8}  {}",
            truncate(&group.ssid, 30),
            MULTIPLE_BSSIDS,
            "SUSPECT",
            format!("{} BSSIDs, {} dB spread", group.bssid_count, group.rssi_spread)
        );
    }

    for network in &report.networks {
        let known = network
            .known
            .as_ref()
            .map(|entry| entry.color.clone())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<30} {:<18} {:>4} dBm  {:<10} {:<10}",
            truncate(&network.ssid, 30),
            network.bssid,
            network.rssi,
            network.strength.label(),
            known
        );
    }

    let _ = writeln!(
        out,
        "\n{} observations, {} networks shown, {} suspicious",
        report.observed,
        report.networks.len(),
        report.suspicious.len()
    );
    match &report.first_seen {
        Some(FirstSeen::Registered(entry)) => {
            let _ = writeln!(out, "Saved color {} for '{}'.", entry.color, entry.ssid);
        }
        Some(FirstSeen::AlreadyKnown(entry)) => {
            let _ = writeln!(out, "Connected to known network '{}'.", entry.ssid);
        }
        Some(FirstSeen::Declined) | None => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::FixedColorPrompt;
    use crate::provider::{ProviderKind, SyntheticConfig, SyntheticProvider};
    use tempfile::tempdir;

    fn synthetic_config(dir: &std::path::Path) -> WorkflowConfig {
        WorkflowConfig {
            data_dir: dir.to_path_buf(),
            provider: ProviderKind::Synthetic,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn runner_executes_workflow() {
        let dir = tempdir().unwrap();
        let cfg = synthetic_config(dir.path());
        let runner = Runner::new(
            &cfg,
            Arc::new(SyntheticProvider::new(cfg.synthetic.clone())),
            Arc::new(FixedColorPrompt::new("#a5d6a7")),
        )
        .unwrap();

        let outcome = runner.execute().await.unwrap();
        let report = match &outcome {
            CycleOutcome::Completed(report) => report.clone(),
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(report.suspicious.len(), 1);
        assert_eq!(report.suspicious[0].ssid, "CoffeeHouse");
        assert!(matches!(report.first_seen, Some(FirstSeen::Registered(_))));
        assert!(dir.path().join("scan_results.json").exists());
        assert!(dir.path().join("known_networks.json").exists());

        let table = render_outcome(&outcome);
        assert!(table.contains("Multiple BSSIDs"));
        assert!(table.contains("Saved color #a5d6a7"));
    }

    #[tokio::test]
    async fn empty_scan_renders_notice() {
        let dir = tempdir().unwrap();
        let cfg = synthetic_config(dir.path());
        let provider = SyntheticProvider::new(SyntheticConfig {
            networks: 0,
            twin_ssid: None,
            ..Default::default()
        });
        let runner =
            Runner::new(&cfg, Arc::new(provider), Arc::new(FixedColorPrompt::new("#fff"))).unwrap();

        let outcome = runner.execute().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Empty);
        assert_eq!(render_outcome(&outcome), "No Wi-Fi networks found.\n");
    }

    #[test]
    fn long_ssids_are_truncated() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate(&"x".repeat(40), 10), "xxxxxxx...");
    }
}
