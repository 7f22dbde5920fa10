use crate::classify::{Aggregator, ColorClassifier, SignalStrength, SuspiciousDetector};
use crate::config::ScanConfig;
use crate::prelude::{
    normalize_bssid, ConnectionStatus, KnownNetworkPrompt, Observation, ScanError, ScanProvider,
    ScanResult, SuspiciousGroup,
};
use crate::registry::{KnownNetworkEntry, Registries, ScanSnapshot};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Phase of the scan pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleState {
    Idle,
    Scanning,
    Classifying,
    Done,
    Error,
}

/// Representative network annotated for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedNetwork {
    pub ssid: String,
    pub bssid: String,
    pub rssi: i32,
    pub strength: SignalStrength,
    pub known: Option<KnownNetworkEntry>,
}

/// What happened to the connected access point during the first-seen check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirstSeen {
    AlreadyKnown(KnownNetworkEntry),
    Registered(KnownNetworkEntry),
    Declined,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub observed: usize,
    pub networks: Vec<ClassifiedNetwork>,
    pub suspicious: Vec<SuspiciousGroup>,
    pub connected_bssid: Option<String>,
    pub first_seen: Option<FirstSeen>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(ScanReport),
    /// The provider returned no observations; the persisted snapshot was cleared.
    Empty,
    /// Another cycle was already in flight.
    Skipped,
}

struct RawScan {
    observations: Vec<Observation>,
    connected_bssid: Option<String>,
}

/// Marks the provider as busy until the blocking scan call returns, even after a timeout.
struct ProviderClaim(Arc<AtomicBool>);

impl Drop for ProviderClaim {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives one scan pass at a time through aggregation, detection and tagging.
pub struct ScanCycleController {
    config: Mutex<ScanConfig>,
    provider: Arc<dyn ScanProvider>,
    prompt: Arc<dyn KnownNetworkPrompt>,
    registries: Registries,
    state: Mutex<CycleState>,
    provider_busy: Arc<AtomicBool>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl ScanCycleController {
    pub fn new(
        config: ScanConfig,
        provider: Arc<dyn ScanProvider>,
        prompt: Arc<dyn KnownNetworkPrompt>,
        registries: Registries,
    ) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Mutex::new(config),
            provider,
            prompt,
            registries,
            state: Mutex::new(CycleState::Idle),
            provider_busy: Arc::new(AtomicBool::new(false)),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("cycle"),
        })
    }

    pub fn config(&self) -> ScanConfig {
        lock(&self.config).clone()
    }

    /// Replaces the policy used by subsequent cycles.
    pub fn set_config(&self, config: ScanConfig) -> ScanResult<()> {
        config.validate()?;
        *lock(&self.config) = config;
        Ok(())
    }

    pub fn state(&self) -> CycleState {
        *lock(&self.state)
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Dismisses `ssid` from anomaly reporting. Returns `false` if it was already ignored.
    pub fn ignore_ssid(&self, ssid: &str) -> ScanResult<bool> {
        lock(&self.registries.ignored).add(ssid)
    }

    pub fn register_known(&self, bssid: &str, ssid: &str, color: &str) -> ScanResult<KnownNetworkEntry> {
        lock(&self.registries.known).register(bssid, ssid, color)
    }

    /// Runs one full cycle, or returns [`CycleOutcome::Skipped`] if one is already running.
    pub async fn run_cycle(&self) -> ScanResult<CycleOutcome> {
        let config = self.config();
        config.validate()?;

        if !self.begin() {
            self.metrics.record_skipped();
            self.logger.record("scan already in flight, request ignored");
            return Ok(CycleOutcome::Skipped);
        }

        let result = self.execute(&config).await;
        match &result {
            Ok(_) => self.finish(CycleState::Done),
            Err(err) => {
                self.metrics.record_failed();
                self.logger.error(&format!("cycle aborted: {}", err));
                self.finish(CycleState::Error);
            }
        }
        result
    }

    fn begin(&self) -> bool {
        let mut state = lock(&self.state);
        if self.provider_busy.load(Ordering::SeqCst) {
            self.logger.warn("provider still busy with a timed-out scan");
            return false;
        }
        match *state {
            CycleState::Scanning | CycleState::Classifying => false,
            _ => {
                *state = CycleState::Scanning;
                true
            }
        }
    }

    fn transition(&self, next: CycleState) {
        let mut state = lock(&self.state);
        self.logger.record(&format!("{:?} -> {:?}", *state, next));
        *state = next;
    }

    fn finish(&self, terminal: CycleState) {
        self.transition(terminal);
        self.transition(CycleState::Idle);
    }

    async fn execute(&self, config: &ScanConfig) -> ScanResult<CycleOutcome> {
        let raw = self.collect(config).await?;
        self.transition(CycleState::Classifying);

        if raw.observations.is_empty() {
            self.logger.record("scan returned no observations");
            self.registries.snapshots.write(&ScanSnapshot::default())?;
            self.metrics.record_empty();
            return Ok(CycleOutcome::Empty);
        }

        let aggregation = Aggregator::new().aggregate(&raw.observations);
        let ignored = lock(&self.registries.ignored).ssids().clone();
        let suspicious = SuspiciousDetector::from_config(config).detect(&aggregation, &ignored);

        let first_seen = match raw.connected_bssid.as_deref() {
            Some(bssid) => self.check_first_seen(bssid, &raw.observations).await?,
            None => None,
        };

        let classifier = ColorClassifier::new(config.thresholds);
        let accepted: Vec<_> = aggregation
            .networks()
            .iter()
            .filter(|network| network.rssi >= config.min_rssi)
            .collect();
        let networks: Vec<ClassifiedNetwork> = {
            let known = lock(&self.registries.known);
            accepted
                .iter()
                .map(|network| ClassifiedNetwork {
                    ssid: network.ssid.clone(),
                    bssid: network.bssid.clone(),
                    rssi: network.rssi,
                    strength: classifier.classify(network.rssi),
                    known: known.lookup(&network.bssid),
                })
                .collect()
        };

        let snapshot = ScanSnapshot::new(&suspicious, accepted.iter().copied());
        self.registries.snapshots.write(&snapshot)?;

        self.metrics.record_completed(suspicious.len());
        self.logger.record(&format!(
            "{} observations, {} networks shown, {} suspicious",
            raw.observations.len(),
            networks.len(),
            suspicious.len()
        ));

        Ok(CycleOutcome::Completed(ScanReport {
            observed: raw.observations.len(),
            networks,
            suspicious,
            connected_bssid: raw.connected_bssid,
            first_seen,
        }))
    }

    /// Issues the scan on the blocking pool and waits for results, bounded by the scan timeout.
    async fn collect(&self, config: &ScanConfig) -> ScanResult<RawScan> {
        let provider = Arc::clone(&self.provider);
        self.provider_busy.store(true, Ordering::SeqCst);
        let claim = ProviderClaim(Arc::clone(&self.provider_busy));
        let task = tokio::task::spawn_blocking(move || -> ScanResult<RawScan> {
            let _claim = claim;
            let interface = provider
                .interfaces()?
                .into_iter()
                .next()
                .ok_or_else(|| ScanError::Provider("no wireless interface available".into()))?;

            provider.trigger_scan(&interface)?;
            let observations: Vec<Observation> = provider
                .scan_results(&interface)?
                .iter()
                .map(Observation::normalized)
                .collect();

            let connected_bssid = match provider.connection_status(&interface)? {
                ConnectionStatus::Connected => provider
                    .connected_bssid(&interface)?
                    .or_else(|| {
                        observations
                            .iter()
                            .find(|obs| !obs.ssid.is_empty())
                            .map(|obs| obs.bssid.clone())
                    })
                    .map(|bssid| normalize_bssid(&bssid)),
                ConnectionStatus::Disconnected => None,
            };

            Ok(RawScan {
                observations,
                connected_bssid,
            })
        });

        match tokio::time::timeout(config.scan_timeout(), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(ScanError::Provider(format!("scan task failed: {}", join_err))),
            Err(_) => Err(ScanError::Timeout(config.scan_timeout_secs)),
        }
    }

    async fn check_first_seen(
        &self,
        bssid: &str,
        observations: &[Observation],
    ) -> ScanResult<Option<FirstSeen>> {
        let existing = lock(&self.registries.known).lookup(bssid);
        if let Some(entry) = existing {
            return Ok(Some(FirstSeen::AlreadyKnown(entry)));
        }

        let Some(ssid) = observations
            .iter()
            .find(|obs| obs.bssid == bssid)
            .map(|obs| obs.ssid.clone())
        else {
            self.logger.warn(&format!(
                "connected BSSID {} not present in scan results",
                bssid
            ));
            return Ok(None);
        };

        let prompt = Arc::clone(&self.prompt);
        let (prompt_ssid, prompt_bssid) = (ssid.clone(), bssid.to_string());
        let choice = tokio::task::spawn_blocking(move || prompt.confirm(&prompt_ssid, &prompt_bssid))
            .await
            .map_err(|err| ScanError::Provider(format!("prompt task failed: {}", err)))?;

        match choice {
            Some(color) => {
                let entry = lock(&self.registries.known).register(bssid, &ssid, &color)?;
                Ok(Some(FirstSeen::Registered(entry)))
            }
            None => {
                self.logger
                    .record(&format!("user declined to remember {} ({:?})", bssid, ssid));
                Ok(Some(FirstSeen::Declined))
            }
        }
    }
}
