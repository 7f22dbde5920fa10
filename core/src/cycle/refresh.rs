use crate::cycle::controller::{CycleOutcome, ScanCycleController};
use crate::prelude::ScanResult;
use crate::telemetry::log::LogManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Periodic re-scan task. Stopping it cancels the pending tick; a cycle
/// already in flight runs to completion.
pub struct AutoRefresh {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl AutoRefresh {
    /// Runs a cycle immediately, then again `delay` after each cycle finishes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(controller: Arc<ScanCycleController>, delay: Duration) -> Self {
        Self::start_with(controller, delay, |_| {})
    }

    /// Like [`AutoRefresh::start`], handing every cycle result to `on_outcome`.
    pub fn start_with<F>(controller: Arc<ScanCycleController>, delay: Duration, on_outcome: F) -> Self
    where
        F: Fn(&ScanResult<CycleOutcome>) + Send + 'static,
    {
        let (cancel, mut cancelled) = watch::channel(false);
        let logger = LogManager::new("refresh");

        let task = tokio::spawn(async move {
            logger.record(&format!("auto-refresh every {:?}", delay));
            loop {
                let stop_requested = *cancelled.borrow();
                if stop_requested {
                    break;
                }

                let outcome = controller.run_cycle().await;
                match &outcome {
                    Ok(CycleOutcome::Skipped) => logger.record("tick skipped, scan in flight"),
                    Ok(_) => {}
                    Err(err) => logger.warn(&format!("tick failed: {}", err)),
                }
                on_outcome(&outcome);

                let stop_requested = *cancelled.borrow();
                if stop_requested {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancelled.changed() => break,
                }
            }
            logger.record("auto-refresh stopped");
        });

        Self { cancel, task }
    }

    /// Starts a task only when the controller's config enables auto-refresh.
    pub fn from_config(controller: Arc<ScanCycleController>) -> Option<Self> {
        let config = controller.config();
        config
            .auto_refresh
            .then(|| Self::start(controller, config.refresh_delay()))
    }

    pub fn stop(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the task and waits for it to wind down.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::cycle::fakes::{coffee_batch, FakePrompt, FakeProvider};
    use crate::registry::Registries;
    use std::sync::atomic::Ordering;
    use tempfile::tempdir;

    #[tokio::test]
    async fn repeats_until_stopped() {
        let dir = tempdir().unwrap();
        let provider = FakeProvider::with(coffee_batch());
        let scans = provider.scan_counter();
        let controller = Arc::new(
            ScanCycleController::new(
                ScanConfig::default(),
                Arc::new(provider),
                Arc::new(FakePrompt::decline()),
                Registries::open(dir.path()),
            )
            .unwrap(),
        );

        let refresh = AutoRefresh::start(Arc::clone(&controller), Duration::from_millis(20));
        for _ in 0..200 {
            if scans.load(Ordering::SeqCst) >= 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(scans.load(Ordering::SeqCst) >= 3);
        assert!(refresh.is_running());

        refresh.shutdown().await;
        let after_stop = scans.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(scans.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn stop_cancels_pending_tick() {
        let dir = tempdir().unwrap();
        let provider = FakeProvider::with(coffee_batch());
        let scans = provider.scan_counter();
        let controller = Arc::new(
            ScanCycleController::new(
                ScanConfig::default(),
                Arc::new(provider),
                Arc::new(FakePrompt::decline()),
                Registries::open(dir.path()),
            )
            .unwrap(),
        );

        let refresh = AutoRefresh::start(Arc::clone(&controller), Duration::from_secs(3600));
        for _ in 0..200 {
            if controller.metrics().completed >= 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        refresh.stop();
        tokio::time::timeout(Duration::from_secs(1), refresh.shutdown())
            .await
            .expect("pending tick was not cancelled");
        assert_eq!(scans.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn outcomes_reach_observer() {
        let dir = tempdir().unwrap();
        let controller = Arc::new(
            ScanCycleController::new(
                ScanConfig::default(),
                Arc::new(FakeProvider::with(Vec::new())),
                Arc::new(FakePrompt::decline()),
                Registries::open(dir.path()),
            )
            .unwrap(),
        );
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let refresh = AutoRefresh::start_with(controller, Duration::from_secs(3600), move |outcome| {
            let _ = tx.send(matches!(outcome, Ok(CycleOutcome::Empty)));
        });

        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert_eq!(first, Some(true));
        refresh.shutdown().await;
    }

    #[tokio::test]
    async fn disabled_config_starts_nothing() {
        let dir = tempdir().unwrap();
        let controller = Arc::new(
            ScanCycleController::new(
                ScanConfig::default(),
                Arc::new(FakeProvider::with(Vec::new())),
                Arc::new(FakePrompt::decline()),
                Registries::open(dir.path()),
            )
            .unwrap(),
        );
        assert!(AutoRefresh::from_config(controller).is_none());
    }
}
