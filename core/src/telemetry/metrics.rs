use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Counters accumulated across scan cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub completed: usize,
    pub empty: usize,
    pub skipped: usize,
    pub failed: usize,
    pub suspicious: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_completed(&self, suspicious: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.completed += 1;
            metrics.suspicious += suspicious;
        }
    }

    pub fn record_empty(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.empty += 1;
        }
    }

    pub fn record_skipped(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.skipped += 1;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_accumulates_counts() {
        let recorder = MetricsRecorder::new();
        recorder.record_completed(2);
        recorder.record_completed(1);
        recorder.record_empty();
        recorder.record_skipped();
        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.completed, 2);
        assert_eq!(snapshot.suspicious, 3);
        assert_eq!(snapshot.empty, 1);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.failed, 0);
    }
}
