use crate::prelude::{
    ConnectionStatus, Interface, KnownNetworkPrompt, Observation, ScanProvider, ScanResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn coffee_batch() -> Vec<Observation> {
    vec![
        Observation::new("CoffeeHouse", "aa:aa:aa:aa:aa:aa", -45),
        Observation::new("CoffeeHouse", "bb:bb:bb:bb:bb:bb", -80),
        Observation::new("CoffeeHouse", "cc:cc:cc:cc:cc:cc", -50),
        Observation::new("CoffeeHouse", "dd:dd:dd:dd:dd:dd", -55),
    ]
}

/// Scripted provider for cycle tests.
pub struct FakeProvider {
    interfaces: Vec<Interface>,
    observations: Vec<Observation>,
    status: ConnectionStatus,
    connected: Option<String>,
    delay: Option<Duration>,
    gate: Mutex<Option<mpsc::Receiver<()>>>,
    scans: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn with(observations: Vec<Observation>) -> Self {
        Self {
            interfaces: vec![Interface::new("wlan0")],
            observations,
            status: ConnectionStatus::Disconnected,
            connected: None,
            delay: None,
            gate: Mutex::new(None),
            scans: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn without_interfaces() -> Self {
        Self {
            interfaces: Vec::new(),
            ..Self::with(Vec::new())
        }
    }

    pub fn connected_to(mut self, bssid: &str) -> Self {
        self.status = ConnectionStatus::Connected;
        self.connected = Some(bssid.to_string());
        self
    }

    pub fn connected_unnamed(mut self) -> Self {
        self.status = ConnectionStatus::Connected;
        self.connected = None;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Blocks `scan_results` until the returned sender fires.
    pub fn gated(self) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        *self.gate.lock().unwrap() = Some(rx);
        (self, tx)
    }

    pub fn scan_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.scans)
    }
}

impl ScanProvider for FakeProvider {
    fn interfaces(&self) -> ScanResult<Vec<Interface>> {
        Ok(self.interfaces.clone())
    }

    fn trigger_scan(&self, _interface: &Interface) -> ScanResult<()> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn scan_results(&self, _interface: &Interface) -> ScanResult<Vec<Observation>> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some(gate) = self.gate.lock().unwrap().take() {
            let _ = gate.recv();
        }
        Ok(self.observations.clone())
    }

    fn connection_status(&self, _interface: &Interface) -> ScanResult<ConnectionStatus> {
        Ok(self.status)
    }

    fn connected_bssid(&self, _interface: &Interface) -> ScanResult<Option<String>> {
        Ok(self.connected.clone())
    }
}

pub struct FakePrompt {
    color: Option<String>,
}

impl FakePrompt {
    pub fn accept(color: &str) -> Self {
        Self {
            color: Some(color.to_string()),
        }
    }

    pub fn decline() -> Self {
        Self { color: None }
    }
}

impl KnownNetworkPrompt for FakePrompt {
    fn confirm(&self, _ssid: &str, _bssid: &str) -> Option<String> {
        self.color.clone()
    }
}
