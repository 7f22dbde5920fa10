use crate::config::SignalThresholds;
use serde::{Deserialize, Serialize};

/// Signal-strength bucket, weakest first so that `Ord` follows quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SignalStrength {
    pub fn label(&self) -> &'static str {
        match self {
            SignalStrength::Excellent => "excellent",
            SignalStrength::Good => "good",
            SignalStrength::Fair => "fair",
            SignalStrength::Poor => "poor",
        }
    }

    /// Row background used by displays for this bucket.
    pub fn display_color(&self) -> &'static str {
        match self {
            SignalStrength::Excellent => "lightblue",
            SignalStrength::Good => "green",
            SignalStrength::Fair => "yellow",
            SignalStrength::Poor => "red",
        }
    }
}

/// Maps an RSSI reading onto a [`SignalStrength`] bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorClassifier {
    thresholds: SignalThresholds,
}

impl ColorClassifier {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, rssi: i32) -> SignalStrength {
        if rssi >= self.thresholds.excellent {
            SignalStrength::Excellent
        } else if rssi >= self.thresholds.good {
            SignalStrength::Good
        } else if rssi >= self.thresholds.fair {
            SignalStrength::Fair
        } else {
            SignalStrength::Poor
        }
    }
}
