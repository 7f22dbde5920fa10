pub mod aggregator;
pub mod color;
pub mod suspicious;

pub use aggregator::{Aggregation, Aggregator};
pub use color::{ColorClassifier, SignalStrength};
pub use suspicious::SuspiciousDetector;
