pub mod controller;
pub mod refresh;

#[cfg(test)]
pub(crate) mod fakes;

pub use controller::{
    ClassifiedNetwork, CycleOutcome, CycleState, FirstSeen, ScanCycleController, ScanReport,
};
pub use refresh::AutoRefresh;
