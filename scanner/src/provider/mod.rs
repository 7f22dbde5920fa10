pub mod nmcli;
pub mod synthetic;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wifiidcore::prelude::ScanProvider;

pub use nmcli::NmcliProvider;
pub use synthetic::{SyntheticConfig, SyntheticProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Nmcli,
    Synthetic,
}

pub fn build_provider(
    kind: ProviderKind,
    interface: Option<String>,
    synthetic: &SyntheticConfig,
) -> Arc<dyn ScanProvider> {
    match kind {
        ProviderKind::Nmcli => Arc::new(NmcliProvider::new(interface)),
        ProviderKind::Synthetic => Arc::new(SyntheticProvider::new(synthetic.clone())),
    }
}
