use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::GuiBridge;
use prompt::{DeclinePrompt, FixedColorPrompt, StdinPrompt};
use provider::{build_provider, ProviderKind};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use wifiidcore::prelude::KnownNetworkPrompt;
use wifiidcore::AutoRefresh;
use workflow::config::{ScanOverrides, WorkflowConfig};
use workflow::runner::{render_outcome, Runner};

mod gui_bridge;
mod prompt;
mod provider;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Scan nearby Wi-Fi networks and flag evil-twin anomalies")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Directory holding ignored_ssids.json, known_networks.json and scan_results.json
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,
    /// Scan only this wireless device
    #[arg(long)]
    interface: Option<String>,
    /// Minimum signal (dBm) for a network to be listed
    #[arg(long, allow_hyphen_values = true)]
    min_rssi: Option<String>,
    /// BSSIDs per SSID tolerated before anomaly checks apply
    #[arg(long)]
    max_bssids: Option<String>,
    /// Seconds between automatic scans
    #[arg(long)]
    refresh_delay: Option<String>,
    /// Keep scanning until Ctrl+C
    #[arg(long, default_value_t = false)]
    auto_refresh: bool,
    /// Ask on the terminal before remembering a newly connected access point
    #[arg(long, default_value_t = false)]
    interactive: bool,
    /// Remember newly connected access points with this color without asking
    #[arg(long, conflicts_with = "interactive")]
    assign_color: Option<String>,
    /// Add SSIDs to the ignore list before scanning
    #[arg(long)]
    ignore: Vec<String>,
    /// Expose results and user actions over HTTP at this address
    #[arg(long)]
    serve: Option<SocketAddr>,
}

fn build_prompt(args: &Args) -> anyhow::Result<Arc<dyn KnownNetworkPrompt>> {
    if let Some(color) = args.assign_color.as_ref() {
        if !prompt::is_hex_color(color) {
            anyhow::bail!("--assign-color expects a hex color such as #33aa55, got {:?}", color);
        }
        return Ok(Arc::new(FixedColorPrompt::new(color.clone())));
    }
    if args.interactive {
        return Ok(Arc::new(StdinPrompt));
    }
    Ok(Arc::new(DeclinePrompt))
}

async fn run(args: Args, config: WorkflowConfig) -> anyhow::Result<()> {
    let provider = build_provider(config.provider, config.interface.clone(), &config.synthetic);
    let runner = Runner::new(&config, provider, build_prompt(&args)?)?;
    let controller = runner.controller();

    for ssid in &args.ignore {
        controller
            .ignore_ssid(ssid)
            .with_context(|| format!("adding {:?} to the ignore list", ssid))?;
    }

    let bridge = Arc::new(GuiBridge::new(runner.controller()));
    if let Some(addr) = config.bridge {
        bridge.serve(addr)?;
    }

    if config.scan.auto_refresh {
        let observer = Arc::clone(&bridge);
        let refresh = AutoRefresh::start_with(controller, config.scan.refresh_delay(), move |outcome| {
            observer.publish(outcome);
            if let Ok(outcome) = outcome {
                print!("{}", render_outcome(outcome));
            }
        });
        signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
        refresh.shutdown().await;
        log::info!("stopped with status: {}", bridge.snapshot().status);
        return Ok(());
    }

    let outcome = runner.execute().await;
    bridge.publish(&outcome);
    print!("{}", render_outcome(&outcome.context("running scan cycle")?));

    if config.bridge.is_some() {
        log::info!("display bridge running (Ctrl+C to stop)...");
        signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = args.workflow.as_ref() {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(kind) = args.provider {
        config.provider = kind;
    }
    if args.interface.is_some() {
        config.interface = args.interface.clone();
    }
    if args.serve.is_some() {
        config.bridge = args.serve;
    }
    config
        .apply_overrides(&ScanOverrides {
            min_rssi: args.min_rssi.clone(),
            max_bssids: args.max_bssids.clone(),
            refresh_delay: args.refresh_delay.clone(),
            auto_refresh: args.auto_refresh,
        })
        .context("validating scan options")?;

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating scan runtime")?;
    runtime.block_on(run(args, config))
}
