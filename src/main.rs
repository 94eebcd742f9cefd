mod app;
mod layout;
mod traffic;
mod util;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, ensure};
use clap::Parser;

use crate::layout::NodeLayout;
use crate::traffic::{DEFAULT_POLL_INTERVAL, HttpSnapshotSource, SourceConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Snapshot endpoint polled for the graph state
    #[arg(long, default_value = "http://127.0.0.1:5000/api/graph_data")]
    endpoint: String,

    /// JSON file mapping node ids to fixed [x, y] positions
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Milliseconds between snapshot requests
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    poll_interval_ms: u64,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    request_timeout_ms: u64,

    /// Ignore HTTP(S)_PROXY settings from the environment
    #[arg(long)]
    no_proxy: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    ensure!(args.poll_interval_ms > 0, "--poll-interval-ms must be positive");

    let layout = match &args.layout {
        Some(path) => NodeLayout::load(path)?,
        None => NodeLayout::road_network(),
    };
    let source = HttpSnapshotSource::new(&SourceConfig {
        endpoint: args.endpoint.clone(),
        timeout: Duration::from_millis(args.request_timeout_ms),
        use_system_proxy: !args.no_proxy,
    })?;
    let interval = Duration::from_millis(args.poll_interval_ms);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "congestion-map",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::TrafficMapApp::new(
                cc,
                Arc::new(source),
                interval,
                layout,
            )))
        }),
    )
    .map_err(|error| anyhow!("congestion map window failed: {error}"))
}
