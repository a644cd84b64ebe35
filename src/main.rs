//! CLI entry point for the MÁV live map.
//!
//! `serve` runs the refresh pipeline and the HTTP front end; `fetch-once`
//! runs a single refresh cycle and prints the snapshot, which is handy for
//! poking at the upstream without standing up the server.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mav_live_map::config::{
    BoundingBox, DEFAULT_BASE_URL, DEFAULT_MODES, RefreshConfig, UpstreamConfig,
};
use mav_live_map::driver::PeriodicDriver;
use mav_live_map::infra::otp::OtpClient;
use mav_live_map::refresh::run_cycle;
use mav_live_map::server::{self, AppState};
use mav_live_map::snapshot::SnapshotStore;
use std::ffi::OsStr;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "mav_live_map")]
#[command(about = "Live train position tracker for the MAV network", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UpstreamArgs {
    /// OTP router base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    endpoint: String,

    /// Vehicles enriched concurrently within one batch
    #[arg(short, long, default_value_t = 10)]
    concurrency: usize,

    /// Per-trip detail fetch timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    trip_timeout_ms: u64,

    /// Bounding box south-west corner
    #[arg(long, default_value_t = 45.5)]
    sw_lat: f64,
    #[arg(long, default_value_t = 16.1)]
    sw_lon: f64,

    /// Bounding box north-east corner
    #[arg(long, default_value_t = 48.7)]
    ne_lat: f64,
    #[arg(long, default_value_t = 22.8)]
    ne_lon: f64,

    /// Transport modes included in the position query
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_MODES.map(String::from))]
    modes: Vec<String>,
}

impl UpstreamArgs {
    fn to_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.endpoint.clone(),
            bounding_box: BoundingBox {
                sw_lat: self.sw_lat,
                sw_lon: self.sw_lon,
                ne_lat: self.ne_lat,
                ne_lon: self.ne_lon,
            },
            modes: self.modes.clone(),
            trip_timeout: Duration::from_millis(self.trip_timeout_ms),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the refresh pipeline and the HTTP API
    Serve {
        #[command(flatten)]
        upstream: UpstreamArgs,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8001)]
        port: u16,

        /// Directory holding the static front end
        #[arg(long, default_value = "static")]
        static_dir: PathBuf,

        /// Milliseconds between refresh cycles
        #[arg(short, long, default_value_t = 45_000)]
        interval_ms: u64,

        /// Optional file to mirror each published snapshot into
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
    /// Run a single refresh cycle and print the snapshot as JSON
    FetchOnce {
        #[command(flatten)]
        upstream: UpstreamArgs,

        /// Write the snapshot here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/mav_live_map.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("mav_live_map.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            upstream,
            port,
            static_dir,
            interval_ms,
            data_file,
        } => {
            let otp = Arc::new(OtpClient::new(&upstream.to_config()));
            let refresh_config = RefreshConfig {
                interval: Duration::from_millis(interval_ms),
                concurrency: upstream.concurrency,
                data_file,
            };
            let store = SnapshotStore::new();

            info!(
                interval_ms,
                concurrency = refresh_config.concurrency,
                "Starting refresh pipeline"
            );
            let driver =
                PeriodicDriver::new(otp.clone(), refresh_config, store.clone());
            let driver_handle = driver.start();

            let state = AppState { store, otp };
            let result = server::serve(state, &static_dir, port).await;

            driver_handle.abort();
            result?;
        }
        Commands::FetchOnce { upstream, output } => {
            let otp = Arc::new(OtpClient::new(&upstream.to_config()));
            let refresh_config = RefreshConfig {
                concurrency: upstream.concurrency,
                ..Default::default()
            };
            let store = SnapshotStore::new();

            let stats = run_cycle(&otp, &refresh_config, &store).await?;
            info!(
                fetched = stats.fetched,
                published = stats.published,
                duration_ms = stats.duration_ms,
                "Cycle complete"
            );

            let snapshot = store
                .current()
                .await
                .expect("cycle succeeded but published nothing");
            let json = serde_json::to_string(snapshot.as_ref())?;
            match output {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}
