//! NetCDF volume probe.
//!
//! Opens a NetCDF classic file from an HTTP(S) URL or a local path, detects
//! its header from the streamed prefix, fetches one variable as a 3D volume
//! and prints a JSON summary of everything a renderer would be handed.

mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use volume_stream::{
    normalize_volume, FetchConfig, HttpTransport, NetCdfSession, RenderConfig, ReqwestTransport,
};

use report::ProbeReport;

#[derive(Parser, Debug)]
#[command(name = "volume-probe")]
#[command(about = "Fetch one NetCDF variable as a volume and describe it")]
struct Args {
    /// HTTP(S) URL or local path of the NetCDF file
    source: String,

    /// Variable to load
    variable: String,

    /// Use range requests even if the server does not advertise them
    #[arg(long, env = "VOLUME_FORCE_RANGE_REQUESTS")]
    force_range: bool,

    /// Rescale values to [0, 1] before reporting
    #[arg(long)]
    normalize: bool,

    /// JSON file with render settings
    #[arg(long)]
    render_config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout carries only the report
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = FetchConfig::from_env();
    let force_range = args.force_range || config.force_range_requests;
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(&config).context("Failed to build HTTP client")?);

    let render = match &args.render_config {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            RenderConfig::from_json(&json).context("Invalid render config")?
        }
        None => RenderConfig::default(),
    };

    info!(source = %args.source, variable = %args.variable, "Probing NetCDF volume");

    let session = if is_url(&args.source) {
        NetCdfSession::open(transport, &args.source).await
    } else {
        NetCdfSession::from_file(transport, &args.source).await
    }
    .with_context(|| format!("Failed to open {}", args.source))?;

    let Some(mut session) = session else {
        bail!("No valid NetCDF header found in {}", args.source);
    };

    let descriptor = session.locate(&args.variable)?;
    let path = session.plan(&descriptor, force_range);
    let mut volume = session
        .fetch_volume(&args.variable, force_range)
        .await
        .with_context(|| format!("Failed to fetch variable {}", args.variable))?;

    if args.normalize {
        normalize_volume(&mut volume);
    }

    let report = ProbeReport::new(&args.source, &session, &descriptor, path, &volume, &render);
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    Ok(())
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
