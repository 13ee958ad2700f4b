//! BRDF Visualiser
//!
//! Opens the 3D lobe viewport and the BRDF property panel side by side.
//! Use `--config <path>` to load a viewer configuration.

use app::{cli::CommonArgs, run_app, RunnerConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use viewer::{BrdfViewer, ViewerConfig};

/// Interactive BRDF lobe visualiser
#[derive(Parser)]
#[command(name = "brdf-viewer")]
#[command(about = "Visualise BRDF lobes and render them with Sunflow")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(frames) = args.common.debug {
        tracing::info!("Debug mode: running {} frames", frames);
    }

    let config_path = args.common.config.clone().or_else(|| {
        let default_config = PathBuf::from("crates/apps/viewer/config.toml");
        default_config.exists().then_some(default_config)
    });
    let config = ViewerConfig::load_or_default(config_path.as_deref());

    let app = BrdfViewer::new(config)?;

    let runner_config = RunnerConfig::default()
        .with_viewport("BRDF Visualiser", 1000, 700)
        .with_panel("BRDF Properties", 400, 700);

    run_app(app, args.common.apply_to(runner_config))
}
