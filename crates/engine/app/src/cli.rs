//! Command line arguments shared by applications built on the runner
//!
//! Flatten [`CommonArgs`] into an application's own parser:
//!
//! ```ignore
//! #[derive(clap::Parser)]
//! struct Args {
//!     #[command(flatten)]
//!     common: app::cli::CommonArgs,
//! }
//! ```

use crate::RunnerConfig;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Run N frames, save the last viewport frame, then exit
    #[arg(long, value_name = "FRAMES")]
    pub debug: Option<u64>,

    /// Load configuration from a TOML file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl CommonArgs {
    pub fn apply_to(&self, config: RunnerConfig) -> RunnerConfig {
        config.with_debug_frames(self.debug)
    }
}
