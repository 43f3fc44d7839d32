//! `config-projector` entry point: load settings, project manifests, write
//! ConfigMaps.

use chrono::Utc;
use clap::Parser;
use tracing::{debug, info};

use projector_cli::cli::Cli;
use projector_cli::{Result, Settings, logging};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    run().map_err(color_eyre::eyre::Report::from)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let now = Utc::now().timestamp();
    let settings = Settings::load(&cli, now)?;
    logging::init(settings.debug)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting config-projector");
    debug!(
        config_repo = %settings.config_repo,
        manifests = %settings.manifests,
        output = %settings.output,
        "resolved settings"
    );
    let written = projector_cli::run(&settings, now)?;
    info!(count = written.len(), "projection complete");
    Ok(())
}
