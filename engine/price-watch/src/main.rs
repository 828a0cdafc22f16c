//! Price Watch entry point
//!
//! Loads the layered configuration, sets up logging and runs the watcher on a
//! single-threaded runtime until the price target is met, the page markup
//! breaks, or the operator interrupts.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use price_watch::{
    initialize_logging, shutdown_signal, Cli, DesktopNotifier, HttpPageSource, PriceWatcher,
    TerminationReason,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(ExitCode::SUCCESS);
    }

    initialize_logging(&config.logging)?;
    info!("Starting Price Watch v{}", price_watch::VERSION);

    let source = HttpPageSource::from_config(&config)?;
    let watcher = PriceWatcher::new(&config, source, DesktopNotifier::new())?;

    let exit = match watcher.run(shutdown_signal()).await {
        TerminationReason::Notified { price } => {
            info!("Price target met at {}", price);
            ExitCode::SUCCESS
        }
        TerminationReason::Interrupted => ExitCode::SUCCESS,
        TerminationReason::ExtractionFailed => {
            error!("Stopping: the course page no longer exposes a readable price");
            ExitCode::FAILURE
        }
    };

    Ok(exit)
}
