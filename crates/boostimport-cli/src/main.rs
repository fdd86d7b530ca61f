use boostimport_core::logging;
use clap::Parser;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Fall back to stderr rather than refusing to start.
    if let Err(e) = logging::init_logging(&cli.log_target()) {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }

    if let Err(err) = cli.run().await {
        tracing::error!("{:#}", err);
        eprintln!("boostimport error: {:#}", err);
        std::process::exit(1);
    }
}
