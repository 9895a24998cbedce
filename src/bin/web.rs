#![cfg(not(tarpaulin_include))]

use analyzer::app;
use analyzer::config::Config;
use clap::Parser;

/// Main entry point for the web application
///
/// Reads settings from flags and environment, sets up logging and runs the
/// server until Ctrl-C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    app::init_tracing();
    tracing::info!(
        bind = %config.bind,
        upload_dir = %config.upload_dir.display(),
        "starting csv analyzer"
    );

    app::run(config).await
}
