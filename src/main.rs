use anyhow::Context;
use clap::Parser;
use pdreport::{cli::Cli, config::Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdreport=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    pdreport::config::validate_config(&config)?;

    tracing::info!("Starting pdreport v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = pdreport::cli::run(cli, config).await {
        tracing::error!(
            error_code = e.error_code(),
            error = %e,
            "Report failed, no output written"
        );
        std::process::exit(1);
    }

    Ok(())
}
