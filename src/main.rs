use clap::Parser;
use hydro_book::cli::Cli;
use hydro_book::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::example()?
        }
    };

    hydro_book::telemetry::init_telemetry(&config.telemetry)?;

    tracing::info!(market_id = %cli.market_id, "Starting order book viewer");
    hydro_book::cli::run(&cli.market_id, &config).await
}
