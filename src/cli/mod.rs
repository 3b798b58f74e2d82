//! CLI interface for hydro-book
//!
//! `hydro-book <MARKET_ID>` streams the market's order book to the terminal
//! until interrupted.

mod run;

pub use run::{connect, process_events, run};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "hydro-book")]
#[command(about = "Live limit order book viewer for Hydro-style exchange feeds")]
#[command(version)]
pub struct Cli {
    /// Market identifier, e.g. HOT-WETH
    pub market_id: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}
