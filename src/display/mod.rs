//! Terminal rendering of the top of book
//!
//! Asks are printed above the spread line from worst to best so the best
//! ask sits directly above the best bid.

use crate::config::DisplayConfig;
use crate::market::MarketMetadata;
use crate::orderbook::{OrderBookEngine, PriceLevel, TopOfBook};
use rust_decimal::{Decimal, RoundingStrategy};

const WHITE: &str = "\x1b[37m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";
const CLEAR: &str = "\x1b[2J\x1b[H";

const LABEL_WIDTH: usize = 10;
const COLUMN_WIDTH: usize = 20;

/// Renders an order book as plain text
#[derive(Debug, Clone)]
pub struct BookRenderer {
    depth: usize,
    color: bool,
    clear_screen: bool,
}

impl BookRenderer {
    /// Create a renderer from display configuration
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            depth: config.depth,
            color: config.color,
            clear_screen: config.clear_screen,
        }
    }

    /// Render the engine's current state
    ///
    /// Returns `None` until the engine has market metadata to format with.
    pub fn render(&self, engine: &OrderBookEngine) -> Option<String> {
        let metadata = engine.metadata()?;
        Some(self.render_view(metadata, &engine.top_of_book(self.depth), engine.spread()))
    }

    /// Render an already-captured view
    pub fn render_view(
        &self,
        metadata: &MarketMetadata,
        top: &TopOfBook,
        spread: Option<Decimal>,
    ) -> String {
        let mut out = String::new();

        if self.clear_screen {
            out.push_str(CLEAR);
        }

        self.line(&mut out, WHITE, &metadata.market_id);
        let header = format!(
            "{:LABEL_WIDTH$} {:>COLUMN_WIDTH$} {:>COLUMN_WIDTH$}",
            "", "Price", "Amount"
        );
        self.line(&mut out, WHITE, &header);

        for ask in top.asks.iter().rev() {
            self.line(&mut out, RED, &level_row(ask, metadata));
        }

        let spread = spread
            .map(|s| format_fixed(s, metadata.price_decimals))
            .unwrap_or_else(|| "-".to_string());
        let spread_row = format!("{:<LABEL_WIDTH$} {:>COLUMN_WIDTH$}", "Spread", spread);
        self.line(&mut out, WHITE, &spread_row);

        for bid in &top.bids {
            self.line(&mut out, GREEN, &level_row(bid, metadata));
        }

        out
    }

    fn line(&self, out: &mut String, color: &str, text: &str) {
        let line = if self.color {
            format!("{}{}{}\n", color, text, RESET)
        } else {
            format!("{}\n", text)
        };
        out.push_str(&line);
    }
}

impl Default for BookRenderer {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

fn level_row(level: &PriceLevel, metadata: &MarketMetadata) -> String {
    format!(
        "{:LABEL_WIDTH$} {:>COLUMN_WIDTH$} {:>COLUMN_WIDTH$}",
        "",
        format_fixed(level.price, metadata.price_decimals),
        format_fixed(level.amount, metadata.amount_decimals)
    )
}

/// Format with exactly `decimals` places, rounding half away from zero
pub fn format_fixed(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}
