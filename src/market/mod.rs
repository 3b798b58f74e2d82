//! Market metadata module
//!
//! Fetches the one-time market description (identifier and display
//! precisions) the order book engine is initialized with.

mod client;

pub use client::{HydroMarketClient, MarketClientConfig, HYDRO_API_URL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Largest scale a `rust_decimal::Decimal` can represent
pub const MAX_DECIMALS: u32 = 28;

/// Static description of a market, fixed for the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMetadata {
    /// Market identifier, e.g. "HOT-WETH"
    pub market_id: String,
    /// Decimal places used when displaying prices
    pub price_decimals: u32,
    /// Decimal places used when displaying amounts
    pub amount_decimals: u32,
}

impl MarketMetadata {
    /// Create market metadata
    pub fn new(market_id: impl Into<String>, price_decimals: u32, amount_decimals: u32) -> Self {
        Self {
            market_id: market_id.into(),
            price_decimals,
            amount_decimals,
        }
    }
}

/// Source of market metadata
#[async_trait]
pub trait MarketMetadataProvider: Send + Sync {
    /// Fetch metadata for a single market
    async fn fetch_market(&self, market_id: &str) -> anyhow::Result<MarketMetadata>;
}
