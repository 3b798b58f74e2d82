//! Hydro REST client for market metadata

use super::{MarketMetadata, MarketMetadataProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Hydro API base URL
pub const HYDRO_API_URL: &str = "https://api.ddex.io/v3";

/// Configuration for the market client
#[derive(Debug, Clone)]
pub struct MarketClientConfig {
    /// Base URL for the REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for MarketClientConfig {
    fn default() -> Self {
        Self {
            base_url: HYDRO_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the Hydro market endpoint
pub struct HydroMarketClient {
    config: MarketClientConfig,
    client: Client,
}

impl HydroMarketClient {
    /// Create a client with the given configuration
    pub fn with_config(config: MarketClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// URL of the market endpoint for `market_id`
    fn market_url(&self, market_id: &str) -> String {
        format!(
            "{}/markets/{}",
            self.config.base_url.trim_end_matches('/'),
            market_id
        )
    }
}

#[async_trait]
impl MarketMetadataProvider for HydroMarketClient {
    async fn fetch_market(&self, market_id: &str) -> anyhow::Result<MarketMetadata> {
        let url = self.market_url(market_id);

        tracing::debug!(url = %url, "Fetching market metadata");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Market API error: {} - {}", status, body);
        }

        let body = response.text().await?;
        let market = parse_market_response(&body)?;

        tracing::info!(
            market_id = %market.market_id,
            price_decimals = market.price_decimals,
            amount_decimals = market.amount_decimals,
            "Loaded market metadata"
        );

        Ok(market)
    }
}

/// Response envelope: `{"status":0,"desc":"success","data":{...}}`
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    status: i64,
    #[serde(default)]
    desc: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    market: ApiMarket,
}

/// Raw market as returned by the API; unknown fields are ignored
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMarket {
    id: String,
    price_decimals: u32,
    amount_decimals: u32,
}

/// Parse a market endpoint body into metadata
fn parse_market_response(body: &str) -> anyhow::Result<MarketMetadata> {
    let response: ApiResponse<MarketData> = serde_json::from_str(body)?;

    if response.status != 0 {
        anyhow::bail!(
            "Market API returned status {}: {}",
            response.status,
            response.desc
        );
    }

    let market = response
        .data
        .ok_or_else(|| anyhow::anyhow!("Market API response has no data"))?
        .market;

    Ok(MarketMetadata::new(
        market.id,
        market.price_decimals,
        market.amount_decimals,
    ))
}
