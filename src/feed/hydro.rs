//! Hydro WebSocket order book feed
//!
//! Subscribes to the `orderbook#<market>` channel and converts level-2
//! snapshot and update messages into [`BookEvent`]s.

use super::OrderBookFeed;
use crate::orderbook::{BookEvent, PriceLevel, Side};
use crate::ws::{WsClient, WsConfig, WsMessage};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;

/// Hydro WebSocket URL
pub const HYDRO_WS_URL: &str = "wss://ws.ddex.io/v3";

/// Configuration for the Hydro feed
#[derive(Debug, Clone)]
pub struct HydroFeedConfig {
    /// WebSocket URL
    pub ws_url: String,
    /// Maximum reconnection attempts (0 = infinite)
    pub max_reconnects: u32,
    /// Initial reconnection delay
    pub initial_delay: Duration,
    /// Maximum reconnection delay
    pub max_delay: Duration,
    /// Channel buffer size for book events
    pub buffer_size: usize,
}

impl Default for HydroFeedConfig {
    fn default() -> Self {
        Self {
            ws_url: HYDRO_WS_URL.to_string(),
            max_reconnects: 0,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            buffer_size: 1024,
        }
    }
}

/// Hydro order book feed
pub struct HydroFeed {
    config: HydroFeedConfig,
}

impl HydroFeed {
    /// Create a feed with default configuration
    pub fn new() -> Self {
        Self::with_config(HydroFeedConfig::default())
    }

    /// Create a feed with custom configuration
    pub fn with_config(config: HydroFeedConfig) -> Self {
        Self { config }
    }
}

impl Default for HydroFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderBookFeed for HydroFeed {
    async fn subscribe(&self, market_id: &str) -> anyhow::Result<mpsc::Receiver<BookEvent>> {
        if market_id.trim().is_empty() {
            anyhow::bail!("Cannot subscribe without a market id");
        }

        let (tx, rx) = mpsc::channel(self.config.buffer_size);

        let ws_config = WsConfig::new(&self.config.ws_url)
            .max_reconnects(self.config.max_reconnects)
            .initial_delay(self.config.initial_delay)
            .max_delay(self.config.max_delay);
        let (ws_rx, ws_tx) = WsClient::new(ws_config).connect(self.config.buffer_size);

        let market = market_id.to_string();
        tokio::spawn(async move {
            run_subscription_loop(market, ws_rx, ws_tx, tx).await;
        });

        tracing::info!(market_id, "Started order book subscription");

        Ok(rx)
    }
}

/// Resubscribe on every connect and forward parsed events
async fn run_subscription_loop(
    market_id: String,
    mut ws_rx: mpsc::Receiver<WsMessage>,
    ws_tx: mpsc::Sender<String>,
    tx: mpsc::Sender<BookEvent>,
) {
    let subscription = SubscriptionMessage::orderbook(&market_id);

    while let Some(msg) = ws_rx.recv().await {
        match msg {
            WsMessage::Connected => {
                tracing::info!(market_id = %market_id, "Order book feed connected");

                let json = match serde_json::to_string(&subscription) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to encode subscription");
                        break;
                    }
                };
                if ws_tx.send(json).await.is_err() {
                    tracing::error!("Failed to send subscription message");
                    break;
                }
            }
            WsMessage::Text(text) => match parse_message(&text, &market_id) {
                Ok(Some(event)) => {
                    if tx.send(event).await.is_err() {
                        tracing::debug!("Book event receiver dropped, stopping feed");
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        msg_preview = %text.chars().take(100).collect::<String>(),
                        "Failed to parse feed message"
                    );
                }
            },
            WsMessage::Reconnecting { attempt } => {
                tracing::warn!(attempt, "Order book feed reconnecting");
            }
            WsMessage::Disconnected => {
                tracing::warn!("Order book feed disconnected");
                break;
            }
        }
    }
}

/// Channel subscription request
#[derive(Debug, Serialize)]
struct SubscriptionMessage {
    #[serde(rename = "type")]
    msg_type: &'static str,
    channels: Vec<String>,
}

impl SubscriptionMessage {
    fn orderbook(market_id: &str) -> Self {
        Self {
            msg_type: "subscribe",
            channels: vec![format!("orderbook#{}", market_id)],
        }
    }
}

/// Level as sent on the wire, decimals as strings
#[derive(Debug, Deserialize)]
struct WireLevel {
    price: String,
    amount: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum FeedMessage {
    #[serde(rename = "level2OrderbookSnapshot", rename_all = "camelCase")]
    Snapshot {
        market_id: String,
        #[serde(default)]
        bids: Vec<WireLevel>,
        #[serde(default)]
        asks: Vec<WireLevel>,
    },
    #[serde(rename = "level2OrderbookUpdate", rename_all = "camelCase")]
    Update {
        market_id: String,
        side: Side,
        price: String,
        amount: String,
    },
    #[serde(other)]
    Other,
}

/// Parse one feed message
///
/// Returns `Ok(None)` for messages that are not order book events or belong
/// to another market. Snapshot levels that fail to parse are dropped with a
/// warning; a malformed update is an error.
pub fn parse_message(text: &str, market_id: &str) -> anyhow::Result<Option<BookEvent>> {
    let message: FeedMessage = serde_json::from_str(text)?;

    match message {
        FeedMessage::Snapshot {
            market_id: msg_market,
            bids,
            asks,
        } => {
            if msg_market != market_id {
                return Ok(None);
            }
            let asks = parse_levels(asks);
            let bids = parse_levels(bids);
            tracing::trace!(
                asks = asks.len(),
                bids = bids.len(),
                "Parsed order book snapshot"
            );
            Ok(Some(BookEvent::Snapshot { asks, bids }))
        }
        FeedMessage::Update {
            market_id: msg_market,
            side,
            price,
            amount,
        } => {
            if msg_market != market_id {
                return Ok(None);
            }
            let level = parse_level(&price, &amount)?;
            Ok(Some(BookEvent::Update { side, level }))
        }
        FeedMessage::Other => Ok(None),
    }
}

fn parse_level(price: &str, amount: &str) -> anyhow::Result<PriceLevel> {
    let price = Decimal::from_str(price)
        .map_err(|e| anyhow::anyhow!("Invalid price {:?}: {}", price, e))?;
    let amount = Decimal::from_str(amount)
        .map_err(|e| anyhow::anyhow!("Invalid amount {:?}: {}", amount, e))?;
    Ok(PriceLevel::new(price, amount))
}

fn parse_levels(levels: Vec<WireLevel>) -> Vec<PriceLevel> {
    levels
        .into_iter()
        .filter_map(|l| match parse_level(&l.price, &l.amount) {
            Ok(level) => Some(level),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping unparsable snapshot level");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_feed_config_default() {
        let config = HydroFeedConfig::default();
        assert_eq!(config.ws_url, HYDRO_WS_URL);
        assert_eq!(config.max_reconnects, 0);
        assert_eq!(config.buffer_size, 1024);
    }

    #[test]
    fn test_subscription_message_serialization() {
        let json = serde_json::to_string(&SubscriptionMessage::orderbook("HOT-WETH")).unwrap();
        assert_eq!(
            json,
            r#"{"type":"subscribe","channels":["orderbook#HOT-WETH"]}"#
        );
    }

    #[test]
    fn test_parse_snapshot() {
        let json = r#"{
            "type": "level2OrderbookSnapshot",
            "marketId": "HOT-WETH",
            "bids": [{"price": "0.00000850", "amount": "1000"}, {"price": "0.00000840", "amount": "500"}],
            "asks": [{"price": "0.00000860", "amount": "250.5"}]
        }"#;

        let event = parse_message(json, "HOT-WETH").unwrap().unwrap();
        match event {
            BookEvent::Snapshot { asks, bids } => {
                assert_eq!(asks, vec![PriceLevel::new(dec!(0.00000860), dec!(250.5))]);
                assert_eq!(bids.len(), 2);
                assert_eq!(bids[0].price, dec!(0.00000850));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_parse_snapshot_drops_bad_levels() {
        let json = r#"{
            "type": "level2OrderbookSnapshot",
            "marketId": "HOT-WETH",
            "bids": [{"price": "abc", "amount": "1"}, {"price": "0.5", "amount": "1"}]
        }"#;

        match parse_message(json, "HOT-WETH").unwrap().unwrap() {
            BookEvent::Snapshot { asks, bids } => {
                assert!(asks.is_empty());
                assert_eq!(bids, vec![PriceLevel::new(dec!(0.5), dec!(1))]);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_parse_update() {
        let json = r#"{
            "type": "level2OrderbookUpdate",
            "marketId": "HOT-WETH",
            "side": "sell",
            "price": "0.00000860",
            "amount": "0"
        }"#;

        let event = parse_message(json, "HOT-WETH").unwrap();
        assert_eq!(
            event,
            Some(BookEvent::Update {
                side: Side::Ask,
                level: PriceLevel::new(dec!(0.00000860), dec!(0)),
            })
        );
    }

    #[test]
    fn test_parse_update_buy_side() {
        let json = r#"{"type":"level2OrderbookUpdate","marketId":"HOT-WETH","side":"buy","price":"1.5","amount":"2"}"#;
        match parse_message(json, "HOT-WETH").unwrap() {
            Some(BookEvent::Update { side, .. }) => assert_eq!(side, Side::Bid),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_parse_update_bad_price() {
        let json = r#"{"type":"level2OrderbookUpdate","marketId":"HOT-WETH","side":"buy","price":"x","amount":"2"}"#;
        assert!(parse_message(json, "HOT-WETH").is_err());
    }

    #[test]
    fn test_parse_other_market_ignored() {
        let json = r#"{"type":"level2OrderbookUpdate","marketId":"ZRX-WETH","side":"buy","price":"1","amount":"1"}"#;
        assert!(parse_message(json, "HOT-WETH").unwrap().is_none());
    }

    #[test]
    fn test_parse_unknown_type_ignored() {
        let json = r#"{"type":"level3OrderbookUpdate","marketId":"HOT-WETH"}"#;
        assert!(parse_message(json, "HOT-WETH").unwrap().is_none());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_message("not valid json", "HOT-WETH").is_err());
    }

    #[tokio::test]
    async fn test_subscribe_requires_market_id() {
        let feed = HydroFeed::new();
        assert!(feed.subscribe("").await.is_err());
    }

    #[tokio::test]
    async fn test_subscription_loop_resubscribes_on_every_connect() {
        let (ws_msg_tx, ws_rx) = mpsc::channel(8);
        let (ws_tx, mut outgoing) = mpsc::channel(8);
        let (tx, mut events) = mpsc::channel(8);
        let handle = tokio::spawn(run_subscription_loop("HOT-WETH".to_string(), ws_rx, ws_tx, tx));

        let snapshot = r#"{"type":"level2OrderbookSnapshot","marketId":"HOT-WETH","bids":[{"price":"1","amount":"2"}],"asks":[]}"#;
        let update = r#"{"type":"level2OrderbookUpdate","marketId":"HOT-WETH","side":"sell","price":"1.5","amount":"3"}"#;
        for msg in [
            WsMessage::Connected,
            WsMessage::Text(snapshot.to_string()),
            WsMessage::Reconnecting { attempt: 1 },
            WsMessage::Connected,
            WsMessage::Text(update.to_string()),
        ] {
            ws_msg_tx.send(msg).await.unwrap();
        }
        drop(ws_msg_tx);
        handle.await.unwrap();

        let expected = r#"{"type":"subscribe","channels":["orderbook#HOT-WETH"]}"#;
        assert_eq!(outgoing.recv().await.as_deref(), Some(expected));
        assert_eq!(outgoing.recv().await.as_deref(), Some(expected));
        assert!(outgoing.recv().await.is_none());

        assert!(matches!(events.recv().await, Some(BookEvent::Snapshot { .. })));
        assert_eq!(
            events.recv().await,
            Some(BookEvent::Update {
                side: Side::Ask,
                level: PriceLevel::new(dec!(1.5), dec!(3)),
            })
        );
        assert!(events.recv().await.is_none());
    }
}
