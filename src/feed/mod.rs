//! Order book feed module
//!
//! Delivers parsed snapshot and update events for one market. The engine
//! never sees transport details; it only consumes [`BookEvent`]s.

mod hydro;

pub use hydro::{parse_message, HydroFeed, HydroFeedConfig, HYDRO_WS_URL};

use crate::orderbook::BookEvent;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Trait for order book feed implementations
#[async_trait]
pub trait OrderBookFeed: Send + Sync {
    /// Subscribe to order book events for `market_id`
    async fn subscribe(&self, market_id: &str) -> anyhow::Result<mpsc::Receiver<BookEvent>>;
}
