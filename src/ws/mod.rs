//! WebSocket transport
//!
//! Reconnecting WebSocket client used by the order book feed.

mod client;
mod types;

pub use client::WsClient;
pub use types::{WsConfig, WsError, WsMessage};
