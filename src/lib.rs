//! hydro-book: live limit order book viewer
//!
//! This library provides:
//! - An aggregated two-sided order book engine fed by snapshots and updates
//! - A reconnecting WebSocket feed for Hydro-style order book channels
//! - Market metadata lookup over the REST API
//! - Terminal rendering of the top of book
//! - Logging and metrics

pub mod cli;
pub mod config;
pub mod display;
pub mod feed;
pub mod market;
pub mod orderbook;
pub mod telemetry;
pub mod ws;
