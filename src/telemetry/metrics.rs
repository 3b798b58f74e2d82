//! Order book metrics
//!
//! Recorded through the `metrics` facade; they go nowhere unless an
//! exporter has been installed.

use crate::orderbook::{BookError, BookStats};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::time::Duration;

const EVENTS_APPLIED: &str = "hydrobook_events_applied_total";
const EVENTS_REJECTED: &str = "hydrobook_events_rejected_total";
const APPLY_LATENCY: &str = "hydrobook_event_apply_latency_us";
const BID_LEVELS: &str = "hydrobook_bid_levels";
const ASK_LEVELS: &str = "hydrobook_ask_levels";
const SPREAD: &str = "hydrobook_spread";

/// Count a successfully applied event and its latency
pub fn record_event_applied(kind: &'static str, elapsed: Duration) {
    ::metrics::counter!(EVENTS_APPLIED, "kind" => kind).increment(1);
    ::metrics::histogram!(APPLY_LATENCY, "kind" => kind).record(elapsed.as_secs_f64() * 1e6);
}

/// Count a rejected event, labelled by reason
pub fn record_event_rejected(kind: &'static str, error: &BookError) {
    let reason = match error {
        BookError::Configuration(_) => "configuration",
        BookError::NotInitialized => "not_initialized",
        BookError::StaleUpdate => "stale_update",
        BookError::InvalidLevel { .. } => "invalid_level",
    };
    ::metrics::counter!(EVENTS_REJECTED, "kind" => kind, "reason" => reason).increment(1);
}

/// Publish current book shape
pub fn record_book_state(stats: &BookStats, spread: Option<Decimal>) {
    ::metrics::gauge!(BID_LEVELS).set(stats.bid_levels as f64);
    ::metrics::gauge!(ASK_LEVELS).set(stats.ask_levels as f64);
    if let Some(spread) = spread.and_then(|s| s.to_f64()) {
        ::metrics::gauge!(SPREAD).set(spread);
    }
}
