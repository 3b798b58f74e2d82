//! Order book module
//!
//! Aggregated price-level order book for a single market, maintained from
//! snapshot and incremental update events.

mod engine;
mod error;
mod shared;
mod side;
mod types;

pub use engine::{BookEventSink, BookStats, EngineState, OrderBookEngine};
pub use error::BookError;
pub use shared::SharedOrderBook;
pub use side::{AskBook, AskOrder, BidBook, BidOrder, SideBook, SideOrder};
pub use types::{BookEvent, PriceLevel, Side, TopOfBook};
