//! Order book value types

use crate::orderbook::BookError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A price level in the order book
///
/// `amount` is the aggregate resting amount at `price`. A level with a zero
/// amount is logically absent: updates use it to signal removal and it is
/// never stored in a [`SideBook`](super::SideBook).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price at this level
    pub price: Decimal,
    /// Total amount resting at this price
    pub amount: Decimal,
}

impl PriceLevel {
    /// Create a new price level
    pub fn new(price: Decimal, amount: Decimal) -> Self {
        Self { price, amount }
    }

    /// Whether this level carries no resting amount
    pub fn is_empty(&self) -> bool {
        self.amount.is_zero()
    }

    /// Check the level is well formed: price > 0 and amount >= 0
    pub fn validate(&self) -> Result<(), BookError> {
        if self.price <= Decimal::ZERO || self.amount < Decimal::ZERO {
            return Err(BookError::InvalidLevel {
                price: self.price,
                amount: self.amount,
            });
        }
        Ok(())
    }
}

/// Book side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Resting buy interest
    #[serde(alias = "buy")]
    Bid,
    /// Resting sell interest
    #[serde(alias = "sell")]
    Ask,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// Inbound order book event delivered by a feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookEvent {
    /// Full authoritative replacement of both sides
    Snapshot {
        asks: Vec<PriceLevel>,
        bids: Vec<PriceLevel>,
    },
    /// Incremental change to a single level; zero amount removes it
    Update { side: Side, level: PriceLevel },
}

impl BookEvent {
    /// Short name used in logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            BookEvent::Snapshot { .. } => "snapshot",
            BookEvent::Update { .. } => "update",
        }
    }
}

/// Bounded-depth view of both sides, best levels first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopOfBook {
    /// Ask levels, lowest price first
    pub asks: Vec<PriceLevel>,
    /// Bid levels, highest price first
    pub bids: Vec<PriceLevel>,
}

impl TopOfBook {
    /// Spread between the first ask and first bid in this view
    pub fn spread(&self) -> Option<Decimal> {
        match (self.asks.first(), self.bids.first()) {
            (Some(ask), Some(bid)) => Some(ask.price - bid.price),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_level_validate() {
        assert!(PriceLevel::new(dec!(100), dec!(1)).validate().is_ok());
        assert!(PriceLevel::new(dec!(100), dec!(0)).validate().is_ok());
        assert!(PriceLevel::new(dec!(0), dec!(1)).validate().is_err());
        assert!(PriceLevel::new(dec!(-1), dec!(1)).validate().is_err());
        assert!(PriceLevel::new(dec!(100), dec!(-0.5)).validate().is_err());
    }

    #[test]
    fn test_price_level_empty() {
        assert!(PriceLevel::new(dec!(100), dec!(0.000)).is_empty());
        assert!(!PriceLevel::new(dec!(100), dec!(0.001)).is_empty());
    }

    #[test]
    fn test_side_deserialize_wire_names() {
        let bid: Side = serde_json::from_str("\"buy\"").unwrap();
        let ask: Side = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(bid, Side::Bid);
        assert_eq!(ask, Side::Ask);
        assert_eq!(serde_json::from_str::<Side>("\"bid\"").unwrap(), Side::Bid);
    }

    #[test]
    fn test_top_of_book_spread() {
        let top = TopOfBook {
            asks: vec![PriceLevel::new(dec!(100.5), dec!(2))],
            bids: vec![PriceLevel::new(dec!(100.0), dec!(3))],
        };
        assert_eq!(top.spread(), Some(dec!(0.5)));
        assert!(TopOfBook::default().spread().is_none());
    }

    #[test]
    fn test_event_kind() {
        let event = BookEvent::Update {
            side: Side::Ask,
            level: PriceLevel::new(dec!(1), dec!(1)),
        };
        assert_eq!(event.kind(), "update");
    }
}
