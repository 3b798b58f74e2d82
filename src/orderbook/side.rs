//! One side of the order book
//!
//! Both sides share a single generic [`SideBook`]; the ordering policy type
//! parameter decides whether iteration is ascending (asks) or descending
//! (bids). Levels live in a `BTreeMap` so insert, remove and lookup by price
//! are logarithmic and best-first iteration is a plain in-order walk.

use super::{BookError, PriceLevel, Side};
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Ordering policy for a book side
pub trait SideOrder {
    /// Map key whose natural order is the side's best-first order
    type Key: Ord + Copy + fmt::Debug;

    /// Side this ordering belongs to
    const SIDE: Side;

    /// Key for a price
    fn key(price: Decimal) -> Self::Key;
}

/// Ascending order, lowest price first
#[derive(Debug, Clone, Copy, Default)]
pub struct AskOrder;

impl SideOrder for AskOrder {
    type Key = Decimal;
    const SIDE: Side = Side::Ask;

    fn key(price: Decimal) -> Self::Key {
        price
    }
}

/// Descending order, highest price first
#[derive(Debug, Clone, Copy, Default)]
pub struct BidOrder;

impl SideOrder for BidOrder {
    type Key = Reverse<Decimal>;
    const SIDE: Side = Side::Bid;

    fn key(price: Decimal) -> Self::Key {
        Reverse(price)
    }
}

/// Ask side of a book
pub type AskBook = SideBook<AskOrder>;
/// Bid side of a book
pub type BidBook = SideBook<BidOrder>;

/// Price-keyed levels for one side, at most one entry per price
#[derive(Debug, Clone)]
pub struct SideBook<O: SideOrder> {
    // The stored level keeps the price exactly as last supplied, so
    // replacing 101.0 with 101.00 changes the displayed scale too.
    levels: BTreeMap<O::Key, PriceLevel>,
    _order: PhantomData<O>,
}

impl<O: SideOrder> SideBook<O> {
    /// Create an empty side
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
            _order: PhantomData,
        }
    }

    /// Which side this book holds
    pub fn side(&self) -> Side {
        O::SIDE
    }

    /// Remove every level
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Insert, replace or remove the level at `level.price`
    ///
    /// A zero amount removes the price (no-op when absent); anything else
    /// replaces whatever was stored at that price. Applying the same level
    /// twice leaves the same state as applying it once. Malformed levels are
    /// rejected before the book is touched.
    pub fn upsert(&mut self, level: PriceLevel) -> Result<(), BookError> {
        level.validate()?;

        let key = O::key(level.price);
        if level.is_empty() {
            self.levels.remove(&key);
        } else {
            self.levels.insert(key, level);
        }
        Ok(())
    }

    /// Lazy best-first iteration over the stored levels
    pub fn iter(&self) -> impl Iterator<Item = PriceLevel> + '_ {
        self.levels.values().copied()
    }

    /// Up to `n` levels, best first
    pub fn top_n(&self, n: usize) -> Vec<PriceLevel> {
        self.iter().take(n).collect()
    }

    /// Best level, if any
    pub fn best(&self) -> Option<PriceLevel> {
        self.levels.values().next().copied()
    }

    /// Number of price levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the side has no levels
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl<O: SideOrder> Default for SideBook<O> {
    fn default() -> Self {
        Self::new()
    }
}
