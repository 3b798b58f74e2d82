//! Order book engine
//!
//! Owns both book sides and applies snapshot and update events to them.
//!
//! Updates are treated as idempotent deltas over the last applied snapshot.
//! There are no sequence numbers and no gap detection: if the feed delivers
//! events out of order the book reflects whichever event was applied last for
//! each price, until the next snapshot replaces everything. This is a known
//! limitation of the feed, not something the engine tries to repair.

use super::{AskBook, BidBook, BookError, BookEvent, PriceLevel, Side, TopOfBook};
use crate::market::{MarketMetadata, MAX_DECIMALS};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Inbound event interface a feed adapter drives
pub trait BookEventSink {
    /// Replace the whole book with a snapshot
    fn on_snapshot(&mut self, asks: &[PriceLevel], bids: &[PriceLevel]) -> Result<(), BookError>;

    /// Apply a single level change
    fn on_update(&mut self, side: Side, level: PriceLevel) -> Result<(), BookError>;

    /// Dispatch a typed event to `on_snapshot` / `on_update`
    fn on_event(&mut self, event: &BookEvent) -> Result<(), BookError> {
        match event {
            BookEvent::Snapshot { asks, bids } => self.on_snapshot(asks, bids),
            BookEvent::Update { side, level } => self.on_update(*side, *level),
        }
    }
}

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    /// No market metadata yet
    Uninitialized,
    /// Metadata loaded, accepting events
    Active,
}

/// Counters describing what the engine has processed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookStats {
    /// Snapshots applied
    pub snapshots: u64,
    /// Updates applied
    pub updates: u64,
    /// Events rejected with an error
    pub rejected: u64,
    /// Current number of bid levels
    pub bid_levels: usize,
    /// Current number of ask levels
    pub ask_levels: usize,
    /// Time of the last successfully applied event
    pub last_event_at: Option<DateTime<Utc>>,
}

/// Aggregated two-sided order book for a single market
#[derive(Debug, Default)]
pub struct OrderBookEngine {
    metadata: Option<MarketMetadata>,
    asks: AskBook,
    bids: BidBook,
    has_snapshot: bool,
    stats: BookStats,
}

impl OrderBookEngine {
    /// Create an uninitialized engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine and initialize it in one step
    pub fn with_metadata(metadata: MarketMetadata) -> Result<Self, BookError> {
        let mut engine = Self::new();
        engine.initialize(metadata)?;
        Ok(engine)
    }

    /// Load market metadata, moving the engine to `Active`
    ///
    /// Fails if the engine is already active or the metadata is unusable.
    pub fn initialize(&mut self, metadata: MarketMetadata) -> Result<(), BookError> {
        if let Some(current) = &self.metadata {
            return Err(BookError::Configuration(format!(
                "engine already initialized for market {}",
                current.market_id
            )));
        }
        if metadata.market_id.trim().is_empty() {
            return Err(BookError::Configuration("missing market identifier".into()));
        }
        if metadata.price_decimals > MAX_DECIMALS || metadata.amount_decimals > MAX_DECIMALS {
            return Err(BookError::Configuration(format!(
                "display precision above {} decimals",
                MAX_DECIMALS
            )));
        }

        tracing::info!(
            market_id = %metadata.market_id,
            price_decimals = metadata.price_decimals,
            amount_decimals = metadata.amount_decimals,
            "Order book engine initialized"
        );
        self.metadata = Some(metadata);
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        if self.metadata.is_some() {
            EngineState::Active
        } else {
            EngineState::Uninitialized
        }
    }

    /// Market metadata, once initialized
    pub fn metadata(&self) -> Option<&MarketMetadata> {
        self.metadata.as_ref()
    }

    /// Whether at least one snapshot has been applied
    pub fn has_snapshot(&self) -> bool {
        self.has_snapshot
    }

    /// Replace both sides with the supplied levels
    ///
    /// The snapshot is authoritative: prior state is discarded without any
    /// ordering check. Zero-amount levels are skipped. If any level is
    /// malformed the whole snapshot is rejected and the book is left as it was.
    pub fn apply_snapshot(
        &mut self,
        asks: &[PriceLevel],
        bids: &[PriceLevel],
    ) -> Result<(), BookError> {
        let result = self.try_apply_snapshot(asks, bids);
        self.record(&result);
        result
    }

    fn try_apply_snapshot(
        &mut self,
        asks: &[PriceLevel],
        bids: &[PriceLevel],
    ) -> Result<(), BookError> {
        self.ensure_active()?;
        for level in asks.iter().chain(bids) {
            level.validate()?;
        }

        self.asks.clear();
        self.bids.clear();
        for level in asks.iter().filter(|l| !l.is_empty()) {
            self.asks.upsert(*level)?;
        }
        for level in bids.iter().filter(|l| !l.is_empty()) {
            self.bids.upsert(*level)?;
        }

        self.has_snapshot = true;
        self.stats.snapshots += 1;

        tracing::debug!(
            ask_levels = self.asks.len(),
            bid_levels = self.bids.len(),
            "Applied order book snapshot"
        );
        Ok(())
    }

    /// Apply one level change to the given side
    ///
    /// Rejected with `StaleUpdate` until the first snapshot has arrived; the
    /// book is unchanged in that case.
    pub fn apply_update(&mut self, side: Side, level: PriceLevel) -> Result<(), BookError> {
        let result = self.try_apply_update(side, level);
        self.record(&result);
        result
    }

    fn try_apply_update(&mut self, side: Side, level: PriceLevel) -> Result<(), BookError> {
        self.ensure_active()?;
        if !self.has_snapshot {
            return Err(BookError::StaleUpdate);
        }

        match side {
            Side::Bid => self.bids.upsert(level)?,
            Side::Ask => self.asks.upsert(level)?,
        }

        self.stats.updates += 1;

        tracing::trace!(
            %side,
            price = %level.price,
            amount = %level.amount,
            "Applied order book update"
        );
        Ok(())
    }

    /// Apply any inbound event
    pub fn apply_event(&mut self, event: &BookEvent) -> Result<(), BookError> {
        self.on_event(event)
    }

    fn ensure_active(&self) -> Result<(), BookError> {
        match self.state() {
            EngineState::Active => Ok(()),
            EngineState::Uninitialized => Err(BookError::NotInitialized),
        }
    }

    fn record(&mut self, result: &Result<(), BookError>) {
        match result {
            Ok(()) => self.stats.last_event_at = Some(Utc::now()),
            Err(_) => self.stats.rejected += 1,
        }
    }

    /// Up to `depth` levels per side, best first
    pub fn top_of_book(&self, depth: usize) -> TopOfBook {
        TopOfBook {
            asks: self.asks.top_n(depth),
            bids: self.bids.top_n(depth),
        }
    }

    /// Ask side
    pub fn asks(&self) -> &AskBook {
        &self.asks
    }

    /// Bid side
    pub fn bids(&self) -> &BidBook {
        &self.bids
    }

    /// Best (highest) bid
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.best()
    }

    /// Best (lowest) ask
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.best()
    }

    /// Best ask minus best bid
    ///
    /// Negative or zero when the book is crossed; reported as-is.
    pub fn spread(&self) -> Option<Decimal> {
        let ask = self.best_ask()?;
        let bid = self.best_bid()?;
        Some(ask.price - bid.price)
    }

    /// Whether best bid >= best ask
    pub fn is_crossed(&self) -> bool {
        self.spread().is_some_and(|s| s <= Decimal::ZERO)
    }

    /// Processing counters plus current level counts
    pub fn stats(&self) -> BookStats {
        BookStats {
            bid_levels: self.bids.len(),
            ask_levels: self.asks.len(),
            ..self.stats.clone()
        }
    }
}

impl BookEventSink for OrderBookEngine {
    fn on_snapshot(&mut self, asks: &[PriceLevel], bids: &[PriceLevel]) -> Result<(), BookError> {
        self.apply_snapshot(asks, bids)
    }

    fn on_update(&mut self, side: Side, level: PriceLevel) -> Result<(), BookError> {
        self.apply_update(side, level)
    }
}
