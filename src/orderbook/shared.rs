//! Shared handle to an order book engine
//!
//! One task applies events through the write lock; any number of readers
//! query through the read lock and never see a half-applied event.

use super::{BookError, BookEvent, BookStats, OrderBookEngine, PriceLevel, TopOfBook};
use crate::market::MarketMetadata;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

/// Cloneable, lock-protected order book engine
#[derive(Debug, Clone, Default)]
pub struct SharedOrderBook {
    inner: Arc<RwLock<OrderBookEngine>>,
}

impl SharedOrderBook {
    /// Wrap an existing engine
    pub fn new(engine: OrderBookEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    /// Initialize the wrapped engine
    pub async fn initialize(&self, metadata: MarketMetadata) -> Result<(), BookError> {
        self.inner.write().await.initialize(metadata)
    }

    /// Apply one event under the write lock
    pub async fn apply(&self, event: &BookEvent) -> Result<(), BookError> {
        self.inner.write().await.apply_event(event)
    }

    /// Hold the read lock for a consistent multi-query view
    pub async fn read(&self) -> RwLockReadGuard<'_, OrderBookEngine> {
        self.inner.read().await
    }

    /// Up to `depth` levels per side, best first
    pub async fn top_of_book(&self, depth: usize) -> TopOfBook {
        self.inner.read().await.top_of_book(depth)
    }

    /// Best ask minus best bid
    pub async fn spread(&self) -> Option<Decimal> {
        self.inner.read().await.spread()
    }

    /// Best bid
    pub async fn best_bid(&self) -> Option<PriceLevel> {
        self.inner.read().await.best_bid()
    }

    /// Best ask
    pub async fn best_ask(&self) -> Option<PriceLevel> {
        self.inner.read().await.best_ask()
    }

    /// Engine counters
    pub async fn stats(&self) -> BookStats {
        self.inner.read().await.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::Side;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_shared_book_apply_and_query() {
        let book = SharedOrderBook::default();
        book.initialize(MarketMetadata::new("HOT-WETH", 5, 3))
            .await
            .unwrap();

        book.apply(&BookEvent::Snapshot {
            asks: vec![PriceLevel::new(dec!(100.5), dec!(2))],
            bids: vec![PriceLevel::new(dec!(100.0), dec!(3))],
        })
        .await
        .unwrap();

        assert_eq!(book.spread().await, Some(dec!(0.5)));
        assert_eq!(book.best_bid().await.unwrap().price, dec!(100.0));
        assert_eq!(book.best_ask().await.unwrap().price, dec!(100.5));
        assert_eq!(book.stats().await.snapshots, 1);
    }

    #[tokio::test]
    async fn test_shared_book_stale_update() {
        let book = SharedOrderBook::default();
        book.initialize(MarketMetadata::new("HOT-WETH", 5, 3))
            .await
            .unwrap();

        let result = book
            .apply(&BookEvent::Update {
                side: Side::Bid,
                level: PriceLevel::new(dec!(100), dec!(1)),
            })
            .await;
        assert_eq!(result, Err(BookError::StaleUpdate));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_partial_snapshot() {
        let book = SharedOrderBook::new(
            OrderBookEngine::with_metadata(MarketMetadata::new("HOT-WETH", 5, 3)).unwrap(),
        );

        // Every snapshot has exactly 50 levels per side
        let snapshot = |base: i64| BookEvent::Snapshot {
            asks: (0..50)
                .map(|i| PriceLevel::new(Decimal::from(base + 100 + i), dec!(1)))
                .collect(),
            bids: (0..50)
                .map(|i| PriceLevel::new(Decimal::from(base + 99 - i), dec!(1)))
                .collect(),
        };
        book.apply(&snapshot(0)).await.unwrap();

        let writer = {
            let book = book.clone();
            tokio::spawn(async move {
                for round in 1..200 {
                    book.apply(&snapshot(round)).await.unwrap();
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..3 {
            let book = book.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let top = book.top_of_book(usize::MAX).await;
                    assert_eq!(top.asks.len(), 50);
                    assert_eq!(top.bids.len(), 50);
                    assert_eq!(top.spread(), Some(dec!(1)));
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
