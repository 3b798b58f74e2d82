//! Run loop: market metadata -> engine -> feed -> display

use crate::config::Config;
use crate::display::BookRenderer;
use crate::feed::{HydroFeed, OrderBookFeed};
use crate::market::{HydroMarketClient, MarketMetadataProvider};
use crate::orderbook::{BookEvent, OrderBookEngine, SharedOrderBook};
use crate::telemetry;
use std::io::Write;
use std::time::Instant;
use tokio::sync::mpsc;

/// Stream `market_id` to the terminal until Ctrl-C or the feed ends
pub async fn run(market_id: &str, config: &Config) -> anyhow::Result<()> {
    let provider = HydroMarketClient::with_config((&config.market).into())?;
    let feed = HydroFeed::with_config((&config.feed).into());
    let renderer = BookRenderer::new(&config.display);
    let book = SharedOrderBook::default();

    let events = connect(market_id, &provider, &feed, &book).await?;

    let render = |engine: &OrderBookEngine| -> anyhow::Result<()> {
        if let Some(frame) = renderer.render(engine) {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(frame.as_bytes())?;
            stdout.flush()?;
        }
        Ok(())
    };

    tokio::select! {
        result = process_events(&book, events, render) => {
            let applied = result?;
            tracing::info!(applied, "Order book feed ended");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
    }

    Ok(())
}

/// Fetch metadata, initialize the engine and subscribe to its market
pub async fn connect<P, F>(
    market_id: &str,
    provider: &P,
    feed: &F,
    book: &SharedOrderBook,
) -> anyhow::Result<mpsc::Receiver<BookEvent>>
where
    P: MarketMetadataProvider + ?Sized,
    F: OrderBookFeed + ?Sized,
{
    let metadata = provider.fetch_market(market_id).await?;
    if metadata.market_id != market_id {
        tracing::warn!(
            requested = market_id,
            returned = %metadata.market_id,
            "Market API returned a different identifier"
        );
    }

    book.initialize(metadata).await?;
    feed.subscribe(market_id).await
}

/// Apply events in arrival order, calling `on_applied` after each one
///
/// Stale and malformed events are logged and skipped; anything else stops
/// the loop. Returns the number of applied events once the feed closes.
pub async fn process_events<R>(
    book: &SharedOrderBook,
    mut events: mpsc::Receiver<BookEvent>,
    mut on_applied: R,
) -> anyhow::Result<u64>
where
    R: FnMut(&OrderBookEngine) -> anyhow::Result<()>,
{
    let mut applied = 0;

    while let Some(event) = events.recv().await {
        let kind = event.kind();
        let started = Instant::now();

        match book.apply(&event).await {
            Ok(()) => {
                applied += 1;
                telemetry::record_event_applied(kind, started.elapsed());

                let engine = book.read().await;
                telemetry::record_book_state(&engine.stats(), engine.spread());
                if engine.is_crossed() {
                    tracing::debug!(spread = ?engine.spread(), "Order book is crossed");
                }
                on_applied(&engine)?;
            }
            Err(e) if e.is_recoverable() => {
                telemetry::record_event_rejected(kind, &e);
                tracing::warn!(error = %e, kind, "Dropping order book event");
            }
            Err(e) => {
                telemetry::record_event_rejected(kind, &e);
                return Err(e.into());
            }
        }
    }

    Ok(applied)
}
