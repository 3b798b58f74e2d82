//! Benchmarks for order book maintenance

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hydro_book::market::MarketMetadata;
use hydro_book::orderbook::{BidBook, OrderBookEngine, PriceLevel, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn deep_bids(levels: i64) -> BidBook {
    let mut bids = BidBook::new();
    for i in 0..levels {
        bids.upsert(PriceLevel::new(Decimal::new(100_000 - i, 2), dec!(1)))
            .unwrap();
    }
    bids
}

fn benchmark_upsert(c: &mut Criterion) {
    let mut bids = deep_bids(5_000);
    let mut i = 0i64;

    c.bench_function("side_book_upsert_5000", |b| {
        b.iter(|| {
            i = (i + 7) % 5_000;
            let price = Decimal::new(100_000 - i, 2);
            bids.upsert(black_box(PriceLevel::new(price, dec!(0)))).unwrap();
            bids.upsert(black_box(PriceLevel::new(price, dec!(2)))).unwrap();
        })
    });
}

fn benchmark_top_n(c: &mut Criterion) {
    let bids = deep_bids(5_000);

    c.bench_function("side_book_top_10_of_5000", |b| {
        b.iter(|| bids.top_n(black_box(10)))
    });
}

fn benchmark_snapshot(c: &mut Criterion) {
    let mut engine =
        OrderBookEngine::with_metadata(MarketMetadata::new("HOT-WETH", 2, 2)).unwrap();
    let asks: Vec<PriceLevel> = (0..2_000)
        .map(|i| PriceLevel::new(Decimal::new(100_100 + i, 2), dec!(1)))
        .collect();
    let bids: Vec<PriceLevel> = (0..2_000)
        .map(|i| PriceLevel::new(Decimal::new(100_000 - i, 2), dec!(1)))
        .collect();

    c.bench_function("engine_snapshot_2x2000", |b| {
        b.iter(|| engine.apply_snapshot(black_box(&asks), black_box(&bids)).unwrap())
    });

    c.bench_function("engine_update", |b| {
        b.iter(|| {
            engine
                .apply_update(Side::Ask, black_box(PriceLevel::new(dec!(1001.5), dec!(3))))
                .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_upsert, benchmark_top_n, benchmark_snapshot);
criterion_main!(benches);
