use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use orderquote_core::{Money, SellerId, SkuId};
use orderquote_quotations::{
    LineItem, TotalizerEntry, TotalizerKind, Totalizers, recompute, set_unit_price,
};
use rust_decimal::Decimal;

fn line_items(count: usize) -> Vec<LineItem> {
    (0..count)
        .map(|i| LineItem {
            id: SkuId::new(format!("sku-{i}")).unwrap(),
            product_id: format!("p-{i}"),
            name: format!("Product {i}"),
            sku_name: format!("Product {i}"),
            ref_id: None,
            image_url: None,
            list_price: Money::new(Decimal::new(1999, 2)),
            unit_price: Money::new(Decimal::new(1899, 2)),
            quantity: (i % 7 + 1) as u32,
            seller: SellerId::new(format!("seller-{}", i % 3)).unwrap(),
        })
        .collect()
}

fn external() -> Totalizers {
    [
        TotalizerEntry::new(TotalizerKind::Shipping, Money::from_major(15)),
        TotalizerEntry::new(TotalizerKind::Discounts, Money::from_major(4)),
        TotalizerEntry::new(TotalizerKind::from("Tax"), Money::from_major(3)),
    ]
    .into_iter()
    .collect()
}

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute");
    let ext = external();

    for count in [1usize, 10, 100, 1_000].iter() {
        let items = line_items(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("line_items", count), &items, |b, items| {
            b.iter(|| recompute(black_box(items), black_box(&ext)))
        });
    }

    group.finish();
}

fn bench_price_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("price_edit");
    let ext = external();
    let items = line_items(100);
    let target = SkuId::new("sku-50").unwrap();

    group.bench_function("set_unit_price_then_recompute", |b| {
        b.iter(|| {
            let edited =
                set_unit_price(black_box(&items), &target, Money::from_major(12)).unwrap();
            recompute(&edited, &ext)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_recompute, bench_price_edit);
criterion_main!(benches);
