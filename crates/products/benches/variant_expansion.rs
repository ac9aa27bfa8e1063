use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use rust_decimal::Decimal;
use storefront_products::configuration::ProductConfiguration;
use storefront_products::dirty::{Baseline, compute_dirty};
use storefront_products::variants::{self, VariantOption, combination_count, expand};

fn options(values_per_option: usize) -> Vec<VariantOption> {
    ["Size", "Color", "Material"]
        .iter()
        .map(|name| {
            let values: Vec<String> = (0..values_per_option).map(|i| format!("{name}-{i}")).collect();
            VariantOption::new(name, values).expect("benchmark option is well formed")
        })
        .collect()
}

/// Cartesian expansion at the three-option maximum.
fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("variant_expand");

    for values in [2usize, 5, 10, 20] {
        let options = options(values);
        group.throughput(Throughput::Elements(combination_count(&options) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(values), &options, |b, options| {
            b.iter(|| expand(black_box(options)));
        });
    }

    group.finish();
}

/// Full regeneration, including row construction.
fn bench_regenerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("variant_regenerate");

    for values in [5usize, 10, 20] {
        let mut config = ProductConfiguration::new();
        config.price = Some(Decimal::new(1999, 2));
        config.variant_options = options(values);
        config.has_variants = true;

        group.throughput(Throughput::Elements(combination_count(&config.variant_options) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(values), &config, |b, config| {
            b.iter_batched(
                || config.clone(),
                |mut config| {
                    variants::regenerate(&mut config);
                    config
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Dirty check against a baseline holding a fully expanded variant grid.
fn bench_dirty_check(c: &mut Criterion) {
    let mut config = ProductConfiguration::new();
    config.variant_options = options(10);
    config.has_variants = true;
    variants::regenerate(&mut config);
    let baseline = Baseline::capture(&config);

    c.bench_function("dirty_check_1000_rows", |b| {
        b.iter(|| compute_dirty(black_box(&config), Some(black_box(&baseline))));
    });
}

criterion_group!(benches, bench_expand, bench_regenerate, bench_dirty_check);
criterion_main!(benches);
