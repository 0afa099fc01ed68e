use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use stryktips_gen::classify::{MatchInput, TierSizes, Weights, classify};
use stryktips_gen::expand::{expand, render_rows};
use stryktips_gen::signal::MarketPercentages;

fn sample_inputs() -> Vec<MatchInput> {
    (0..13u32)
        .map(|i| {
            let one = 30.0 + f64::from(i * 7 % 40);
            let x = 20.0 + f64::from(i * 3 % 15);
            MatchInput {
                description: format!("Home {i} - Away {i}"),
                percentages: MarketPercentages::new(one, x, (100.0 - one - x).max(1.0)),
                home_form: i % 16,
                away_form: (i * 5) % 16,
            }
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let inputs = sample_inputs();
    c.bench_function("classify_13", |b| {
        b.iter(|| {
            let out =
                classify(black_box(&inputs), Weights::default(), TierSizes::default()).unwrap();
            black_box(out.len());
        })
    });
}

fn bench_expand(c: &mut Criterion) {
    let classified = classify(&sample_inputs(), Weights::default(), TierSizes::default()).unwrap();
    c.bench_function("expand_1296", |b| {
        b.iter(|| {
            let rows = expand(black_box(&classified));
            black_box(rows.len());
        })
    });
    let rows = expand(&classified);
    c.bench_function("render_rows_1296", |b| {
        b.iter(|| {
            let text = render_rows(black_box(&rows));
            black_box(text.len());
        })
    });
}

criterion_group!(benches, bench_classify, bench_expand);
criterion_main!(benches);
