//! Benchmarks for report rendering and image detection.

use contentgap::core::RankedItem;
use contentgap::filters::has_image;
use contentgap::report::render;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn render_benchmark(c: &mut Criterion) {
    let ranked: Vec<RankedItem> = (0..1000)
        .map(|i| RankedItem::new(format!("Article {i}"), 1000 - i))
        .collect();
    c.bench_function("render_1000", |b| {
        b.iter(|| render(black_box(&ranked), Some(5000), Some(1000)))
    });
}

fn has_image_benchmark(c: &mut Criterion) {
    let without = "Lorem ipsum dolor sit amet. ".repeat(2000);
    let with = format!("{without}[[Fichier:Exemple.jpg|vignette]]");
    c.bench_function("has_image_miss", |b| b.iter(|| has_image(black_box(&without))));
    c.bench_function("has_image_hit_at_end", |b| b.iter(|| has_image(black_box(&with))));
}

criterion_group!(benches, render_benchmark, has_image_benchmark);
criterion_main!(benches);
