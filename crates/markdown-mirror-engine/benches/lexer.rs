use criterion::{Criterion, criterion_group, criterion_main};
use markdown_mirror_engine::{PreviewRenderer, tokenize};
mod common;

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    group.sample_size(10);

    for size in [10, 100] {
        let content = common::generate_markdown_content(size);
        group.bench_function(format!("tokenize_{size}"), |b| {
            b.iter(|| {
                let tokens = tokenize(std::hint::black_box(&content));
                std::hint::black_box(tokens);
            });
        });
    }

    group.finish();
}

fn bench_preview(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview");
    group.sample_size(10);

    let renderer = PreviewRenderer::new();
    let content = common::generate_markdown_content(100);
    group.bench_function("render_html", |b| {
        b.iter(|| std::hint::black_box(renderer.render(std::hint::black_box(&content))));
    });
    group.bench_function("plain_blocks", |b| {
        b.iter(|| std::hint::black_box(renderer.blocks(std::hint::black_box(&content))));
    });

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_preview);
criterion_main!(benches);
