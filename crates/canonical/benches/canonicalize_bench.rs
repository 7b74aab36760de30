use canonical::{normalize, strip_comments, CanonicalizeConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_normalize(c: &mut Criterion) {
    let config = CanonicalizeConfig::default();
    let mut group = c.benchmark_group("normalize");

    for size in [64, 512, 4096, 32768].iter() {
        let unit = "let total = price * qty; // line total\n";
        let text = unit.repeat(*size / unit.len() + 1);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("bytes_{size}"), |b| {
            b.iter(|| normalize(black_box(&text), black_box("javascript"), black_box(&config)))
        });
        group.bench_function(format!("strip_comments_{size}"), |b| {
            b.iter(|| strip_comments(black_box(&text), black_box("javascript")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
