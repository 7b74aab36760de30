use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dupguard::{DupGuard, DupGuardConfig};

mod common;
use common::{distinct_lines, looping_lines};

/// Feeds every line through a fresh session; returns whether it stopped.
fn run_session(guard: &DupGuard, lines: &[String]) -> bool {
    let mut session = guard.new_session();
    let mut completion = String::new();
    for line in lines {
        completion.push_str(line);
        completion.push('\n');
        if session.check_duplication(&completion, line, "rust") {
            return true;
        }
    }
    false
}

fn bench_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming_filter");
    let guard = DupGuard::from_config(&DupGuardConfig::default()).expect("valid config");

    for count in [20, 100, 400].iter() {
        let lines = distinct_lines(*count);
        group.throughput(Throughput::Elements(lines.len() as u64));
        group.bench_function(format!("{count}_distinct_lines"), |b| {
            b.iter(|| run_session(&guard, black_box(&lines)))
        });
    }

    let looping = looping_lines(50);
    group.bench_function("looping_until_stop", |b| {
        b.iter(|| run_session(&guard, black_box(&looping)))
    });

    group.finish();
}

criterion_group!(benches, bench_streaming);
criterion_main!(benches);
