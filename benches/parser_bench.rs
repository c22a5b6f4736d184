/*
This benchmark measures per-line parsing cost for clean lines and for lines that go
through the sanitization fallback, which is the hot path on a noisy link.
*/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use uart_scope::acquisition::parser::process_line;

fn bench_process_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_line");

    let cases = [
        ("clean_whitespace", "1.25 -3.5 42 0.001", None),
        ("clean_csv", "1.25,-3.5,42,0.001", Some(",")),
        ("noisy_csv", "T1=1.25C,T2=-3.5C,#42,x", Some(",")),
    ];

    for (name, line, delim) in cases {
        group.bench_with_input(BenchmarkId::new(name, line.len()), &line, |b, line| {
            b.iter(|| black_box(process_line(black_box(line), delim, 4)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_process_line);
criterion_main!(benches);
