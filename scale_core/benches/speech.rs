use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use scale_core::speech::{compose, decode};

// Spread of values across every place-value shape, negatives included
fn sample_values(n: usize, seed: u32) -> Vec<i32> {
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        x
    };
    (0..n)
        .map(|_| (next() % 1_999_999) as i32 - 999_999)
        .collect()
}

pub fn bench_compose(c: &mut Criterion) {
    let mut g = c.benchmark_group("speech");
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p scale_core --bench speech
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    let values = sample_values(10_000, 0xC0FFEE);

    g.bench_function("compose", |b| {
        b.iter(|| {
            for &n in &values {
                let _ = black_box(compose(black_box(n)));
            }
        })
    });

    let composed: Vec<_> = values.iter().filter_map(|&n| compose(n).ok()).collect();
    g.bench_function("decode", |b| {
        b.iter_batched(
            || composed.clone(),
            |all| {
                for tokens in &all {
                    black_box(decode(black_box(tokens)));
                }
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(speech, bench_compose);
criterion_main!(speech);
