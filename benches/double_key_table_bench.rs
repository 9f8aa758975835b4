use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use double_key_table::{DoubleKeyTable, LinearProbeTable};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

// 100 primary keys x 100 secondary keys.
fn pairs(seed: u64) -> Vec<(String, String)> {
    let outer: Vec<_> = lcg(seed).take(100).map(key).collect();
    let inner: Vec<_> = lcg(seed ^ 0x5555).take(100).map(key).collect();
    outer
        .iter()
        .flat_map(|a| inner.iter().map(move |b| (a.clone(), b.clone())))
        .collect()
}

fn filled(seed: u64) -> (DoubleKeyTable<String, String, u64>, Vec<(String, String)>) {
    let mut t = DoubleKeyTable::new();
    let ps = pairs(seed);
    for (i, (a, b)) in ps.iter().enumerate() {
        t.set(a.clone(), b.clone(), i as u64).unwrap();
    }
    (t, ps)
}

fn bench_set(c: &mut Criterion) {
    c.bench_function("double_key_set_10k", |b| {
        let ps = pairs(1);
        b.iter_batched(
            || (DoubleKeyTable::<String, String, u64>::new(), ps.clone()),
            |(mut t, ps)| {
                for (i, (a, b)) in ps.into_iter().enumerate() {
                    t.set(a, b, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("double_key_get_hit", |b| {
        let (t, ps) = filled(7);
        let mut it = ps.iter().cycle();
        b.iter(|| {
            let (a, k) = it.next().unwrap();
            black_box(t.get(a.as_str(), k.as_str()).unwrap());
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("double_key_get_miss", |b| {
        let (t, ps) = filled(11);
        let mut it = ps.iter().cycle();
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // real primary key, secondary key unlikely to be present
            let (a, _) = it.next().unwrap();
            let k = key(miss.next().unwrap());
            black_box(t.get(a.as_str(), k.as_str()).is_err());
        })
    });
}

fn bench_delete_reinsert(c: &mut Criterion) {
    c.bench_function("double_key_delete_reinsert", |b| {
        let (mut t, ps) = filled(13);
        let mut it = ps.iter().cycle();
        b.iter(|| {
            let (a, k) = it.next().unwrap();
            let v = t.delete(a.as_str(), k.as_str()).unwrap();
            t.set(a.clone(), k.clone(), v).unwrap();
        })
    });
}

fn bench_single_level_insert(c: &mut Criterion) {
    c.bench_function("linear_probe_insert_10k", |b| {
        let keys: Vec<_> = lcg(3).take(10_000).map(key).collect();
        b.iter_batched(
            || (LinearProbeTable::<String, u64>::new(), keys.clone()),
            |(mut t, keys)| {
                for (i, k) in keys.into_iter().enumerate() {
                    t.insert(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_set, bench_get_hit, bench_get_miss, bench_delete_reinsert, bench_single_level_insert
}
criterion_main!(benches);
