//! Compare sequential vs parallel composition search.
//!
//! Run with: `cargo bench --bench search`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use raidcomp::data::candidate::Candidate;
use raidcomp::data::catalog::RoleCatalog;
use raidcomp::data::quota::RoleQuota;
use raidcomp::optimizer::{search_with, SearchOptions, WeightedScorer};

/// Sign-ups from a typical static night, padded with synthetic alts so the search has some weight.
fn sign_ups(catalog: &RoleCatalog, count: usize) -> Vec<Candidate<String>> {
    const JOBS: [&str; 11] = [
        "GNB,PLD,MCH",
        "DRK,GNB,MNK",
        "WHM,AST,PLD,BRD",
        "BLM,SMN,RDM,SCH",
        "BRD,WHM,RDM",
        "MNK,SAM,GNB",
        "DNC",
        "PLD,WAR,MCH,DNC",
        "BLM,SAM",
        "WHM,SMN",
        "DRG,NIN",
    ];
    (0..count)
        .filter_map(|i| Candidate::parse(format!("player_{i}"), JOBS[i % JOBS.len()], catalog).ok())
        .collect()
}

fn bench_search_sequential_vs_parallel(c: &mut Criterion) {
    let catalog = RoleCatalog::ffxiv();
    let quota = RoleQuota::from_counts(vec![2, 2, 4]);
    let pool = sign_ups(&catalog, 14);
    let scorer = WeightedScorer::default();

    let mut group = c.benchmark_group("search");
    group.sample_size(20);
    group.measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("sequential", |b| {
        b.iter(|| {
            black_box(search_with(
                &pool,
                &quota,
                &catalog,
                &scorer,
                &SearchOptions::default(),
            ))
        });
    });

    group.bench_function("parallel", |b| {
        let options = SearchOptions {
            parallel: true,
            ..SearchOptions::default()
        };
        b.iter(|| black_box(search_with(&pool, &quota, &catalog, &scorer, &options)));
    });

    group.bench_function("sequential_unpruned", |b| {
        let options = SearchOptions {
            prune: false,
            ..SearchOptions::default()
        };
        b.iter(|| black_box(search_with(&pool, &quota, &catalog, &scorer, &options)));
    });

    group.finish();
}

criterion_group!(benches, bench_search_sequential_vs_parallel);
criterion_main!(benches);
