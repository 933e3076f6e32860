//! # State Export Benchmarks
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | qc-04 State Management | begin_block + commit | < 1ms |
//! | qc-04 State Management | load_at_height | < 10µs |
//! | qc-18 Genesis Export | export at height | < 5ms |
//! | qc-18 Genesis Export | zero-height export | < 5ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qc_04_state_management::test_utils::{block_header, ReferenceChain};
use qc_04_state_management::{standard_registry, VersionStore};
use qc_18_genesis_export::{CancelSignal, ExportEngine, ExportRequest, ServerContext, StoreAppFactory};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// QC-04: State Management Benchmarks
// ============================================================================

fn bench_block_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-04-block-lifecycle");
    group.measurement_time(Duration::from_secs(10));

    let mut chain = ReferenceChain::new();
    group.bench_function("begin_block_commit", |b| {
        b.iter(|| {
            let next = chain.machine.last_height() + 1;
            chain.machine.begin_block(block_header(next)).unwrap();
            black_box(chain.machine.commit().unwrap())
        })
    });

    group.finish();
}

fn bench_versioned_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-04-versioned-reads");

    for depth in [10u64, 100, 1000] {
        let chain = ReferenceChain::with_blocks(depth);
        let store = chain.store();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("load_at_height", depth), &depth, |b, &depth| {
            b.iter(|| black_box(store.load_at_height(depth / 2 + 1).unwrap()))
        });
    }

    group.finish();
}

// ============================================================================
// QC-18: Genesis Export Benchmarks
// ============================================================================

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-export");

    let chain = ReferenceChain::with_blocks(100);
    let ctx = ServerContext::new("bench-home");
    let cancel = CancelSignal::never();
    let mut engine = ExportEngine::new(StoreAppFactory::new(
        Arc::clone(chain.machine.store()),
        standard_registry(),
    ));

    group.bench_function("export_at_height", |b| {
        let request = ExportRequest::at(50);
        b.iter(|| black_box(engine.export(&ctx, &request, &cancel).unwrap()))
    });

    group.bench_function("export_for_zero_height", |b| {
        let request = ExportRequest::at(50).for_zero_height();
        b.iter(|| black_box(engine.export(&ctx, &request, &cancel).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_block_lifecycle,
    bench_versioned_reads,
    bench_export,
);

criterion_main!(benches);
