//! # Registry Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Issue one aval (in-memory) | < 100μs |
//! | Filtered list over 5k records | < 10ms |
//! | Parse a 1k-row export | < 10ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use aval_registry::{parse_import, AvalFilters, AvalRegistryApi, Estado, Paging};
use aval_tests::{memory_registry, payload};

fn bench_issue(c: &mut Criterion) {
    let mut group = c.benchmark_group("aval-issue");
    group.measurement_time(Duration::from_secs(5));

    let mut registry = memory_registry();
    let p = payload("Ana Pérez", "05/03/2024");
    group.bench_function("create_aval", |b| {
        b.iter(|| black_box(registry.create_aval(&p).unwrap()))
    });

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("aval-list");

    for size in [500usize, 5_000] {
        let mut registry = memory_registry();
        for i in 0..size {
            let name = if i % 3 == 0 { "Ana Pérez" } else { "Luis Gómez" };
            let record = registry.create_aval(&payload(name, "05/03/2024")).unwrap();
            if i % 10 == 0 {
                registry.void_aval(record.id, "benchmark").unwrap();
            }
        }

        let filters = AvalFilters::new().solicitante("ana").estado(Estado::Active);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("filtered_page", size), &size, |b, _| {
            b.iter(|| {
                black_box(
                    registry
                        .list_avales(&filters, Some(Paging::new(50, 0)))
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

fn bench_import_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("aval-import");

    let mut sheet = String::from(
        "Fecha\tCorrelativo\tSolicitante\tCargo\tUnidad\tDirección\tMemorando\tFecha de Solicitud\tResponsable\n",
    );
    for n in 1..=1_000 {
        sheet.push_str(&format!(
            "05/03/2024\tDTI|DSST|AVAL|{n:04}\tSolicitante {n}\tAnalista\tTI\tDSST\tMEM-{n}\t04/03/2024\tLuis\n"
        ));
    }

    group.throughput(Throughput::Elements(1_000));
    group.bench_function("parse_import_1k", |b| {
        b.iter(|| black_box(parse_import(&sheet).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_issue, bench_list, bench_import_parse);
criterion_main!(benches);
