//! Benchmarks for flight-log parsing and schedule reconciliation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sbh_check::models::*;
use sbh_check::parser::LogParser;
use sbh_check::reconcile::reconcile;

const AIRPORTS: [&str; 8] = ["DUB", "STN", "BCN", "AGP", "BGY", "CRL", "KRK", "LIS"];

fn route(i: usize) -> (&'static str, &'static str) {
    let from = AIRPORTS[i % AIRPORTS.len()];
    let to = AIRPORTS[(i + 1) % AIRPORTS.len()];
    (from, to)
}

fn date(i: usize) -> String {
    format!("2023-{:02}-{:02}", (i / 28) % 12 + 1, i % 28 + 1)
}

/// Flight log with `rows` data lines.
fn generate_log(rows: usize) -> String {
    let mut lines = vec!["DATE,DEPARTURE_AIRPORT,ARRIVAL_AIRPORT,FLIGHT".to_string()];
    for i in 0..rows {
        let (from, to) = route(i);
        lines.push(format!("{},{},{},FR{}", date(i), from, to, 100 + i));
    }
    lines.join("\n")
}

/// Schedule covering every log row plus as many unrelated entries.
fn generate_schedule(rows: usize) -> Vec<ScheduleRecord> {
    let mut schedule = Vec::with_capacity(rows * 2);
    for i in 0..rows {
        let (from, to) = route(i);
        for (departure, arrival) in [(from, to), (to, from)] {
            schedule.push(ScheduleRecord {
                departure: ScheduleEndpoint {
                    airport: AirportRef {
                        iata: Some(departure.to_string()),
                    },
                    date: Some(ScheduleDate {
                        utc: Some(date(i)),
                    }),
                },
                arrival: ScheduleEndpoint {
                    airport: AirportRef {
                        iata: Some(arrival.to_string()),
                    },
                    date: None,
                },
                elapsed_time: 60 + (i % 120) as u32,
            });
        }
    }
    schedule
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_log");
    let parser = LogParser::default();

    for size in [10, 100, 1000].iter() {
        let log = generate_log(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| parser.parse_and_derive(black_box(&log)))
        });
    }

    group.finish();
}

fn benchmark_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let parser = LogParser::default();

    for size in [10, 100, 1000].iter() {
        let records = parser.parse_log(&generate_log(*size)).unwrap();
        let schedule = generate_schedule(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| reconcile(black_box(&records), black_box(&schedule)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parse, benchmark_reconcile);
criterion_main!(benches);
