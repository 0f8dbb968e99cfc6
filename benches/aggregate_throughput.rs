/// Grouping throughput
///
/// Measures loading, grouping and regrouping of synthetic validation
/// results at increasing row counts.
use benchreport::definition::ReportDefinition;
use benchreport::table::TrialTable;
use benchreport::variants::grouped;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const HEADER: &str = "Document ID,Length document,Depth document,Automaton time (ms),Automaton memory,Automaton output,Validator time (ms),Validator memory,Validator output";

/// Ten trials per document, documents spread over 20 lengths
fn validation_csv(rows: usize) -> String {
    let mut csv = String::with_capacity(rows * 48);
    csv.push_str(HEADER);
    csv.push('\n');
    for row in 0..rows {
        let document = row / 10;
        let length = (document % 20) * 100;
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            document,
            length,
            document % 7,
            row % 97,
            1000 + row % 13,
            row % 3 == 0,
            row % 89,
            900 + row % 11,
            row % 3 == 0
        ));
    }
    csv
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for rows in [1_000, 10_000, 100_000] {
        let csv = validation_csv(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &csv, |b, csv| {
            b.iter(|| TrialTable::from_reader(black_box(csv.as_bytes()), "bench.csv"));
        });
    }

    group.finish();
}

fn bench_validation_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation_report");
    let definition = match ReportDefinition::preset("validation") {
        Ok(definition) => definition,
        Err(e) => panic!("validation preset: {e:#}"),
    };

    for rows in [1_000, 10_000, 100_000] {
        let table = match TrialTable::from_reader(validation_csv(rows).as_bytes(), "bench.csv") {
            Ok(table) => table,
            Err(e) => panic!("synthetic input: {e}"),
        };
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| grouped::build(black_box(&definition), black_box(table), None));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_validation_report);
criterion_main!(benches);
