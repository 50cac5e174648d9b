//! Benchmarks for the temporal feature pipeline.
//!
//! Run with: `cargo bench -p tf-core --bench temporal_pipeline`

use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch, StringArray, TimestampMicrosecondArray};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tf_common::{TemporalParams, WindowWidth};
use tf_core::{aggregate_buckets, annotate, apply};

const BASE: i64 = 1_704_067_200_000_000;
const MINUTE: i64 = 60_000_000;

fn synthetic_log(params: &TemporalParams, events: usize) -> RecordBatch {
    let cases = (events / 8).max(1);
    let mut case_ids = Vec::with_capacity(events);
    let mut activities = Vec::with_capacity(events);
    let mut resources = Vec::with_capacity(events);
    let mut starts = Vec::with_capacity(events);
    let mut completes = Vec::with_capacity(events);
    for i in 0..events {
        let case = i % cases;
        let step = (i / cases) as i64;
        let start = BASE + (case as i64 * 37 + step * 90) * MINUTE;
        case_ids.push(format!("case-{case}"));
        activities.push(format!("act-{}", step % 12));
        resources.push((i % 5 != 0).then(|| format!("res-{}", i % 23)));
        starts.push(start);
        completes.push(start + (15 + (i as i64 % 45)) * MINUTE);
    }

    let cols = &params.columns;
    RecordBatch::try_from_iter(vec![
        (cols.case_id.clone(), Arc::new(StringArray::from(case_ids)) as ArrayRef),
        (cols.activity.clone(), Arc::new(StringArray::from(activities)) as ArrayRef),
        (
            cols.start_timestamp_column().to_string(),
            Arc::new(TimestampMicrosecondArray::from(starts)) as ArrayRef,
        ),
        (
            cols.timestamp.clone(),
            Arc::new(TimestampMicrosecondArray::from(completes)) as ArrayRef,
        ),
        (cols.resource.clone(), Arc::new(StringArray::from(resources)) as ArrayRef),
    ])
    .expect("synthetic log")
}

fn bench_pipeline(c: &mut Criterion) {
    let params = TemporalParams::default()
        .with_start_timestamp("start_timestamp")
        .with_grouper_freq(WindowWidth::days(1));

    let mut group = c.benchmark_group("temporal_pipeline");
    for &events in &[1_000usize, 10_000, 100_000] {
        let batch = synthetic_log(&params, events);
        group.throughput(Throughput::Elements(events as u64));

        group.bench_with_input(BenchmarkId::new("apply", events), &batch, |b, batch| {
            b.iter(|| apply(black_box(batch), black_box(&params)).expect("apply"))
        });

        let annotated = annotate(&batch, &params).expect("annotate");
        group.bench_with_input(
            BenchmarkId::new("aggregate_buckets", events),
            &annotated,
            |b, annotated| {
                b.iter(|| {
                    aggregate_buckets(black_box(annotated), black_box(&params)).expect("aggregate")
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
