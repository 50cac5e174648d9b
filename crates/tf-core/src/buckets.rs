//! Time-bucket aggregation.
//!
//! Events are assigned to the window containing their start timestamp, on a
//! grid that begins at the day (week, month) of the earliest start. Per
//! non-empty window the aggregator counts distinct resources, cases and
//! activities, counts events, and averages the five case-level scalars over
//! one representative row per case: the first row of that case, in table
//! order, inside the window.

use std::collections::{BTreeMap, HashSet};

use arrow::array::{Array, Float64Array, RecordBatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_common::{Error, Result, TemporalParams};
use tf_math::MeanAccumulator;
use tf_table::{float64_column, EventColumns};

/// Statistics of one non-empty time bucket before missing means are filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    /// Start of the window.
    pub start: DateTime<Utc>,
    pub unique_resources: u64,
    pub unique_cases: u64,
    pub unique_activities: u64,
    pub num_events: u64,
    pub average_arrival_rate: Option<f64>,
    pub average_finish_rate: Option<f64>,
    pub average_waiting_time: Option<f64>,
    pub average_sojourn_time: Option<f64>,
    pub average_service_time: Option<f64>,
}

#[derive(Default)]
struct Accumulator<'a> {
    resources: HashSet<&'a str>,
    cases: HashSet<&'a str>,
    activities: HashSet<&'a str>,
    num_events: u64,
    representatives: Vec<usize>,
}

impl<'a> Accumulator<'a> {
    fn push(
        &mut self,
        row: usize,
        case: &'a str,
        activity: Option<&'a str>,
        resource: Option<&'a str>,
    ) {
        self.num_events += 1;
        if self.cases.insert(case) {
            self.representatives.push(row);
        }
        if let Some(activity) = activity {
            self.activities.insert(activity);
        }
        if let Some(resource) = resource {
            self.resources.insert(resource);
        }
    }

    fn mean_of(&self, values: &Float64Array) -> Option<f64> {
        let mut acc = MeanAccumulator::new();
        for &row in &self.representatives {
            if values.is_valid(row) {
                acc.push(values.value(row));
            }
        }
        acc.mean()
    }
}

/// Aggregate an annotated event table into per-window statistics.
///
/// Reads the rate and duration columns by their configured names; buckets are
/// returned in chronological order.
pub fn aggregate_buckets(
    batch: &RecordBatch,
    params: &TemporalParams,
) -> Result<Vec<BucketStats>> {
    let events = EventColumns::from_batch(batch, &params.columns)?;
    let derived = &params.derived;
    let arrival = float64_column(batch, &derived.arrival_rate)?;
    let finish = float64_column(batch, &derived.finish_rate)?;
    let waiting = float64_column(batch, &derived.waiting_time)?;
    let sojourn = float64_column(batch, &derived.sojourn_time)?;
    let service = float64_column(batch, &derived.service_time)?;

    let width = &params.grouper_freq;
    let out_of_range = |micros: i64| Error::TimestampOutOfRange {
        column: params.columns.start_timestamp_column().to_string(),
        micros,
    };
    let origin = match events.times.start_us.iter().min() {
        Some(&first) => width.origin(first).ok_or_else(|| out_of_range(first))?,
        None => 0,
    };
    let mut windows: BTreeMap<i64, Accumulator<'_>> = BTreeMap::new();
    for (row, &start) in events.times.start_us.iter().enumerate() {
        let key = width
            .window_start(start, origin)
            .ok_or_else(|| out_of_range(start))?;
        windows.entry(key).or_default().push(
            row,
            events.times.case_ids[row],
            events.activities[row],
            events.resources[row],
        );
    }

    let buckets = windows
        .into_iter()
        .map(|(key, acc)| {
            let start = DateTime::from_timestamp_micros(key).ok_or_else(|| out_of_range(key))?;
            Ok(BucketStats {
                start,
                unique_resources: acc.resources.len() as u64,
                unique_cases: acc.cases.len() as u64,
                unique_activities: acc.activities.len() as u64,
                num_events: acc.num_events,
                average_arrival_rate: acc.mean_of(arrival),
                average_finish_rate: acc.mean_of(finish),
                average_waiting_time: acc.mean_of(waiting),
                average_sojourn_time: acc.mean_of(sojourn),
                average_service_time: acc.mean_of(service),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        rows = batch.num_rows(),
        buckets = buckets.len(),
        width = %width,
        "aggregated time buckets"
    );
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, StringArray, TimestampMicrosecondArray};
    use tf_common::WindowWidth;

    const HOUR: i64 = 3_600_000_000;
    const DAY: i64 = 24 * HOUR;

    fn annotated(
        cases: Vec<&str>,
        starts: Vec<i64>,
        resources: Vec<Option<&str>>,
        arrival: Vec<Option<f64>>,
    ) -> RecordBatch {
        let params = TemporalParams::default();
        let n = cases.len();
        let float = |v: Vec<Option<f64>>| Arc::new(Float64Array::from(v)) as ArrayRef;
        RecordBatch::try_from_iter(vec![
            (
                params.columns.case_id.as_str(),
                Arc::new(StringArray::from(cases)) as ArrayRef,
            ),
            (
                params.columns.activity.as_str(),
                Arc::new(StringArray::from(vec![Some("a"); n])) as ArrayRef,
            ),
            (
                params.columns.timestamp.as_str(),
                Arc::new(TimestampMicrosecondArray::from(starts)) as ArrayRef,
            ),
            (
                params.columns.resource.as_str(),
                Arc::new(StringArray::from(resources)) as ArrayRef,
            ),
            (params.derived.arrival_rate.as_str(), float(arrival)),
            (params.derived.finish_rate.as_str(), float(vec![Some(0.0); n])),
            (params.derived.waiting_time.as_str(), float(vec![Some(0.0); n])),
            (params.derived.sojourn_time.as_str(), float(vec![Some(0.0); n])),
            (params.derived.service_time.as_str(), float(vec![Some(0.0); n])),
        ])
        .unwrap()
    }

    fn hourly() -> TemporalParams {
        TemporalParams::default().with_grouper_freq(WindowWidth::hours(1))
    }

    #[test]
    fn representative_is_first_row_of_case_in_bucket() {
        let batch = annotated(
            vec!["c1", "c1", "c2"],
            vec![0, 10, 20],
            vec![Some("r1"), Some("r1"), Some("r2")],
            vec![Some(4.0), Some(100.0), Some(2.0)],
        );
        let buckets = aggregate_buckets(&batch, &hourly()).unwrap();
        assert_eq!(buckets.len(), 1);
        let b = &buckets[0];
        assert_eq!(b.num_events, 3);
        assert_eq!(b.unique_cases, 2);
        assert_eq!(b.unique_resources, 2);
        assert_eq!(b.unique_activities, 1);
        assert_eq!(b.average_arrival_rate, Some(3.0));
    }

    #[test]
    fn empty_windows_are_skipped_and_order_is_chronological() {
        let batch = annotated(
            vec!["c2", "c1"],
            vec![5 * HOUR + 1, HOUR],
            vec![None, Some("r")],
            vec![Some(1.0), Some(1.0)],
        );
        let buckets = aggregate_buckets(&batch, &hourly()).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].start.timestamp_micros(), HOUR);
        assert_eq!(buckets[1].start.timestamp_micros(), 5 * HOUR);
        assert_eq!(buckets[1].unique_resources, 0);
    }

    #[test]
    fn multi_day_windows_start_at_first_event_day() {
        let batch = annotated(
            vec!["c1", "c2"],
            vec![DAY + 12 * HOUR, 3 * DAY + 12 * HOUR],
            vec![Some("r"), Some("r")],
            vec![Some(0.0), Some(0.0)],
        );
        let params = TemporalParams::default().with_grouper_freq(WindowWidth::days(3));
        let buckets = aggregate_buckets(&batch, &params).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].start.timestamp_micros(), DAY);
        assert_eq!(buckets[0].num_events, 2);
    }

    #[test]
    fn empty_table_has_no_buckets() {
        let batch = annotated(vec![], vec![], vec![], vec![]);
        assert!(aggregate_buckets(&batch, &hourly()).unwrap().is_empty());
    }

    #[test]
    fn null_scalars_make_mean_missing() {
        let batch = annotated(vec!["c1"], vec![0], vec![Some("r")], vec![None]);
        let buckets = aggregate_buckets(&batch, &hourly()).unwrap();
        assert_eq!(buckets[0].average_arrival_rate, None);
        assert_eq!(buckets[0].average_finish_rate, Some(0.0));
    }

    #[test]
    fn missing_derived_column_is_reported() {
        let params = TemporalParams::default();
        let batch = annotated(vec!["c1"], vec![0], vec![Some("r")], vec![Some(0.0)]);
        let schema = batch.schema();
        let idx = schema.index_of(&params.derived.service_time).unwrap();
        let mut batch = batch;
        batch.remove_column(idx);
        match aggregate_buckets(&batch, &params).unwrap_err() {
            Error::MissingColumn { column } => assert_eq!(column, "@@service_time"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
