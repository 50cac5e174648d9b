//! Arrival and finish rates.
//!
//! A case arrives at the minimum start timestamp of its events and finishes at
//! the maximum completion timestamp. Cases are ranked by `(instant, case_id)`
//! and each case receives the gap to its predecessor in the ranking, in
//! seconds. The first-ranked case receives 0.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch};
use tf_common::{Result, TemporalParams};
use tf_table::{replace_or_append, CaseTimes};

use crate::cases::{case_spans, micros_to_secs};

/// Append the arrival and finish rate columns.
///
/// Existing columns with the configured names are replaced.
pub fn insert_arrival_finish_rate(
    batch: &RecordBatch,
    params: &TemporalParams,
) -> Result<RecordBatch> {
    let times = CaseTimes::from_batch(batch, &params.columns)?;
    let spans = case_spans(&times);

    let arrival = rank_deltas(spans.iter().map(|(&case, span)| (span.first_start, case)));
    let finish = rank_deltas(spans.iter().map(|(&case, span)| (span.last_complete, case)));

    tracing::debug!(
        rows = times.len(),
        cases = spans.len(),
        "annotated arrival and finish rates"
    );

    replace_or_append(
        batch,
        vec![
            (
                params.derived.arrival_rate.clone(),
                broadcast(&times.case_ids, &arrival),
            ),
            (
                params.derived.finish_rate.clone(),
                broadcast(&times.case_ids, &finish),
            ),
        ],
    )
}

/// Gap in seconds between each case and its predecessor in the
/// `(instant, case_id)` ranking.
pub fn rank_deltas<'a>(keys: impl Iterator<Item = (i64, &'a str)>) -> HashMap<&'a str, f64> {
    let mut ranked: Vec<(i64, &'a str)> = keys.collect();
    ranked.sort();

    let mut deltas = HashMap::with_capacity(ranked.len());
    let mut previous: Option<i64> = None;
    for (instant, case) in ranked {
        let delta = match previous {
            Some(prev) => micros_to_secs(instant.saturating_sub(prev)),
            None => 0.0,
        };
        deltas.insert(case, delta);
        previous = Some(instant);
    }
    deltas
}

/// Expand a per-case scalar to one value per event row.
pub(crate) fn broadcast(case_ids: &[&str], values: &HashMap<&str, f64>) -> ArrayRef {
    Arc::new(Float64Array::from(
        case_ids
            .iter()
            .map(|case| values.get(case).copied())
            .collect::<Vec<_>>(),
    ))
}
