//! Service, sojourn and waiting times.
//!
//! Per event, `diff_start_end` is the completion minus start instant in whole
//! milliseconds (truncated toward zero). Per case:
//! - service time: sum of the event durations, in seconds
//! - sojourn time: last completion minus first start, in seconds
//! - waiting time: sojourn minus service time; negative when events overlap

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch};
use tf_common::{Result, TemporalParams};
use tf_math::NeumaierSum;
use tf_table::{replace_or_append, CaseTimes};

use crate::cases::case_spans;
use crate::rates::broadcast;

/// Per-case duration scalars, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseDurations {
    pub service: f64,
    pub sojourn: f64,
    pub waiting: f64,
}

/// Append the `diff_start_end`, service, sojourn and waiting time columns.
///
/// Does not read the rate columns. Existing columns with the configured names
/// are replaced.
pub fn insert_service_waiting_time(
    batch: &RecordBatch,
    params: &TemporalParams,
) -> Result<RecordBatch> {
    let times = CaseTimes::from_batch(batch, &params.columns)?;
    let diffs_ms = diff_start_end_ms(&times);
    let durations = case_durations(&times, &diffs_ms);

    let pick = |f: fn(&CaseDurations) -> f64| -> HashMap<&str, f64> {
        durations.iter().map(|(&case, d)| (case, f(d))).collect()
    };
    let service = pick(|d| d.service);
    let sojourn = pick(|d| d.sojourn);
    let waiting = pick(|d| d.waiting);

    tracing::debug!(
        rows = times.len(),
        cases = durations.len(),
        "annotated service, sojourn and waiting times"
    );

    let diffs: ArrayRef = Arc::new(Float64Array::from(diffs_ms));
    replace_or_append(
        batch,
        vec![
            (params.derived.diff_start_end.clone(), diffs),
            (
                params.derived.service_time.clone(),
                broadcast(&times.case_ids, &service),
            ),
            (
                params.derived.sojourn_time.clone(),
                broadcast(&times.case_ids, &sojourn),
            ),
            (
                params.derived.waiting_time.clone(),
                broadcast(&times.case_ids, &waiting),
            ),
        ],
    )
}

/// Event durations in whole milliseconds, truncated toward zero.
pub fn diff_start_end_ms(times: &CaseTimes<'_>) -> Vec<f64> {
    times
        .start_us
        .iter()
        .zip(&times.complete_us)
        .map(|(&start, &complete)| (complete.saturating_sub(start) / 1_000) as f64)
        .collect()
}

/// Service, sojourn and waiting time of every case.
pub fn case_durations<'a>(
    times: &CaseTimes<'a>,
    diffs_ms: &[f64],
) -> HashMap<&'a str, CaseDurations> {
    let mut service_ms: HashMap<&'a str, NeumaierSum> = HashMap::new();
    for (&case, &diff) in times.case_ids.iter().zip(diffs_ms) {
        service_ms.entry(case).or_default().add(diff);
    }

    case_spans(times)
        .into_iter()
        .map(|(case, span)| {
            let service = service_ms
                .get(case)
                .map(|sum| sum.value())
                .unwrap_or(0.0)
                / 1_000.0;
            let sojourn = span.sojourn_secs();
            (
                case,
                CaseDurations {
                    service,
                    sojourn,
                    waiting: sojourn - service,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_truncates_toward_zero() {
        let times = CaseTimes {
            case_ids: vec!["a", "a"],
            start_us: vec![0, 10_000],
            complete_us: vec![1_999, 8_500],
        };
        assert_eq!(diff_start_end_ms(&times), vec![1.0, -1.0]);
    }

    #[test]
    fn overlapping_events_give_negative_waiting() {
        // two parallel 10s events inside a 10s case
        let times = CaseTimes {
            case_ids: vec!["a", "a"],
            start_us: vec![0, 0],
            complete_us: vec![10_000_000, 10_000_000],
        };
        let diffs = diff_start_end_ms(&times);
        let d = case_durations(&times, &diffs)["a"];
        assert_eq!(d.service, 20.0);
        assert_eq!(d.sojourn, 10.0);
        assert_eq!(d.waiting, -10.0);
    }

    #[test]
    fn gaps_between_events_are_waiting() {
        let times = CaseTimes {
            case_ids: vec!["a", "a"],
            start_us: vec![0, 60_000_000],
            complete_us: vec![30_000_000, 90_000_000],
        };
        let diffs = diff_start_end_ms(&times);
        let d = case_durations(&times, &diffs)["a"];
        assert_eq!(d.service, 60.0);
        assert_eq!(d.sojourn, 90.0);
        assert_eq!(d.waiting, 30.0);
    }
}
