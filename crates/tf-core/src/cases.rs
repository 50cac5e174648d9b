//! Per-case spans shared by the rate and duration annotators.

use std::collections::HashMap;

use tf_table::CaseTimes;

/// Earliest start and latest completion of one case (µs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseSpan {
    pub first_start: i64,
    pub last_complete: i64,
}

impl CaseSpan {
    /// `last_complete − first_start` in seconds.
    pub fn sojourn_secs(&self) -> f64 {
        micros_to_secs(self.last_complete.saturating_sub(self.first_start))
    }
}

/// Collect the span of every case in one pass over the table.
pub fn case_spans<'a>(times: &CaseTimes<'a>) -> HashMap<&'a str, CaseSpan> {
    let mut spans: HashMap<&'a str, CaseSpan> = HashMap::new();
    for ((&case, &start), &complete) in times
        .case_ids
        .iter()
        .zip(&times.start_us)
        .zip(&times.complete_us)
    {
        spans
            .entry(case)
            .and_modify(|span| {
                span.first_start = span.first_start.min(start);
                span.last_complete = span.last_complete.max(complete);
            })
            .or_insert(CaseSpan {
                first_start: start,
                last_complete: complete,
            });
    }
    spans
}

pub(crate) fn micros_to_secs(micros: i64) -> f64 {
    micros as f64 / 1_000_000.0
}
