//! Case-grouped event log representation.

use std::collections::HashMap;

use arrow::array::{Array, RecordBatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_common::{Error, Result};
use tf_table::{timestamp_micros, utf8_column};

use super::SpectrumParams;

/// One event of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub activity: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Timestamp in fractional seconds since the Unix epoch.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp.timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Events of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub case_id: String,
    pub events: Vec<Event>,
}

/// Traces in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub traces: Vec<Trace>,
}

impl EventLog {
    pub fn new(traces: Vec<Trace>) -> Self {
        EventLog { traces }
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trace> {
        self.traces.iter()
    }

    pub fn num_events(&self) -> usize {
        self.traces.iter().map(|t| t.events.len()).sum()
    }

    /// Group the rows of an event table by case.
    ///
    /// Traces keep the order in which cases first appear; events keep table
    /// order inside each trace.
    pub fn from_batch(batch: &RecordBatch, params: &SpectrumParams) -> Result<Self> {
        let cases = utf8_column(batch, &params.case_id_key)?;
        let activities = utf8_column(batch, &params.activity_key)?;
        let timestamps = timestamp_micros(batch, &params.timestamp_key)?;

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut traces: Vec<Trace> = Vec::new();
        for (row, &micros) in timestamps.iter().enumerate() {
            if cases.is_null(row) {
                return Err(Error::NullValue {
                    column: params.case_id_key.clone(),
                    row,
                });
            }
            let case = cases.value(row);
            let timestamp = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
                Error::TimestampOutOfRange {
                    column: params.timestamp_key.clone(),
                    micros,
                }
            })?;
            let slot = *index.entry(case).or_insert_with(|| {
                traces.push(Trace {
                    case_id: case.to_string(),
                    events: Vec::new(),
                });
                traces.len() - 1
            });
            traces[slot].events.push(Event {
                activity: activities
                    .is_valid(row)
                    .then(|| activities.value(row).to_string()),
                timestamp,
            });
        }

        Ok(EventLog { traces })
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Trace;
    type IntoIter = std::slice::Iter<'a, Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}
