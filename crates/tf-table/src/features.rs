//! Feature table: one row of statistics per non-empty time bucket.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, RecordBatch, TimestampMicrosecondArray, UInt64Array,
};
use arrow::datatypes::{DataType, Float64Type, TimeUnit, TimestampMicrosecondType, UInt64Type};
use arrow::error::ArrowError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_common::{Error, Result};

use crate::columns::column;
use crate::schema::{features_schema, FeatureColumn};

/// Statistics of one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Start of the bucket window.
    pub timestamp: DateTime<Utc>,
    pub unique_resources: u64,
    pub unique_cases: u64,
    pub unique_activities: u64,
    pub num_events: u64,
    pub average_arrival_rate: f64,
    pub average_finish_rate: f64,
    pub average_waiting_time: f64,
    pub average_sojourn_time: f64,
    pub average_service_time: f64,
}

/// Chronologically ordered feature rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureRow>) -> Self {
        FeatureTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureRow> {
        self.rows.iter()
    }

    /// Sum of `num_events` over all rows.
    pub fn total_events(&self) -> u64 {
        self.rows.iter().map(|r| r.num_events).sum()
    }

    /// Materialize as an Arrow batch with [`features_schema`].
    pub fn to_record_batch(&self) -> std::result::Result<RecordBatch, ArrowError> {
        let timestamps = TimestampMicrosecondArray::from(
            self.rows
                .iter()
                .map(|r| r.timestamp.timestamp_micros())
                .collect::<Vec<_>>(),
        )
        .with_timezone("UTC");

        let counts = |f: fn(&FeatureRow) -> u64| -> ArrayRef {
            Arc::new(UInt64Array::from(self.rows.iter().map(f).collect::<Vec<_>>()))
        };
        let floats = |f: fn(&FeatureRow) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from(self.rows.iter().map(f).collect::<Vec<_>>()))
        };

        RecordBatch::try_new(
            Arc::new(features_schema()),
            vec![
                Arc::new(timestamps),
                counts(|r| r.unique_resources),
                counts(|r| r.unique_cases),
                counts(|r| r.unique_activities),
                counts(|r| r.num_events),
                floats(|r| r.average_arrival_rate),
                floats(|r| r.average_finish_rate),
                floats(|r| r.average_waiting_time),
                floats(|r| r.average_sojourn_time),
                floats(|r| r.average_service_time),
            ],
        )
    }

    /// Rebuild rows from a batch produced by [`FeatureTable::to_record_batch`].
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let ts_name = FeatureColumn::Timestamp.as_str();
        let ts = column(batch, ts_name)?;
        if !matches!(ts.data_type(), DataType::Timestamp(TimeUnit::Microsecond, _)) {
            return Err(Error::IncompatibleColumn {
                column: ts_name.to_string(),
                expected: "Timestamp(Microsecond)".to_string(),
                actual: ts.data_type().to_string(),
            });
        }
        let ts = ts.as_primitive::<TimestampMicrosecondType>();

        let count = |c: FeatureColumn| -> Result<Vec<u64>> {
            let col = column(batch, c.as_str())?;
            if col.data_type() != &DataType::UInt64 {
                return Err(Error::IncompatibleColumn {
                    column: c.to_string(),
                    expected: "UInt64".to_string(),
                    actual: col.data_type().to_string(),
                });
            }
            Ok(col.as_primitive::<UInt64Type>().values().to_vec())
        };
        let float = |c: FeatureColumn| -> Result<Vec<f64>> {
            let col = column(batch, c.as_str())?;
            if col.data_type() != &DataType::Float64 {
                return Err(Error::IncompatibleColumn {
                    column: c.to_string(),
                    expected: "Float64".to_string(),
                    actual: col.data_type().to_string(),
                });
            }
            Ok(col.as_primitive::<Float64Type>().values().to_vec())
        };

        let unique_resources = count(FeatureColumn::UniqueResources)?;
        let unique_cases = count(FeatureColumn::UniqueCases)?;
        let unique_activities = count(FeatureColumn::UniqueActivities)?;
        let num_events = count(FeatureColumn::NumEvents)?;
        let arrival = float(FeatureColumn::AverageArrivalRate)?;
        let finish = float(FeatureColumn::AverageFinishRate)?;
        let waiting = float(FeatureColumn::AverageWaitingTime)?;
        let sojourn = float(FeatureColumn::AverageSojournTime)?;
        let service = float(FeatureColumn::AverageServiceTime)?;

        let mut rows = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            if ts.is_null(i) {
                return Err(Error::NullValue {
                    column: ts_name.to_string(),
                    row: i,
                });
            }
            let micros = ts.value(i);
            let timestamp =
                DateTime::from_timestamp_micros(micros).ok_or_else(|| {
                    Error::TimestampOutOfRange {
                        column: ts_name.to_string(),
                        micros,
                    }
                })?;
            rows.push(FeatureRow {
                timestamp,
                unique_resources: unique_resources[i],
                unique_cases: unique_cases[i],
                unique_activities: unique_activities[i],
                num_events: num_events[i],
                average_arrival_rate: arrival[i],
                average_finish_rate: finish[i],
                average_waiting_time: waiting[i],
                average_sojourn_time: sojourn[i],
                average_service_time: service[i],
            });
        }

        Ok(FeatureTable { rows })
    }
}

impl<'a> IntoIterator for &'a FeatureTable {
    type Item = &'a FeatureRow;
    type IntoIter = std::slice::Iter<'a, FeatureRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(day: u32, events: u64) -> FeatureRow {
        FeatureRow {
            timestamp: Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap(),
            unique_resources: 1,
            unique_cases: 2,
            unique_activities: 3,
            num_events: events,
            average_arrival_rate: 10.5,
            average_finish_rate: 0.0,
            average_waiting_time: -1.25,
            average_sojourn_time: 60.0,
            average_service_time: 61.25,
        }
    }

    #[test]
    fn record_batch_has_one_row_per_bucket() {
        let table = FeatureTable::new(vec![row(6, 4), row(13, 7)]);
        let batch = table.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 10);
        assert_eq!(table.total_events(), 11);
        assert_eq!(FeatureTable::from_record_batch(&batch).unwrap(), table);
    }

    #[test]
    fn empty_table_builds_empty_batch() {
        let batch = FeatureTable::default().to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert!(FeatureTable::from_record_batch(&batch).unwrap().is_empty());
    }

    #[test]
    fn serializes_to_json_rows() {
        let table = FeatureTable::new(vec![row(6, 4)]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["rows"][0]["num_events"], 4);
        assert_eq!(json["rows"][0]["average_waiting_time"], -1.25);
    }
}
