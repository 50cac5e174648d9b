//! Typed access to event log columns.
//!
//! Lookups go through the Arrow schema by name; a missing name surfaces as
//! [`Error::MissingColumn`] and a wrong physical type as
//! [`Error::IncompatibleColumn`]. Nothing is validated up front.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, RecordBatch, StringArray};
use arrow::datatypes::{
    DataType, Field, FieldRef, Schema, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType,
};
use tf_common::{ColumnBindings, Error, Result};

/// Look up a column by name.
pub fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch.column_by_name(name).ok_or_else(|| Error::MissingColumn {
        column: name.to_string(),
    })
}

fn incompatible(name: &str, expected: &str, actual: &DataType) -> Error {
    Error::IncompatibleColumn {
        column: name.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

/// Look up a `Utf8` column.
pub fn utf8_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let col = column(batch, name)?;
    col.as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| incompatible(name, "Utf8", col.data_type()))
}

/// Look up a `Float64` column.
pub fn float64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    let col = column(batch, name)?;
    col.as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| incompatible(name, "Float64", col.data_type()))
}

/// Read a timestamp column of any unit as microseconds since the Unix epoch.
///
/// Nanosecond values are floored to the enclosing microsecond. Nulls are
/// rejected with the offending row.
pub fn timestamp_micros(batch: &RecordBatch, name: &str) -> Result<Vec<i64>> {
    let col = column(batch, name)?;
    let unit = match col.data_type() {
        DataType::Timestamp(unit, _) => *unit,
        other => return Err(incompatible(name, "Timestamp", other)),
    };

    let raw: Vec<Option<i64>> = match unit {
        TimeUnit::Second => col.as_primitive::<TimestampSecondType>().iter().collect(),
        TimeUnit::Millisecond => col
            .as_primitive::<TimestampMillisecondType>()
            .iter()
            .collect(),
        TimeUnit::Microsecond => col
            .as_primitive::<TimestampMicrosecondType>()
            .iter()
            .collect(),
        TimeUnit::Nanosecond => col
            .as_primitive::<TimestampNanosecondType>()
            .iter()
            .collect(),
    };

    raw.into_iter()
        .enumerate()
        .map(|(row, value)| {
            let value = value.ok_or_else(|| Error::NullValue {
                column: name.to_string(),
                row,
            })?;
            let micros = match unit {
                TimeUnit::Second => value.checked_mul(1_000_000),
                TimeUnit::Millisecond => value.checked_mul(1_000),
                TimeUnit::Microsecond => Some(value),
                TimeUnit::Nanosecond => Some(value.div_euclid(1_000)),
            };
            micros.ok_or_else(|| Error::TimestampOutOfRange {
                column: name.to_string(),
                micros: value,
            })
        })
        .collect()
}

/// Case identifiers and instants of every event, in table order.
#[derive(Debug, Clone)]
pub struct CaseTimes<'a> {
    pub case_ids: Vec<&'a str>,
    /// Start instant per event (µs).
    pub start_us: Vec<i64>,
    /// Completion instant per event (µs).
    pub complete_us: Vec<i64>,
}

impl<'a> CaseTimes<'a> {
    pub fn from_batch(batch: &'a RecordBatch, bindings: &ColumnBindings) -> Result<Self> {
        let cases = utf8_column(batch, &bindings.case_id)?;
        let case_ids = cases
            .iter()
            .enumerate()
            .map(|(row, id)| {
                id.ok_or_else(|| Error::NullValue {
                    column: bindings.case_id.clone(),
                    row,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let complete_us = timestamp_micros(batch, &bindings.timestamp)?;
        let start_column = bindings.start_timestamp_column();
        let start_us = if start_column == bindings.timestamp {
            complete_us.clone()
        } else {
            timestamp_micros(batch, start_column)?
        };

        Ok(CaseTimes {
            case_ids,
            start_us,
            complete_us,
        })
    }

    pub fn len(&self) -> usize {
        self.case_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.case_ids.is_empty()
    }
}

/// All event columns needed for bucket statistics.
#[derive(Debug, Clone)]
pub struct EventColumns<'a> {
    pub times: CaseTimes<'a>,
    pub activities: Vec<Option<&'a str>>,
    pub resources: Vec<Option<&'a str>>,
}

impl<'a> EventColumns<'a> {
    pub fn from_batch(batch: &'a RecordBatch, bindings: &ColumnBindings) -> Result<Self> {
        let times = CaseTimes::from_batch(batch, bindings)?;
        let activities = utf8_column(batch, &bindings.activity)?.iter().collect();
        let resources = utf8_column(batch, &bindings.resource)?.iter().collect();
        Ok(EventColumns {
            times,
            activities,
            resources,
        })
    }
}

/// Return a batch with the given columns set.
///
/// A column whose name already exists is replaced in place; new names are
/// appended after the existing columns in the given order.
pub fn replace_or_append(
    batch: &RecordBatch,
    columns: Vec<(String, ArrayRef)>,
) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    let mut arrays: Vec<ArrayRef> = batch.columns().to_vec();

    for (name, array) in columns {
        let field = Arc::new(Field::new(&name, array.data_type().clone(), true));
        match schema.index_of(&name) {
            Ok(idx) => {
                fields[idx] = field;
                arrays[idx] = array;
            }
            Err(_) => {
                fields.push(field);
                arrays.push(array);
            }
        }
    }

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    Ok(RecordBatch::try_new(Arc::new(schema), arrays)?)
}
