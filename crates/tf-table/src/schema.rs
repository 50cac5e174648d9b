//! Arrow schema definitions.
//!
//! Tables defined:
//! - event log: one row per event, column names taken from [`ColumnBindings`]
//! - features: one row per non-empty time bucket

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use tf_common::ColumnBindings;

/// Columns of the feature table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Timestamp,
    UniqueResources,
    UniqueCases,
    UniqueActivities,
    NumEvents,
    AverageArrivalRate,
    AverageFinishRate,
    AverageWaitingTime,
    AverageSojournTime,
    AverageServiceTime,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; 10] = [
        FeatureColumn::Timestamp,
        FeatureColumn::UniqueResources,
        FeatureColumn::UniqueCases,
        FeatureColumn::UniqueActivities,
        FeatureColumn::NumEvents,
        FeatureColumn::AverageArrivalRate,
        FeatureColumn::AverageFinishRate,
        FeatureColumn::AverageWaitingTime,
        FeatureColumn::AverageSojournTime,
        FeatureColumn::AverageServiceTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureColumn::Timestamp => "timestamp",
            FeatureColumn::UniqueResources => "unique_resources",
            FeatureColumn::UniqueCases => "unique_cases",
            FeatureColumn::UniqueActivities => "unique_activities",
            FeatureColumn::NumEvents => "num_events",
            FeatureColumn::AverageArrivalRate => "average_arrival_rate",
            FeatureColumn::AverageFinishRate => "average_finish_rate",
            FeatureColumn::AverageWaitingTime => "average_waiting_time",
            FeatureColumn::AverageSojournTime => "average_sojourn_time",
            FeatureColumn::AverageServiceTime => "average_service_time",
        }
    }

    fn data_type(&self) -> DataType {
        match self {
            FeatureColumn::Timestamp => utc_micros(),
            FeatureColumn::UniqueResources
            | FeatureColumn::UniqueCases
            | FeatureColumn::UniqueActivities
            | FeatureColumn::NumEvents => DataType::UInt64,
            _ => DataType::Float64,
        }
    }
}

impl std::fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Timestamp type used for every instant written by this workspace.
pub fn utc_micros() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
}

/// Canonical event log schema for the given bindings.
///
/// The start timestamp column is only present when it is bound to a column
/// distinct from the completion timestamp.
pub fn event_log_schema(bindings: &ColumnBindings) -> Schema {
    let mut fields = vec![
        Field::new(&bindings.case_id, DataType::Utf8, false),
        Field::new(&bindings.activity, DataType::Utf8, true),
        Field::new(&bindings.timestamp, utc_micros(), false),
    ];
    if bindings.start_timestamp_column() != bindings.timestamp {
        fields.push(Field::new(
            bindings.start_timestamp_column(),
            utc_micros(),
            false,
        ));
    }
    fields.push(Field::new(&bindings.resource, DataType::Utf8, true));
    Schema::new(fields)
}

/// Schema of the feature table. No column is nullable: missing cells are
/// written as zero.
pub fn features_schema() -> Schema {
    Schema::new(
        FeatureColumn::ALL
            .iter()
            .map(|c| Field::new(c.as_str(), c.data_type(), false))
            .collect::<Vec<_>>(),
    )
}
