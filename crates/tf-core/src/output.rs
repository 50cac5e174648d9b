//! Final feature table assembly.

use tf_table::{FeatureRow, FeatureTable};

use crate::buckets::BucketStats;

/// Turn bucket statistics into feature rows.
///
/// A missing mean becomes `0.0`; the distinction between "no defined value"
/// and a true zero is not preserved in the output.
pub fn assemble(buckets: Vec<BucketStats>) -> FeatureTable {
    FeatureTable::new(
        buckets
            .into_iter()
            .map(|b| FeatureRow {
                timestamp: b.start,
                unique_resources: b.unique_resources,
                unique_cases: b.unique_cases,
                unique_activities: b.unique_activities,
                num_events: b.num_events,
                average_arrival_rate: b.average_arrival_rate.unwrap_or(0.0),
                average_finish_rate: b.average_finish_rate.unwrap_or(0.0),
                average_waiting_time: b.average_waiting_time.unwrap_or(0.0),
                average_sojourn_time: b.average_sojourn_time.unwrap_or(0.0),
                average_service_time: b.average_service_time.unwrap_or(0.0),
            })
            .collect(),
    )
}
