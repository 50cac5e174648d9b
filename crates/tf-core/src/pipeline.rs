//! End-to-end temporal feature extraction.
//!
//! Stages run in order over one closed table, each appending columns:
//! rates, durations, bucket aggregation, assembly.

use arrow::array::RecordBatch;
use tf_common::{Config, Result, TemporalParams};
use tf_table::FeatureTable;

use crate::buckets::aggregate_buckets;
use crate::durations::insert_service_waiting_time;
use crate::logging::{event_names, generate_run_id, Stage};
use crate::output::assemble;
use crate::rates::insert_arrival_finish_rate;

/// Append the rate and duration columns to an event table.
pub fn annotate(batch: &RecordBatch, params: &TemporalParams) -> Result<RecordBatch> {
    params.validate()?;
    let with_rates = insert_arrival_finish_rate(batch, params)?;
    insert_service_waiting_time(&with_rates, params)
}

/// Compute the temporal feature table of an event table.
pub fn apply(batch: &RecordBatch, params: &TemporalParams) -> Result<FeatureTable> {
    params.validate()?;
    let run_id = generate_run_id();
    tracing::info!(
        target: event_names::RUN_STARTED,
        run_id = %run_id,
        rows = batch.num_rows(),
        width = %params.grouper_freq,
        "temporal feature extraction started"
    );

    let annotated = insert_arrival_finish_rate(batch, params)?;
    stage_finished(&run_id, Stage::Rates, annotated.num_rows());

    let annotated = insert_service_waiting_time(&annotated, params)?;
    stage_finished(&run_id, Stage::Durations, annotated.num_rows());

    let buckets = aggregate_buckets(&annotated, params)?;
    stage_finished(&run_id, Stage::Buckets, buckets.len());

    let table = assemble(buckets);
    stage_finished(&run_id, Stage::Assemble, table.len());

    tracing::info!(
        target: event_names::RUN_FINISHED,
        run_id = %run_id,
        buckets = table.len(),
        events = table.total_events(),
        "temporal feature extraction finished"
    );
    Ok(table)
}

/// [`apply`] with loaded configuration; the config source is logged with the run.
pub fn apply_with_config(batch: &RecordBatch, config: &Config) -> Result<FeatureTable> {
    tracing::debug!(
        resolution = %config.snapshot.resolution,
        params_hash = %config.snapshot.params_hash,
        path = ?config.snapshot.path,
        "using temporal configuration"
    );
    apply(batch, &config.params)
}

fn stage_finished(run_id: &str, stage: Stage, count: usize) {
    tracing::debug!(
        target: event_names::STAGE_FINISHED,
        run_id = %run_id,
        stage = %stage,
        count,
        "stage finished"
    );
}
