//! Temporal process features.
//!
//! Turns a tabular event log into one row of aggregate statistics per time
//! window:
//! - Arrival and finish rates per case ([`rates`])
//! - Service, sojourn and waiting times per case ([`durations`])
//! - Per-window counts and averages ([`buckets`], [`output`])
//! - Performance spectrum dispatch ([`spectrum`])
//!
//! [`apply`] runs the whole pipeline.

pub mod buckets;
pub mod cases;
pub mod durations;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod rates;
pub mod spectrum;

pub use buckets::{aggregate_buckets, BucketStats};
pub use durations::insert_service_waiting_time;
pub use output::assemble;
pub use pipeline::{annotate, apply, apply_with_config};
pub use rates::insert_arrival_finish_rate;
pub use spectrum::{
    EventLog, InputKind, PerformanceSpectrum, SpectrumDispatcher, SpectrumInput, SpectrumParams,
    SpectrumStrategy,
};

pub use tf_common::{Error, Result, TemporalParams, WindowWidth};
pub use tf_table::{FeatureRow, FeatureTable};
