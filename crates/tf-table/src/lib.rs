//! Temporal features table layer.
//!
//! This crate provides:
//! - Arrow schema definitions for the event log and the feature table
//! - Typed access to event columns through configured bindings
//! - The feature table type and its Arrow conversion

pub mod columns;
pub mod features;
pub mod schema;

pub use columns::{
    column, float64_column, replace_or_append, timestamp_micros, utf8_column, CaseTimes,
    EventColumns,
};
pub use features::{FeatureRow, FeatureTable};
pub use schema::{event_log_schema, features_schema, FeatureColumn};
