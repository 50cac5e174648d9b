//! Temporal features common types and errors.
//!
//! This crate provides foundational types shared across tf-core modules:
//! - Column bindings for reading a tabular event log
//! - Window widths (grouping frequencies) for time buckets
//! - Common error types
//! - Configuration loading and validation

pub mod config;
pub mod error;
pub mod frequency;

pub use config::{
    ColumnBindings, Config, ConfigPaths, ConfigResolver, ConfigSnapshot, DerivedColumns,
    TemporalParams,
};
pub use error::{Error, ErrorCategory, Result};
pub use frequency::{WindowUnit, WindowWidth};

/// Version of the feature table layout produced by tf-core.
pub const FEATURES_SCHEMA_VERSION: &str = "1.0.0";
