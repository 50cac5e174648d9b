//! Performance spectrum dispatch.
//!
//! The spectrum of an ordered activity list is a set of timestamp vectors, one
//! per occurrence of the activities in sequence. Matching is done by pluggable
//! [`SpectrumStrategy`] implementations; this module validates arguments, picks
//! a strategy for the input representation and shapes the result.
//!
//! Selection order when no variant is named:
//! 1. table strategies, for tabular input they report support for
//! 2. log strategies, converting tabular input to an [`EventLog`] once

pub mod log;

pub use log::{Event, EventLog, Trace};

use arrow::array::RecordBatch;
use serde::{Deserialize, Serialize};
use tf_common::config::params::{DEFAULT_ACTIVITY_KEY, DEFAULT_CASE_ID_KEY, DEFAULT_TIMESTAMP_KEY};
use tf_common::{Error, Result};

use crate::logging::{event_names, Stage};

/// Default maximum number of spectrum points.
pub const DEFAULT_SAMPLE_SIZE: usize = 10_000;

/// Parameters handed to every strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumParams {
    pub activity_key: String,
    pub timestamp_key: String,
    pub case_id_key: String,
    /// Maximum number of points a strategy should return.
    pub sample_size: usize,
}

impl Default for SpectrumParams {
    fn default() -> Self {
        SpectrumParams {
            activity_key: DEFAULT_ACTIVITY_KEY.to_string(),
            timestamp_key: DEFAULT_TIMESTAMP_KEY.to_string(),
            case_id_key: DEFAULT_CASE_ID_KEY.to_string(),
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

/// Input representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Table,
    Log,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Table => write!(f, "table"),
            InputKind::Log => write!(f, "log"),
        }
    }
}

/// Event data in either supported representation.
#[derive(Debug, Clone, Copy)]
pub enum SpectrumInput<'a> {
    Table(&'a RecordBatch),
    Log(&'a EventLog),
}

impl SpectrumInput<'_> {
    pub fn kind(&self) -> InputKind {
        match self {
            SpectrumInput::Table(_) => InputKind::Table,
            SpectrumInput::Log(_) => InputKind::Log,
        }
    }
}

/// Result of a spectrum computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSpectrum {
    pub list_activities: Vec<String>,
    /// Timestamps in seconds, one vector per matched occurrence.
    pub points: Vec<Vec<f64>>,
}

/// An activity-matching algorithm over one input representation.
pub trait SpectrumStrategy {
    /// Variant name used for explicit selection.
    fn name(&self) -> &str;

    /// Representation this strategy consumes.
    fn input_kind(&self) -> InputKind;

    /// Whether the strategy can run on this input.
    fn supports(&self, input: &SpectrumInput<'_>) -> bool {
        input.kind() == self.input_kind()
    }

    fn points(
        &self,
        input: &SpectrumInput<'_>,
        activities: &[String],
        params: &SpectrumParams,
    ) -> Result<Vec<Vec<f64>>>;
}

/// Registry of strategies and the selection logic over them.
#[derive(Default)]
pub struct SpectrumDispatcher {
    strategies: Vec<Box<dyn SpectrumStrategy>>,
}

impl SpectrumDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a strategy; earlier registrations win ties.
    pub fn register(mut self, strategy: Box<dyn SpectrumStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Compute the performance spectrum.
    ///
    /// Fewer than two activities is rejected before the input is touched. A
    /// named `variant` restricts selection to that strategy.
    pub fn apply(
        &self,
        input: SpectrumInput<'_>,
        activities: &[String],
        variant: Option<&str>,
        params: &SpectrumParams,
    ) -> Result<PerformanceSpectrum> {
        if activities.len() < 2 {
            return Err(Error::TooFewActivities {
                supplied: activities.len(),
            });
        }

        let candidates: Vec<&dyn SpectrumStrategy> = self
            .strategies
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| variant.is_none_or(|name| s.name() == name))
            .collect();

        if let SpectrumInput::Table(_) = input {
            for strategy in candidates.iter().filter(|s| s.input_kind() == InputKind::Table) {
                if strategy.supports(&input) {
                    return self.run(*strategy, &input, activities, params);
                }
            }
        }

        let log_strategies: Vec<&dyn SpectrumStrategy> = candidates
            .into_iter()
            .filter(|s| s.input_kind() == InputKind::Log)
            .collect();
        if log_strategies.is_empty() {
            return Err(Error::NoSpectrumStrategy);
        }

        let converted;
        let log_input = match input {
            SpectrumInput::Log(log) => SpectrumInput::Log(log),
            SpectrumInput::Table(batch) => {
                converted = EventLog::from_batch(batch, params)?;
                SpectrumInput::Log(&converted)
            }
        };
        for strategy in log_strategies {
            if strategy.supports(&log_input) {
                return self.run(strategy, &log_input, activities, params);
            }
        }
        Err(Error::NoSpectrumStrategy)
    }

    fn run(
        &self,
        strategy: &dyn SpectrumStrategy,
        input: &SpectrumInput<'_>,
        activities: &[String],
        params: &SpectrumParams,
    ) -> Result<PerformanceSpectrum> {
        let points = strategy.points(input, activities, params)?;
        tracing::info!(
            target: event_names::SPECTRUM_DISPATCHED,
            stage = %Stage::Spectrum,
            strategy = strategy.name(),
            input = %input.kind(),
            points = points.len(),
            "performance spectrum computed"
        );
        Ok(PerformanceSpectrum {
            list_activities: activities.to_vec(),
            points,
        })
    }
}
