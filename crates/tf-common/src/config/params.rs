//! Typed parameters for temporal feature extraction.
//!
//! Every knob has a named, typed, defaulted field. Input column names follow
//! the XES attribute conventions; derived columns use reserved `@@` names so
//! they never collide with attributes of a real log.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frequency::WindowWidth;

/// Default case identifier column.
pub const DEFAULT_CASE_ID_KEY: &str = "case:concept:name";
/// Default completion timestamp column.
pub const DEFAULT_TIMESTAMP_KEY: &str = "time:timestamp";
/// Default activity column.
pub const DEFAULT_ACTIVITY_KEY: &str = "concept:name";
/// Default resource column.
pub const DEFAULT_RESOURCE_KEY: &str = "org:resource";

/// Names of the input columns of the event table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColumnBindings {
    pub case_id: String,
    pub timestamp: String,
    /// Start timestamp column; the completion timestamp is used when unset.
    pub start_timestamp: Option<String>,
    pub activity: String,
    pub resource: String,
}

impl Default for ColumnBindings {
    fn default() -> Self {
        ColumnBindings {
            case_id: DEFAULT_CASE_ID_KEY.to_string(),
            timestamp: DEFAULT_TIMESTAMP_KEY.to_string(),
            start_timestamp: None,
            activity: DEFAULT_ACTIVITY_KEY.to_string(),
            resource: DEFAULT_RESOURCE_KEY.to_string(),
        }
    }
}

impl ColumnBindings {
    /// Column holding the start instant of each event.
    pub fn start_timestamp_column(&self) -> &str {
        self.start_timestamp.as_deref().unwrap_or(&self.timestamp)
    }

    fn names(&self) -> [&str; 5] {
        [
            &self.case_id,
            &self.timestamp,
            self.start_timestamp_column(),
            &self.activity,
            &self.resource,
        ]
    }
}

/// Names of the columns appended by the annotators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DerivedColumns {
    pub arrival_rate: String,
    pub finish_rate: String,
    pub service_time: String,
    pub waiting_time: String,
    pub sojourn_time: String,
    pub diff_start_end: String,
}

impl Default for DerivedColumns {
    fn default() -> Self {
        DerivedColumns {
            arrival_rate: "@@arrival_rate".to_string(),
            finish_rate: "@@finish_rate".to_string(),
            service_time: "@@service_time".to_string(),
            waiting_time: "@@waiting_time".to_string(),
            sojourn_time: "@@sojourn_time".to_string(),
            diff_start_end: "@@diff_start_end".to_string(),
        }
    }
}

impl DerivedColumns {
    fn names(&self) -> [(&'static str, &str); 6] {
        [
            ("arrival_rate", &self.arrival_rate),
            ("finish_rate", &self.finish_rate),
            ("service_time", &self.service_time),
            ("waiting_time", &self.waiting_time),
            ("sojourn_time", &self.sojourn_time),
            ("diff_start_end", &self.diff_start_end),
        ]
    }
}

/// Full parameter set for the temporal feature pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TemporalParams {
    pub columns: ColumnBindings,
    pub derived: DerivedColumns,
    /// Width of each time bucket, as a pandas-style offset alias.
    #[schemars(with = "String")]
    pub grouper_freq: WindowWidth,
}

impl TemporalParams {
    pub fn with_grouper_freq(mut self, width: WindowWidth) -> Self {
        self.grouper_freq = width;
        self
    }

    pub fn with_start_timestamp(mut self, column: impl Into<String>) -> Self {
        self.columns.start_timestamp = Some(column.into());
        self
    }

    /// Check that derived columns are usable.
    ///
    /// Derived names must be non-empty, pairwise distinct, and must not shadow
    /// a bound input column.
    pub fn validate(&self) -> Result<()> {
        let derived = self.derived.names();
        for (i, (field, name)) in derived.iter().enumerate() {
            if name.is_empty() {
                return Err(Error::Config(format!("derived column '{}' has an empty name", field)));
            }
            if let Some((other, _)) = derived[..i].iter().find(|(_, n)| n == name) {
                return Err(Error::Config(format!(
                    "derived columns '{}' and '{}' share the name '{}'",
                    other, field, name
                )));
            }
            if self.columns.names().contains(name) {
                return Err(Error::Config(format!(
                    "derived column '{}' ('{}') collides with an input column",
                    field, name
                )));
            }
        }
        Ok(())
    }
}

/// JSON schema of [`TemporalParams`] for config file tooling.
pub fn params_json_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(TemporalParams)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_xes_conventions() {
        let params = TemporalParams::default();
        assert_eq!(params.columns.case_id, "case:concept:name");
        assert_eq!(params.columns.timestamp, "time:timestamp");
        assert_eq!(params.columns.start_timestamp_column(), "time:timestamp");
        assert_eq!(params.columns.activity, "concept:name");
        assert_eq!(params.columns.resource, "org:resource");
        assert_eq!(params.derived.arrival_rate, "@@arrival_rate");
        assert_eq!(params.grouper_freq, WindowWidth::weeks(1));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn start_timestamp_override() {
        let params = TemporalParams::default().with_start_timestamp("start_timestamp");
        assert_eq!(params.columns.start_timestamp_column(), "start_timestamp");
    }

    #[test]
    fn rejects_duplicate_derived_names() {
        let mut params = TemporalParams::default();
        params.derived.finish_rate = params.derived.arrival_rate.clone();
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("share the name"));
    }

    #[test]
    fn rejects_derived_name_shadowing_input() {
        let mut params = TemporalParams::default();
        params.derived.service_time = "concept:name".to_string();
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_empty_derived_name() {
        let mut params = TemporalParams::default();
        params.derived.diff_start_end.clear();
        assert!(params.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: TemporalParams = serde_json::from_str(
            r#"{"grouper_freq": "D", "columns": {"resource": "who"}}"#,
        )
        .unwrap();
        assert_eq!(params.grouper_freq, WindowWidth::days(1));
        assert_eq!(params.columns.resource, "who");
        assert_eq!(params.columns.case_id, DEFAULT_CASE_ID_KEY);
        assert_eq!(params.derived, DerivedColumns::default());
    }

    #[test]
    fn json_schema_lists_sections() {
        let schema = params_json_schema();
        let text = schema.to_string();
        assert!(text.contains("grouper_freq"));
        assert!(text.contains("columns"));
        assert!(text.contains("derived"));
    }
}
