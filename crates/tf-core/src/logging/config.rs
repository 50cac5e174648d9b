//! Logging configuration.
//!
//! `TF_LOG` holds an `EnvFilter` directive string (`info`, `tf_core=debug`,
//! ...) and `TF_LOG_FORMAT` selects `human` or `jsonl` output.

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Filter directives and output format for the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
            format: LogFormat::Human,
        }
    }
}

impl LogConfig {
    pub fn new(filter: impl Into<String>, format: LogFormat) -> Self {
        LogConfig {
            filter: filter.into(),
            format,
        }
    }

    /// Read `TF_LOG` and `TF_LOG_FORMAT`; unset or unparsable values keep the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = LogConfig::default();
        if let Some(filter) = lookup("TF_LOG").filter(|v| !v.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(format) = lookup("TF_LOG_FORMAT").and_then(|v| v.parse().ok()) {
            config.format = format;
        }
        config
    }
}
