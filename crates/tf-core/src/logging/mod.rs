//! Structured logging for temporal feature extraction.
//!
//! Library code only emits `tracing` events; an embedding application calls
//! [`init_logging`] once to install a subscriber, or scopes [`dispatch`] to a
//! block with `tracing::dispatcher::with_default`.
//!
//! # Usage
//!
//! ```ignore
//! use tf_core::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_env());
//! let features = tf_core::apply(&batch, &params)?;
//! ```

pub mod config;

pub use config::{LogConfig, LogFormat};

use tracing::Dispatch;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Pipeline stages, used as the `stage` field of log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Rates,
    Durations,
    Buckets,
    Assemble,
    Spectrum,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Rates => "rates",
            Stage::Durations => "durations",
            Stage::Buckets => "buckets",
            Stage::Assemble => "assemble",
            Stage::Spectrum => "spectrum",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used as log targets.
pub mod event_names {
    pub const RUN_STARTED: &str = "temporal.started";
    pub const STAGE_FINISHED: &str = "temporal.stage_finished";
    pub const RUN_FINISHED: &str = "temporal.finished";
    pub const SPECTRUM_DISPATCHED: &str = "spectrum.dispatched";
}

/// Build a subscriber writing to `writer` in the configured format.
///
/// An unparsable filter falls back to `info`.
pub fn dispatch<W>(config: &LogConfig, writer: W) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Human => {
            Dispatch::new(registry.with(fmt::layer().with_writer(writer).with_ansi(false)))
        }
        LogFormat::Jsonl => Dispatch::new(
            registry.with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(writer),
            ),
        ),
    }
}

/// Install the global subscriber writing to stderr.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(config: &LogConfig) -> bool {
    tracing::dispatcher::set_global_default(dispatch(config, std::io::stderr)).is_ok()
}

/// Generate a unique run ID for one pipeline invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("run-{}", &uuid.simple().to_string()[..12])
}
