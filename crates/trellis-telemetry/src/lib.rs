//! Observability for Trellis.
//!
//! - **Logging**: `tracing-subscriber` setup with JSON or pretty output
//! - **Metrics**: dispatch counters and histograms via the `metrics` facade
//!
//! The router emits `tracing` events and `metrics` samples unconditionally;
//! both are cheap no-ops until the host installs a subscriber or recorder.

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};
pub use metrics::{describe_metrics, record_dispatch, record_route_count, DispatchOutcome};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
