//! Dispatch metrics.
//!
//! Recorded through the `metrics` facade. No exporter is installed here; if
//! the host has not installed a recorder the calls are no-ops.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `trellis_dispatch_total` | Counter | `method`, `outcome` | Dispatched requests |
//! | `trellis_dispatch_duration_seconds` | Histogram | `method`, `outcome` | Time spent in the chain |
//! | `trellis_routes` | Gauge | - | Registered `(method, pattern)` pairs |

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::fmt;
use std::time::Duration;

/// Counter of dispatched requests.
pub const DISPATCH_TOTAL: &str = "trellis_dispatch_total";

/// Histogram of dispatch durations.
pub const DISPATCH_DURATION_SECONDS: &str = "trellis_dispatch_duration_seconds";

/// Gauge of registered routes.
pub const ROUTES: &str = "trellis_routes";

/// How a request left the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// A route matched and its chain completed.
    Matched,
    /// No route matched; the not-found chain ran.
    NotFound,
    /// A chain returned an error.
    Error,
}

impl DispatchOutcome {
    /// Label value for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registers descriptions for the dispatch metrics.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Total number of requests dispatched by the router");
    describe_histogram!(
        DISPATCH_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time spent running the matched or not-found chain"
    );
    describe_gauge!(ROUTES, "Number of registered routes");
}

/// Records one dispatched request.
pub fn record_dispatch(method: &str, outcome: DispatchOutcome, duration: Duration) {
    counter!(
        DISPATCH_TOTAL,
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        DISPATCH_DURATION_SECONDS,
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .record(duration.as_secs_f64());
}

/// Sets the registered-route gauge.
#[allow(clippy::cast_precision_loss)]
pub fn record_route_count(count: usize) {
    gauge!(ROUTES).set(count as f64);
}
