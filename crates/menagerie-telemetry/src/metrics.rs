//! Request metrics.
//!
//! Recording functions go through the `metrics` facade and are no-ops until a
//! recorder is installed. [`init_metrics`] installs the Prometheus exporter,
//! which serves the text format over HTTP on its own listener.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Default Prometheus listener address.
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:9090";

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether to install the exporter.
    pub enabled: bool,

    /// Address the exporter listens on.
    pub addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: DEFAULT_METRICS_ADDR.to_string(),
        }
    }
}

/// Installs the Prometheus exporter.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the address is invalid or a recorder is already
/// installed.
///
/// # Example
///
/// ```rust,no_run
/// use menagerie_telemetry::{init_metrics, MetricsConfig};
///
/// # async fn run() -> menagerie_telemetry::TelemetryResult<()> {
/// init_metrics(&MetricsConfig {
///     enabled: true,
///     addr: "127.0.0.1:9090".to_string(),
/// })?;
/// # Ok(())
/// # }
/// ```
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    describe_metrics();
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

fn describe_metrics() {
    describe_counter!("menagerie_requests_total", "Total number of HTTP requests processed");
    describe_histogram!(
        "menagerie_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!("menagerie_faults_total", "Requests that ended in a fault, by kind");
    describe_gauge!(
        "menagerie_in_flight_requests",
        "Number of HTTP requests currently being processed"
    );
}

/// Records a completed request.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use menagerie_telemetry::metrics::record_request;
///
/// record_request("getBooks", 200, Duration::from_millis(12));
/// ```
pub fn record_request(operation: &str, status_code: u16, duration: Duration) {
    counter!(
        "menagerie_requests_total",
        "operation" => operation.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        "menagerie_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a request that ended in a fault.
///
/// # Example
///
/// ```rust
/// use menagerie_telemetry::metrics::record_fault;
///
/// record_fault("getPetById", "response_shape");
/// ```
pub fn record_fault(operation: &str, kind: &'static str) {
    counter!(
        "menagerie_faults_total",
        "operation" => operation.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// Tracks one in-flight request for as long as it lives.
///
/// # Example
///
/// ```rust
/// use menagerie_telemetry::metrics::InFlightGuard;
///
/// let guard = InFlightGuard::new();
/// // ... handle the request ...
/// drop(guard);
/// ```
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!("menagerie_in_flight_requests").increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("menagerie_in_flight_requests").decrement(1.0);
    }
}
