//! Observability for Menagerie.
//!
//! - **Logging**: `tracing` events rendered as JSON or pretty text by
//!   `tracing-subscriber`
//! - **Metrics**: request counters and latency histograms via the `metrics`
//!   crate, optionally exported in Prometheus format
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `menagerie_requests_total` | Counter | `operation`, `status` | Total request count |
//! | `menagerie_request_duration_seconds` | Histogram | `operation` | Request latency |
//! | `menagerie_faults_total` | Counter | `operation`, `kind` | Requests ending in a fault |
//! | `menagerie_in_flight_requests` | Gauge | - | Requests being processed |

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use metrics::{init_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
