//! Core traits for invalidation

mod backend;
mod metrics;

#[cfg(feature = "tracing")]
mod tracing;

pub use backend::InvalidationBackend;
pub use metrics::{InvalidationMetrics, NoopMetrics};

#[cfg(feature = "metrics")]
pub use metrics::MetricsCrateAdapter;

#[cfg(feature = "tracing")]
pub use self::tracing::TracingMetrics;
