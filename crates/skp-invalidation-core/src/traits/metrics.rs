//! Metrics trait for invalidation observability

use std::sync::Arc;
use std::time::Duration;

use crate::StrategyKind;

/// Trait for invalidation metrics/observability
///
/// Implement this to integrate with your metrics system (Prometheus, StatsD, etc.)
pub trait InvalidationMetrics: Send + Sync + 'static {
    /// Record entries removed by a strategy
    fn record_invalidation(&self, strategy: StrategyKind, count: u64);

    /// Record a rule execution and how long it took
    fn record_rule_execution(&self, rule: &str, strategy: StrategyKind, duration: Duration);

    /// Record a completed batch flush
    fn record_flush(&self, count: u64, duration: Duration);

    /// Record a batch flush that failed and was re-queued
    fn record_flush_failure(&self);

    /// Record the size of the pending batch
    fn record_pending(&self, tags: usize, keys: usize);
}

/// No-op metrics implementation (default)
///
/// Zero overhead when metrics are not needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl InvalidationMetrics for NoopMetrics {
    #[inline]
    fn record_invalidation(&self, _strategy: StrategyKind, _count: u64) {}

    #[inline]
    fn record_rule_execution(&self, _rule: &str, _strategy: StrategyKind, _duration: Duration) {}

    #[inline]
    fn record_flush(&self, _count: u64, _duration: Duration) {}

    #[inline]
    fn record_flush_failure(&self) {}

    #[inline]
    fn record_pending(&self, _tags: usize, _keys: usize) {}
}

impl<T: InvalidationMetrics + ?Sized> InvalidationMetrics for Arc<T> {
    fn record_invalidation(&self, strategy: StrategyKind, count: u64) {
        (**self).record_invalidation(strategy, count)
    }

    fn record_rule_execution(&self, rule: &str, strategy: StrategyKind, duration: Duration) {
        (**self).record_rule_execution(rule, strategy, duration)
    }

    fn record_flush(&self, count: u64, duration: Duration) {
        (**self).record_flush(count, duration)
    }

    fn record_flush_failure(&self) {
        (**self).record_flush_failure()
    }

    fn record_pending(&self, tags: usize, keys: usize) {
        (**self).record_pending(tags, keys)
    }
}

/// Metrics adapter using the `metrics` crate
///
/// # Example
/// ```ignore
/// use skp_invalidation_core::MetricsCrateAdapter;
///
/// let metrics = MetricsCrateAdapter::new("skp_invalidation");
/// // Emits: skp_invalidation_invalidated_total, skp_invalidation_flushes_total, etc.
/// ```
#[cfg(feature = "metrics")]
#[derive(Debug, Clone)]
pub struct MetricsCrateAdapter {
    prefix: String,
}

#[cfg(feature = "metrics")]
impl MetricsCrateAdapter {
    /// Create a new adapter with the given metric name prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn metric_name(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }
}

#[cfg(feature = "metrics")]
impl InvalidationMetrics for MetricsCrateAdapter {
    fn record_invalidation(&self, strategy: StrategyKind, count: u64) {
        metrics::counter!(
            self.metric_name("invalidated_total"),
            "strategy" => strategy.as_str()
        )
        .increment(count);
    }

    fn record_rule_execution(&self, rule: &str, strategy: StrategyKind, duration: Duration) {
        metrics::histogram!(
            self.metric_name("rule_duration_seconds"),
            "rule" => rule.to_string(),
            "strategy" => strategy.as_str()
        )
        .record(duration.as_secs_f64());
    }

    fn record_flush(&self, count: u64, duration: Duration) {
        metrics::counter!(self.metric_name("flushes_total")).increment(1);
        metrics::counter!(
            self.metric_name("invalidated_total"),
            "strategy" => StrategyKind::Batched.as_str()
        )
        .increment(count);
        metrics::histogram!(self.metric_name("flush_duration_seconds"))
            .record(duration.as_secs_f64());
    }

    fn record_flush_failure(&self) {
        metrics::counter!(self.metric_name("flush_failures_total")).increment(1);
    }

    fn record_pending(&self, tags: usize, keys: usize) {
        metrics::gauge!(self.metric_name("pending_tags")).set(tags as f64);
        metrics::gauge!(self.metric_name("pending_keys")).set(keys as f64);
    }
}
