use crate::{InvalidationMetrics, StrategyKind};
use std::time::Duration;
use tracing::{debug, warn};

/// Metrics adapter that logs events via `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingMetrics {
    /// Service name/prefix (optional)
    service_name: Option<String>,
}

impl TracingMetrics {
    /// Create new tracing metrics adapter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with service name prefix
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }
}

impl InvalidationMetrics for TracingMetrics {
    fn record_invalidation(&self, strategy: StrategyKind, count: u64) {
        debug!(
            target: "skp_invalidation",
            event = "invalidation",
            strategy = strategy.as_str(),
            count = count,
            service = ?self.service_name,
            "Entries Invalidated"
        );
    }

    fn record_rule_execution(&self, rule: &str, strategy: StrategyKind, duration: Duration) {
        tracing::trace!(
            target: "skp_invalidation",
            event = "rule_execution",
            rule = %rule,
            strategy = strategy.as_str(),
            duration_ms = duration.as_millis(),
            service = ?self.service_name,
            "Rule Executed"
        );
    }

    fn record_flush(&self, count: u64, duration: Duration) {
        debug!(
            target: "skp_invalidation",
            event = "flush",
            count = count,
            duration_ms = duration.as_millis(),
            service = ?self.service_name,
            "Batch Flushed"
        );
    }

    fn record_flush_failure(&self) {
        warn!(
            target: "skp_invalidation",
            event = "flush_failure",
            service = ?self.service_name,
            "Batch Flush Failed"
        );
    }

    fn record_pending(&self, tags: usize, keys: usize) {
        tracing::trace!(
            target: "skp_invalidation",
            event = "pending",
            tags = tags,
            keys = keys,
            service = ?self.service_name,
            "Pending Batch Size"
        );
    }
}
