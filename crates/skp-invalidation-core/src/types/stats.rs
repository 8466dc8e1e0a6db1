//! Engine statistics

use serde::Serialize;

use crate::StrategyKind;

/// Per-rule counters as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDetail {
    pub name: String,
    pub priority: i32,
    pub strategy: StrategyKind,
    /// Number of times the rule ran (condition passed)
    pub execution_count: u64,
    /// Entries removed by the rule's synchronous executions
    pub total_invalidated: u64,
}

/// Read-only snapshot of the invalidation engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationStats {
    /// Number of registered rules
    pub rules: usize,
    /// Number of registered relationships
    pub relationships: usize,
    /// Number of keys with recorded dependencies
    pub dependencies: usize,
    /// Tags waiting in the pending batch
    pub pending_tags: usize,
    /// Keys waiting in the pending batch
    pub pending_keys: usize,
    /// Current debounce window
    pub batch_delay_ms: u64,
    pub total_invalidations: u64,
    pub immediate_invalidations: u64,
    pub batched_invalidations: u64,
    pub cascade_invalidations: u64,
    pub dependency_invalidations: u64,
    /// Flushes that ran on a non-empty batch
    pub flushes: u64,
    /// Flushes that failed and were re-queued
    pub failed_flushes: u64,
    /// Rules sorted by priority, highest first
    pub rule_details: Vec<RuleDetail>,
}

impl InvalidationStats {
    /// Whether anything is waiting for the next flush
    pub fn has_pending(&self) -> bool {
        self.pending_tags > 0 || self.pending_keys > 0
    }

    /// Share of invalidations that went through the batch (0.0 to 1.0)
    pub fn batched_ratio(&self) -> f64 {
        if self.total_invalidations == 0 {
            0.0
        } else {
            self.batched_invalidations as f64 / self.total_invalidations as f64
        }
    }

    /// Look up a rule's details by name
    pub fn rule(&self, name: &str) -> Option<&RuleDetail> {
        self.rule_details.iter().find(|r| r.name == name)
    }
}
