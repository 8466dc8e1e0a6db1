//! Invalidation engine

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use skp_invalidation_core::{
    InvalidationBackend, InvalidationContext, InvalidationMetrics, InvalidationStats,
    NoopMetrics, Result, RuleDetail, StrategyKind, WriteOperation,
};

use crate::config::EngineConfig;
use crate::dependency::DependencyTracker;
use crate::relationship::DataRelationship;
use crate::rule::{InvalidationRule, InvalidationStrategy};

mod batch;
mod registry;

use batch::PendingBatch;
use registry::Registry;

/// State guarded by the engine-wide lock
#[derive(Debug)]
pub(crate) struct EngineState {
    registry: Registry,
    pub(crate) batch: PendingBatch,
    pub(crate) batch_delay: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    immediate: AtomicU64,
    cascade: AtomicU64,
    batched: AtomicU64,
    dependency: AtomicU64,
    flushes: AtomicU64,
    failed_flushes: AtomicU64,
}

impl Counters {
    fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self, invalidated: u64) {
        Self::add(&self.batched, invalidated);
        Self::add(&self.flushes, 1);
    }

    pub(crate) fn record_partial_flush(&self, invalidated: u64) {
        Self::add(&self.batched, invalidated);
        Self::add(&self.failed_flushes, 1);
    }

    fn reset(&self) {
        for counter in [
            &self.immediate,
            &self.cascade,
            &self.batched,
            &self.dependency,
            &self.flushes,
            &self.failed_flushes,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

pub(crate) struct EngineInner<B, M>
where
    B: InvalidationBackend,
    M: InvalidationMetrics,
{
    backend: B,
    metrics: M,
    config: EngineConfig,
    pub(crate) state: Mutex<EngineState>,
    dependencies: DependencyTracker,
    pub(crate) counters: Counters,
}

impl<B, M> Drop for EngineInner<B, M>
where
    B: InvalidationBackend,
    M: InvalidationMetrics,
{
    fn drop(&mut self) {
        let batch = &mut self.state.get_mut().batch;
        batch.cancel_timer();
        if !batch.is_empty() {
            warn!(
                target: "skp_invalidation",
                dropped_tags = batch.tags.len(),
                dropped_keys = batch.keys.len(),
                "Engine dropped with pending invalidations; call shutdown() to flush"
            );
        }
    }
}

/// Rule-driven cache invalidation engine
///
/// Generic over:
/// - `B`: The cache backend the engine removes entries from
/// - `M`: The metrics collector
///
/// Cloning creates a new handle to the SAME engine.
pub struct InvalidationEngine<B, M = NoopMetrics>
where
    B: InvalidationBackend,
    M: InvalidationMetrics,
{
    inner: Arc<EngineInner<B, M>>,
}

// Constructors for default metrics
impl<B: InvalidationBackend> InvalidationEngine<B, NoopMetrics> {
    /// Create a new engine with default config and no metrics
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, EngineConfig::default())
    }

    /// Create with custom config
    pub fn with_config(backend: B, config: EngineConfig) -> Self {
        Self::with_metrics(backend, NoopMetrics, config)
    }
}

impl<B, M> InvalidationEngine<B, M>
where
    B: InvalidationBackend,
    M: InvalidationMetrics,
{
    /// Create an engine with custom metrics
    pub fn with_metrics(backend: B, metrics: M, config: EngineConfig) -> Self {
        let state = EngineState {
            registry: Registry::default(),
            batch: PendingBatch::default(),
            batch_delay: config.batch_delay,
        };
        Self {
            inner: Arc::new(EngineInner {
                backend,
                metrics,
                config,
                state: Mutex::new(state),
                dependencies: DependencyTracker::new(),
                counters: Counters::default(),
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn dependencies(&self) -> &DependencyTracker {
        &self.inner.dependencies
    }

    /// Register a rule
    ///
    /// Fails with `DuplicateRule` if a rule with the same name exists.
    pub fn register_rule(&self, rule: InvalidationRule) -> Result<()> {
        let mut state = self.inner.state.lock();
        let rule = state.registry.add_rule(rule)?;
        debug!(
            target: "skp_invalidation",
            rule = rule.name(),
            priority = rule.priority(),
            strategy = rule.strategy().kind().as_str(),
            "Rule registered"
        );
        Ok(())
    }

    /// Remove a rule by name
    pub fn unregister_rule(&self, name: &str) -> bool {
        self.inner.state.lock().registry.remove_rule(name)
    }

    /// Look up a registered rule
    pub fn rule(&self, name: &str) -> Option<Arc<InvalidationRule>> {
        self.inner.state.lock().registry.rule(name)
    }

    /// Register a relationship
    ///
    /// Relationships accumulate; several per source type all apply.
    pub fn register_relationship(&self, relationship: DataRelationship) {
        debug!(
            target: "skp_invalidation",
            source = relationship.source_type(),
            targets = relationship.target_types().len(),
            depth = relationship.cascade_depth(),
            "Relationship registered"
        );
        self.inner.state.lock().registry.add_relationship(relationship);
    }

    /// Relationships registered for `source_type`
    pub fn relationships_from(&self, source_type: &str) -> Vec<DataRelationship> {
        self.inner.state.lock().registry.relationships_from(source_type)
    }

    /// Tags reachable from `resource_type` within `depth` relationship hops
    ///
    /// `depth == 0` yields only the type's own tags.
    pub fn get_related_tags(
        &self,
        resource_type: &str,
        resource_id: Option<&str>,
        depth: usize,
    ) -> BTreeSet<String> {
        self.inner
            .state
            .lock()
            .registry
            .walk(resource_type, resource_id, depth, &[])
    }

    /// Notify the engine of a write
    ///
    /// Returns the number of entries removed synchronously by immediate and
    /// cascade rules; batched rules only schedule.
    pub async fn invalidate_by_write(
        &self,
        resource_type: &str,
        resource_id: Option<&str>,
        operation: impl Into<WriteOperation>,
    ) -> Result<u64> {
        let mut ctx = InvalidationContext::new(resource_type).with_operation(operation);
        ctx.resource_id = resource_id.map(str::to_string);
        self.invalidate_with_context(ctx).await
    }

    /// Notify the engine of a write described by a full context
    pub async fn invalidate_with_context(&self, ctx: InvalidationContext) -> Result<u64> {
        let candidates = {
            let state = self.inner.state.lock();
            state.registry.candidates(&ctx.resource_type)
        };
        if candidates.is_empty() {
            return Ok(0);
        }

        debug!(
            target: "skp_invalidation",
            resource_type = %ctx.resource_type,
            resource_id = ?ctx.resource_id,
            operation = %ctx.operation,
            candidates = candidates.len(),
            "Write received"
        );

        let mut invalidated = 0;
        for rule in candidates {
            let started = Instant::now();
            let kind = rule.strategy().kind();
            let ran = match rule.strategy() {
                InvalidationStrategy::Immediate => {
                    if !rule.check_condition(&ctx)? {
                        continue;
                    }
                    let tags = rule.planned_tags(&ctx);
                    let count = rule.run(&self.inner.backend, &tags).await?;
                    Counters::add(&self.inner.counters.immediate, count);
                    invalidated += count;
                    count
                }
                InvalidationStrategy::Cascade { relationships } => {
                    if !rule.check_condition(&ctx)? {
                        continue;
                    }
                    let tags = self.cascade_tags(&rule, relationships, &ctx);
                    let count = rule.run(&self.inner.backend, &tags).await?;
                    Counters::add(&self.inner.counters.cascade, count);
                    invalidated += count;
                    count
                }
                InvalidationStrategy::Batched => {
                    if !rule.check_condition(&ctx)? {
                        continue;
                    }
                    let tags = rule.planned_tags(&ctx);
                    let keys = rule.matching_keys(&self.inner.backend).await?;
                    rule.record_execution(0);
                    self.inner.schedule(tags, keys.into_iter().collect());
                    0
                }
            };

            if kind != StrategyKind::Batched {
                self.inner.metrics.record_invalidation(kind, ran);
            }
            self.inner
                .metrics
                .record_rule_execution(rule.name(), kind, started.elapsed());
            debug!(
                target: "skp_invalidation",
                rule = rule.name(),
                strategy = kind.as_str(),
                invalidated = ran,
                "Rule executed"
            );
        }

        Ok(invalidated)
    }

    /// Tag closure for a cascade rule
    fn cascade_tags(
        &self,
        rule: &InvalidationRule,
        relationships: &[DataRelationship],
        ctx: &InvalidationContext,
    ) -> BTreeSet<String> {
        let mut tags = rule.planned_tags(ctx);
        let id = ctx.resource_id.as_deref();
        let state = self.inner.state.lock();

        if relationships.is_empty() {
            tags.extend(state.registry.walk(
                &ctx.resource_type,
                id,
                self.inner.config.default_cascade_depth,
                &[],
            ));
        } else {
            for rel in relationships {
                tags.extend(state.registry.walk(
                    rel.source_type(),
                    id,
                    rel.cascade_depth(),
                    relationships,
                ));
            }
        }
        tags
    }

    /// Add tags and keys to the pending batch directly, bypassing rules
    ///
    /// Every call with something to add restarts the debounce window.
    pub fn schedule_batch_invalidation<T, K, S1, S2>(&self, tags: T, keys: K)
    where
        T: IntoIterator<Item = S1>,
        K: IntoIterator<Item = S2>,
        S1: Into<String>,
        S2: Into<String>,
    {
        self.inner.schedule(
            tags.into_iter().map(Into::into).collect(),
            keys.into_iter().map(Into::into).collect(),
        );
    }

    /// Flush the pending batch now
    ///
    /// Cancels the debounce timer. Returns the number of entries removed; a
    /// second call with nothing newly scheduled returns 0. On a backend error
    /// the unflushed part stays pending.
    pub async fn flush_pending(&self) -> Result<u64> {
        self.inner.flush_now().await
    }

    /// Change the debounce window for batches armed from now on
    ///
    /// A timer that is already running keeps its original deadline.
    pub fn set_batch_delay(&self, delay: Duration) {
        self.inner.state.lock().batch_delay = delay;
    }

    pub fn batch_delay(&self) -> Duration {
        self.inner.state.lock().batch_delay
    }

    /// Number of pending (tags, keys)
    pub fn pending_len(&self) -> (usize, usize) {
        let state = self.inner.state.lock();
        (state.batch.tags.len(), state.batch.keys.len())
    }

    /// Whether a debounce timer is armed
    pub fn has_pending_timer(&self) -> bool {
        self.inner.state.lock().batch.has_timer()
    }

    /// Record that `key` was derived from each of `depends_on`
    pub fn add_dependency<I, S>(&self, key: impl Into<String>, depends_on: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.dependencies.add(key, depends_on);
    }

    /// Forget every dependency edge touching `key`
    pub fn remove_dependency(&self, key: &str) -> bool {
        self.inner.dependencies.remove(key)
    }

    /// Invalidate `key` and, when `recursive`, every key derived from it
    ///
    /// Returns the number of entries that existed and were removed.
    pub async fn invalidate_with_dependencies(&self, key: &str, recursive: bool) -> Result<u64> {
        let keys = self.inner.dependencies.closure(key, recursive);
        let mut count = 0;
        for k in &keys {
            if self.inner.backend.delete(k).await? {
                count += 1;
            }
        }

        Counters::add(&self.inner.counters.dependency, count);
        debug!(
            target: "skp_invalidation",
            key = %key,
            recursive,
            visited = keys.len(),
            invalidated = count,
            "Dependency invalidation"
        );
        Ok(count)
    }

    /// Snapshot of the engine's counters and registry
    pub fn get_stats(&self) -> InvalidationStats {
        let counters = &self.inner.counters;
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        let immediate = load(&counters.immediate);
        let cascade = load(&counters.cascade);
        let batched = load(&counters.batched);
        let dependency = load(&counters.dependency);

        let state = self.inner.state.lock();
        let rule_details = state
            .registry
            .rules()
            .iter()
            .map(|rule| RuleDetail {
                name: rule.name().to_string(),
                priority: rule.priority(),
                strategy: rule.strategy().kind(),
                execution_count: rule.execution_count(),
                total_invalidated: rule.total_invalidated(),
            })
            .collect();

        InvalidationStats {
            rules: state.registry.rules().len(),
            relationships: state.registry.relationship_count(),
            dependencies: self.inner.dependencies.len(),
            pending_tags: state.batch.tags.len(),
            pending_keys: state.batch.keys.len(),
            batch_delay_ms: state.batch_delay.as_millis() as u64,
            total_invalidations: immediate + cascade + batched + dependency,
            immediate_invalidations: immediate,
            batched_invalidations: batched,
            cascade_invalidations: cascade,
            dependency_invalidations: dependency,
            flushes: load(&counters.flushes),
            failed_flushes: load(&counters.failed_flushes),
            rule_details,
        }
    }

    /// Zero the engine counters and every rule's counters
    pub fn reset_stats(&self) {
        self.inner.counters.reset();
        for rule in self.inner.state.lock().registry.rules() {
            rule.reset_counters();
        }
    }

    /// Stop the debounce timer and, if configured, flush what is pending
    ///
    /// Without `flush_on_shutdown` the pending batch is discarded and logged.
    pub async fn shutdown(&self) -> Result<u64> {
        if self.inner.config.flush_on_shutdown {
            return self.flush_pending().await;
        }

        let (tags, keys) = {
            let mut state = self.inner.state.lock();
            state.batch.take()
        };
        if !tags.is_empty() || !keys.is_empty() {
            warn!(
                target: "skp_invalidation",
                dropped_tags = tags.len(),
                dropped_keys = keys.len(),
                "Shutdown discarded pending invalidations"
            );
        }
        Ok(0)
    }
}

impl<B, M> Clone for InvalidationEngine<B, M>
where
    B: InvalidationBackend,
    M: InvalidationMetrics,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
