//! Declarative invalidation rules

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use skp_invalidation_core::{
    InvalidationBackend, InvalidationContext, InvalidationError, Result, StrategyKind,
    WriteOperation,
};

use crate::relationship::DataRelationship;

type GuardFn = dyn Fn(&InvalidationContext) -> Result<bool> + Send + Sync;

/// Guard deciding whether a matched rule runs for a given write
///
/// Errors returned by the guard propagate unchanged to the caller of
/// `invalidate_by_write`.
#[derive(Clone)]
pub struct Condition(Arc<GuardFn>);

impl Condition {
    /// Wrap a fallible guard
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&InvalidationContext) -> Result<bool> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a guard that cannot fail
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&InvalidationContext) -> bool + Send + Sync + 'static,
    {
        Self::new(move |ctx| Ok(f(ctx)))
    }

    /// Pass only for the listed operations
    pub fn on_operations<I>(operations: I) -> Self
    where
        I: IntoIterator<Item = WriteOperation>,
    {
        let operations: Vec<WriteOperation> = operations.into_iter().collect();
        Self::infallible(move |ctx| operations.contains(&ctx.operation))
    }

    /// Pass only for deletes
    pub fn on_delete() -> Self {
        Self::on_operations([WriteOperation::Delete])
    }

    pub fn evaluate(&self, ctx: &InvalidationContext) -> Result<bool> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

/// How a matched rule carries out its invalidation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InvalidationStrategy {
    /// Delete synchronously during the write notification
    #[default]
    Immediate,
    /// Delete synchronously, following relationships up to their cascade depth
    Cascade { relationships: Vec<DataRelationship> },
    /// Merge into the pending batch and let the debounce timer flush it
    Batched,
}

impl InvalidationStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            InvalidationStrategy::Immediate => StrategyKind::Immediate,
            InvalidationStrategy::Cascade { .. } => StrategyKind::Cascade,
            InvalidationStrategy::Batched => StrategyKind::Batched,
        }
    }
}

/// A registered reaction to writes of certain resource types
///
/// Built with [`InvalidationRule::builder`]. A rule is a candidate for a write
/// when the written resource type is one of its trigger tags, and runs when
/// its condition (if any) passes.
pub struct InvalidationRule {
    name: String,
    trigger_tags: BTreeSet<String>,
    invalidate_tags: BTreeSet<String>,
    pattern: Option<Regex>,
    pattern_source: Option<String>,
    condition: Option<Condition>,
    strategy: InvalidationStrategy,
    priority: i32,
    relationships: Vec<DataRelationship>,
    execution_count: AtomicU64,
    total_invalidated: AtomicU64,
}

impl InvalidationRule {
    /// Start building a rule named `name`
    pub fn builder(name: impl Into<String>) -> InvalidationRuleBuilder {
        InvalidationRuleBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger_tags(&self) -> &BTreeSet<String> {
        &self.trigger_tags
    }

    pub fn invalidate_tags(&self) -> &BTreeSet<String> {
        &self.invalidate_tags
    }

    /// The pattern as written at construction
    pub fn pattern(&self) -> Option<&str> {
        self.pattern_source.as_deref()
    }

    pub fn strategy(&self) -> &InvalidationStrategy {
        &self.strategy
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn relationships(&self) -> &[DataRelationship] {
        &self.relationships
    }

    pub fn has_condition(&self) -> bool {
        self.condition.is_some()
    }

    pub fn execution_count(&self) -> u64 {
        self.execution_count.load(Ordering::Relaxed)
    }

    pub fn total_invalidated(&self) -> u64 {
        self.total_invalidated.load(Ordering::Relaxed)
    }

    /// Whether a write to `resource_type` makes this rule a candidate
    pub fn matches(&self, resource_type: &str) -> bool {
        self.trigger_tags.contains(resource_type)
    }

    /// Evaluate the guard; rules without one always pass
    pub fn check_condition(&self, ctx: &InvalidationContext) -> Result<bool> {
        match &self.condition {
            Some(condition) => condition.evaluate(ctx),
            None => Ok(true),
        }
    }

    /// Tags this rule would invalidate for `ctx`, before any cascade
    pub fn planned_tags(&self, ctx: &InvalidationContext) -> BTreeSet<String> {
        let mut tags = self.invalidate_tags.clone();
        if let Some(id) = &ctx.resource_id {
            for rel in &self.relationships {
                tags.extend(rel.related_tags(id));
            }
        }
        tags
    }

    /// Whether `key` matches the rule's pattern
    pub fn matches_key(&self, key: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(key))
    }

    /// Scan the backend's key space for keys matching the pattern
    ///
    /// Linear in the number of cached keys. Returns nothing without a pattern.
    pub async fn matching_keys<B>(&self, backend: &B) -> Result<Vec<String>>
    where
        B: InvalidationBackend + ?Sized,
    {
        if self.pattern.is_none() {
            return Ok(Vec::new());
        }
        let keys = backend.keys().await?;
        Ok(keys.into_iter().filter(|k| self.matches_key(k)).collect())
    }

    /// Run the rule for `ctx` against `backend`
    ///
    /// Returns the number of entries removed. A failing condition returns 0
    /// and leaves the counters untouched.
    pub async fn execute<B>(&self, backend: &B, ctx: &InvalidationContext) -> Result<u64>
    where
        B: InvalidationBackend + ?Sized,
    {
        if !self.check_condition(ctx)? {
            return Ok(0);
        }
        let tags = self.planned_tags(ctx);
        self.run(backend, &tags).await
    }

    /// Delete `tags` plus pattern-matched keys, then record the execution
    pub(crate) async fn run<B>(&self, backend: &B, tags: &BTreeSet<String>) -> Result<u64>
    where
        B: InvalidationBackend + ?Sized,
    {
        let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
        let mut count = backend.delete_many_tags(&tag_refs).await?;

        let keys = self.matching_keys(backend).await?;
        if !keys.is_empty() {
            let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
            count += backend.delete_many(&key_refs).await?;
        }

        self.record_execution(count);
        Ok(count)
    }

    pub(crate) fn record_execution(&self, invalidated: u64) {
        self.execution_count.fetch_add(1, Ordering::Relaxed);
        self.total_invalidated
            .fetch_add(invalidated, Ordering::Relaxed);
    }

    pub(crate) fn reset_counters(&self) {
        self.execution_count.store(0, Ordering::Relaxed);
        self.total_invalidated.store(0, Ordering::Relaxed);
    }
}

impl fmt::Debug for InvalidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidationRule")
            .field("name", &self.name)
            .field("trigger_tags", &self.trigger_tags)
            .field("invalidate_tags", &self.invalidate_tags)
            .field("pattern", &self.pattern_source)
            .field("has_condition", &self.condition.is_some())
            .field("strategy", &self.strategy.kind())
            .field("priority", &self.priority)
            .field("relationships", &self.relationships.len())
            .field("execution_count", &self.execution_count())
            .field("total_invalidated", &self.total_invalidated())
            .finish()
    }
}

/// Builder for [`InvalidationRule`]
///
/// # Example
/// ```
/// use skp_invalidation::{Condition, InvalidationRule};
///
/// let rule = InvalidationRule::builder("product_pricing")
///     .trigger("product")
///     .invalidate("pricing")
///     .condition(Condition::on_delete())
///     .priority(100)
///     .build()
///     .unwrap();
/// assert!(rule.matches("product"));
/// ```
#[derive(Debug, Default)]
pub struct InvalidationRuleBuilder {
    name: String,
    trigger_tags: BTreeSet<String>,
    invalidate_tags: BTreeSet<String>,
    pattern: Option<String>,
    condition: Option<Condition>,
    strategy: InvalidationStrategy,
    cascade_own_relationships: bool,
    priority: i32,
    relationships: Vec<DataRelationship>,
}

impl InvalidationRuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a trigger tag (resource type)
    pub fn trigger(mut self, tag: impl Into<String>) -> Self {
        self.trigger_tags.insert(tag.into());
        self
    }

    /// Add multiple trigger tags
    pub fn triggers<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trigger_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add a tag to invalidate
    pub fn invalidate(mut self, tag: impl Into<String>) -> Self {
        self.invalidate_tags.insert(tag.into());
        self
    }

    /// Add multiple tags to invalidate
    pub fn invalidates<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invalidate_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Also delete keys matching this regex
    ///
    /// Matching is anchored at the start of the key.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Shorthand for an infallible condition
    pub fn when<F>(self, f: F) -> Self
    where
        F: Fn(&InvalidationContext) -> bool + Send + Sync + 'static,
    {
        self.condition(Condition::infallible(f))
    }

    pub fn strategy(mut self, strategy: InvalidationStrategy) -> Self {
        self.strategy = strategy;
        self.cascade_own_relationships = false;
        self
    }

    pub fn immediate(self) -> Self {
        self.strategy(InvalidationStrategy::Immediate)
    }

    pub fn batched(self) -> Self {
        self.strategy(InvalidationStrategy::Batched)
    }

    /// Cascade through this rule's own relationships
    pub fn cascade(mut self) -> Self {
        self.strategy = InvalidationStrategy::Cascade {
            relationships: Vec::new(),
        };
        self.cascade_own_relationships = true;
        self
    }

    /// Cascade through the given relationships
    pub fn cascade_through<I>(self, relationships: I) -> Self
    where
        I: IntoIterator<Item = DataRelationship>,
    {
        self.strategy(InvalidationStrategy::Cascade {
            relationships: relationships.into_iter().collect(),
        })
    }

    /// Higher priorities run first
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Also invalidate the direct targets of `relationship`
    pub fn relationship(mut self, relationship: DataRelationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Validate and build the rule
    pub fn build(self) -> Result<InvalidationRule> {
        if self.name.trim().is_empty() {
            return Err(InvalidationError::Configuration(
                "rule name must not be empty".to_string(),
            ));
        }

        let pattern = match &self.pattern {
            Some(source) => Some(Regex::new(&format!("^(?:{})", source)).map_err(|e| {
                InvalidationError::InvalidPattern {
                    pattern: source.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let strategy = if self.cascade_own_relationships {
            InvalidationStrategy::Cascade {
                relationships: self.relationships.clone(),
            }
        } else {
            self.strategy
        };

        Ok(InvalidationRule {
            name: self.name,
            trigger_tags: self.trigger_tags,
            invalidate_tags: self.invalidate_tags,
            pattern,
            pattern_source: self.pattern,
            condition: self.condition,
            strategy,
            priority: self.priority,
            relationships: self.relationships,
            execution_count: AtomicU64::new(0),
            total_invalidated: AtomicU64::new(0),
        })
    }
}
