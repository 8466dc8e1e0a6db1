//! Process-wide invalidation API
//!
//! Install one engine at start-up, then call these functions from anywhere
//! in the application:
//!
//! ```rust,no_run
//! use skp_invalidation::global;
//! use skp_invalidation::prelude::*;
//!
//! # async fn run() -> skp_invalidation::Result<()> {
//! global::install(MemoryBackend::default(), EngineConfig::default())?;
//!
//! global::register_invalidation_rule(
//!     InvalidationRule::builder("product_pages")
//!         .trigger("product")
//!         .invalidates(["product_list", "catalog"])
//!         .build()?,
//! )?;
//!
//! global::invalidate_by_write("product", Some("42"), "update").await?;
//! # Ok(())
//! # }
//! ```

use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use skp_invalidation_core::{
    InvalidationBackend, InvalidationContext, InvalidationError, InvalidationMetrics,
    InvalidationStats, NoopMetrics, Result, WriteOperation,
};

use crate::config::EngineConfig;
use crate::engine::InvalidationEngine;
use crate::relationship::DataRelationship;
use crate::rule::InvalidationRule;

/// Engine type held process-wide
pub type GlobalEngine =
    InvalidationEngine<Arc<dyn InvalidationBackend>, Arc<dyn InvalidationMetrics>>;

static ENGINE: OnceCell<GlobalEngine> = OnceCell::new();

/// Install the process-wide engine
///
/// Fails with `Configuration` if an engine is already installed.
pub fn install<B: InvalidationBackend>(backend: B, config: EngineConfig) -> Result<()> {
    install_with_metrics(backend, NoopMetrics, config)
}

/// Install the process-wide engine with a metrics collector
pub fn install_with_metrics<B, M>(backend: B, metrics: M, config: EngineConfig) -> Result<()>
where
    B: InvalidationBackend,
    M: InvalidationMetrics,
{
    let backend: Arc<dyn InvalidationBackend> = Arc::new(backend);
    let metrics: Arc<dyn InvalidationMetrics> = Arc::new(metrics);
    ENGINE
        .set(InvalidationEngine::with_metrics(backend, metrics, config))
        .map_err(|_| {
            InvalidationError::Configuration("invalidation engine already installed".into())
        })?;
    tracing::info!(target: "skp_invalidation", "Process-wide invalidation engine installed");
    Ok(())
}

pub fn is_installed() -> bool {
    ENGINE.get().is_some()
}

/// The installed engine
pub fn engine() -> Result<&'static GlobalEngine> {
    ENGINE.get().ok_or(InvalidationError::NotInitialized)
}

/// See [`InvalidationEngine::invalidate_by_write`]
pub async fn invalidate_by_write(
    resource_type: &str,
    resource_id: Option<&str>,
    operation: impl Into<WriteOperation>,
) -> Result<u64> {
    engine()?
        .invalidate_by_write(resource_type, resource_id, operation)
        .await
}

/// See [`InvalidationEngine::invalidate_with_context`]
pub async fn invalidate_with_context(ctx: InvalidationContext) -> Result<u64> {
    engine()?.invalidate_with_context(ctx).await
}

pub fn register_invalidation_rule(rule: InvalidationRule) -> Result<()> {
    engine()?.register_rule(rule)
}

pub fn register_data_relationship(relationship: DataRelationship) -> Result<()> {
    engine()?.register_relationship(relationship);
    Ok(())
}

/// Related tags through the registered relationships
pub fn get_related_tags(
    resource_type: &str,
    resource_id: Option<&str>,
    depth: usize,
) -> Result<BTreeSet<String>> {
    Ok(engine()?.get_related_tags(resource_type, resource_id, depth))
}

pub fn schedule_batch_invalidation<T, K, S1, S2>(tags: T, keys: K) -> Result<()>
where
    T: IntoIterator<Item = S1>,
    K: IntoIterator<Item = S2>,
    S1: Into<String>,
    S2: Into<String>,
{
    engine()?.schedule_batch_invalidation(tags, keys);
    Ok(())
}

pub async fn flush_pending_invalidations() -> Result<u64> {
    engine()?.flush_pending().await
}

pub fn add_cache_dependency<I, S>(key: impl Into<String>, depends_on: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    engine()?.add_dependency(key, depends_on);
    Ok(())
}

pub async fn invalidate_with_dependencies(key: &str, recursive: bool) -> Result<u64> {
    engine()?.invalidate_with_dependencies(key, recursive).await
}

/// Change the debounce window; an armed timer keeps its deadline
pub fn set_batch_delay(delay: Duration) -> Result<()> {
    engine()?.set_batch_delay(delay);
    Ok(())
}

pub fn get_invalidation_stats() -> Result<InvalidationStats> {
    Ok(engine()?.get_stats())
}

/// Flush (or discard, per config) the pending batch before exit
pub async fn shutdown() -> Result<u64> {
    engine()?.shutdown().await
}
