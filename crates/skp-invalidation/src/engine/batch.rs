//! Debounced batch of pending invalidations

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use skp_invalidation_core::{InvalidationBackend, InvalidationMetrics, Result};

use super::EngineInner;

/// Tags and keys waiting for the next flush
#[derive(Debug, Default)]
pub(crate) struct PendingBatch {
    pub(crate) tags: BTreeSet<String>,
    pub(crate) keys: BTreeSet<String>,
    /// Bumped on every addition and every flush; a timer only flushes the
    /// generation it was armed for
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl PendingBatch {
    pub(crate) fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.keys.is_empty()
    }

    pub(crate) fn merge<T, K>(&mut self, tags: T, keys: K)
    where
        T: IntoIterator<Item = String>,
        K: IntoIterator<Item = String>,
    {
        self.tags.extend(tags);
        self.keys.extend(keys);
    }

    /// Swap the pending sets out, leaving the batch empty
    pub(crate) fn take(&mut self) -> (BTreeSet<String>, BTreeSet<String>) {
        self.generation += 1;
        self.cancel_timer();
        (
            std::mem::take(&mut self.tags),
            std::mem::take(&mut self.keys),
        )
    }

    pub(crate) fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    pub(crate) fn has_timer(&self) -> bool {
        self.timer.is_some()
    }
}

impl<B, M> EngineInner<B, M>
where
    B: InvalidationBackend,
    M: InvalidationMetrics,
{
    /// Merge into the pending batch and restart the debounce window
    pub(crate) fn schedule(self: &Arc<Self>, tags: BTreeSet<String>, keys: BTreeSet<String>) {
        if tags.is_empty() && keys.is_empty() {
            return;
        }

        let mut state = self.state.lock();
        state.batch.merge(tags, keys);
        let delay = state.batch_delay;
        let batch = &mut state.batch;

        batch.generation += 1;
        batch.cancel_timer();

        self.metrics.record_pending(batch.tags.len(), batch.keys.len());
        debug!(
            target: "skp_invalidation",
            pending_tags = batch.tags.len(),
            pending_keys = batch.keys.len(),
            delay_ms = delay.as_millis() as u64,
            "Batch invalidation scheduled"
        );

        self.arm(batch, delay);
    }

    /// Spawn the debounce timer for the batch's current generation
    ///
    /// The deadline is fixed here, not when the timer task first runs.
    fn arm(self: &Arc<Self>, batch: &mut PendingBatch, delay: Duration) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                target: "skp_invalidation",
                "No tokio runtime; pending batch waits for a manual flush"
            );
            return;
        };

        let deadline = tokio::time::Instant::now() + delay;
        let generation = batch.generation;
        let engine = Arc::downgrade(self);
        batch.timer = Some(runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // The flush runs in its own task so that cancelling this timer can
            // never interrupt a flush that already swapped the batch out.
            if let Some(engine) = engine.upgrade() {
                tokio::spawn(async move {
                    if let Err(e) = engine.flush_generation(generation).await {
                        warn!(
                            target: "skp_invalidation",
                            error = %e,
                            "Scheduled flush failed; batch kept for retry"
                        );
                    }
                });
            }
        }));
    }

    /// Timer path: flush only if no addition happened since arming
    ///
    /// A failed flush re-arms the timer so the re-queued remainder is retried
    /// after another `batch_delay`.
    async fn flush_generation(self: &Arc<Self>, generation: u64) -> Result<u64> {
        let (tags, keys) = {
            let mut state = self.state.lock();
            if state.batch.generation != generation {
                return Ok(0);
            }
            // Our own handle; the task is finishing, nothing to abort
            state.batch.timer = None;
            state.batch.take()
        };

        let result = self.flush_sets(tags, keys).await;
        if result.is_err() {
            let mut state = self.state.lock();
            let delay = state.batch_delay;
            let batch = &mut state.batch;
            if !batch.is_empty() && !batch.has_timer() {
                batch.generation += 1;
                self.arm(batch, delay);
            }
        }
        result
    }

    /// Manual path: cancel the timer and flush whatever is pending
    pub(crate) async fn flush_now(&self) -> Result<u64> {
        let (tags, keys) = {
            let mut state = self.state.lock();
            state.batch.take()
        };
        self.flush_sets(tags, keys).await
    }

    /// Invalidate a swapped-out batch
    ///
    /// On a backend error, everything not yet invalidated goes back into the
    /// pending batch before the error is returned.
    async fn flush_sets(&self, tags: BTreeSet<String>, keys: BTreeSet<String>) -> Result<u64> {
        if tags.is_empty() && keys.is_empty() {
            return Ok(0);
        }

        let started = Instant::now();
        let tag_total = tags.len();
        let key_total = keys.len();
        let tags: Vec<String> = tags.into_iter().collect();
        let keys: Vec<String> = keys.into_iter().collect();
        let mut count = 0u64;

        for (i, tag) in tags.iter().enumerate() {
            match self.backend.delete_by_tag(tag).await {
                Ok(n) => count += n,
                Err(e) => {
                    self.requeue(&tags[i..], &keys, count);
                    return Err(e);
                }
            }
        }
        for (i, key) in keys.iter().enumerate() {
            match self.backend.delete(key).await {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(e) => {
                    self.requeue(&[], &keys[i..], count);
                    return Err(e);
                }
            }
        }

        self.counters.record_flush(count);
        self.metrics.record_flush(count, started.elapsed());
        info!(
            target: "skp_invalidation",
            tags = tag_total,
            keys = key_total,
            invalidated = count,
            duration_ms = started.elapsed().as_millis() as u64,
            "Pending invalidations flushed"
        );
        Ok(count)
    }

    fn requeue(&self, tags: &[String], keys: &[String], flushed: u64) {
        // Entries removed before the failure still count
        self.counters.record_partial_flush(flushed);
        self.metrics.record_flush_failure();

        let mut state = self.state.lock();
        state.batch.merge(tags.iter().cloned(), keys.iter().cloned());
        warn!(
            target: "skp_invalidation",
            requeued_tags = tags.len(),
            requeued_keys = keys.len(),
            flushed,
            "Flush failed; unflushed invalidations returned to the pending batch"
        );
    }
}
