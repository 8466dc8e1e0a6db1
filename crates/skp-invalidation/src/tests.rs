//! Integration tests for InvalidationEngine

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn no_keys() -> std::iter::Empty<String> {
        std::iter::empty()
    }

    fn immediate(name: &str, trigger: &str, tag: &str) -> InvalidationRule {
        InvalidationRule::builder(name)
            .trigger(trigger)
            .invalidate(tag)
            .build()
            .unwrap()
    }

    /// Memory store whose tag deletes fail for selected tags
    #[derive(Default)]
    struct FlakyBackend {
        inner: MemoryBackend,
        failing: Mutex<HashSet<String>>,
    }

    impl FlakyBackend {
        fn fail_on(&self, tag: &str) {
            self.failing.lock().insert(tag.to_string());
        }

        fn recover(&self) {
            self.failing.lock().clear();
        }
    }

    #[async_trait]
    impl InvalidationBackend for FlakyBackend {
        async fn delete_by_tag(&self, tag: &str) -> Result<u64> {
            let failing = self.failing.lock().contains(tag);
            if failing {
                return Err(InvalidationError::Backend(format!("tag `{}` unavailable", tag)));
            }
            self.inner.delete_by_tag(tag).await
        }

        async fn delete(&self, key: &str) -> Result<bool> {
            self.inner.delete(key).await
        }

        async fn keys(&self) -> Result<Vec<String>> {
            self.inner.keys().await
        }
    }

    #[tokio::test]
    async fn test_disjoint_trigger_never_runs() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("orders:page", "o", ["orders"]);
        let engine = InvalidationEngine::new(backend);
        engine.register_rule(immediate("orders", "order", "orders")).unwrap();

        let count = engine.invalidate_by_write("product", Some("1"), "update").await.unwrap();
        assert_eq!(count, 0);
        assert!(engine.backend().contains("orders:page"));

        let stats = engine.get_stats();
        assert_eq!(stats.rule("orders").unwrap().execution_count, 0);
        assert_eq!(stats.total_invalidations, 0);
    }

    #[tokio::test]
    async fn test_priority_order() {
        let engine = InvalidationEngine::new(MemoryBackend::with_defaults());
        let order = Arc::new(Mutex::new(Vec::new()));

        for (name, priority) in [("low", 10), ("high", 100), ("mid", 50)] {
            let order = order.clone();
            engine
                .register_rule(
                    InvalidationRule::builder(name)
                        .trigger("product")
                        .priority(priority)
                        .when(move |_| {
                            order.lock().push(name);
                            true
                        })
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }

        engine.invalidate_by_write("product", None, "update").await.unwrap();
        assert_eq!(*order.lock(), vec!["high", "mid", "low"]);

        let names: Vec<_> = engine
            .get_stats()
            .rule_details
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_writes() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("pricing:1", "a", ["pricing"]);
        backend.insert("pricing:2", "b", ["pricing"]);
        for id in 0..5 {
            let tag = format!("offer:{}", id);
            backend.insert(format!("{}:page", tag), "o", [tag]);
        }

        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_millis(100)),
        );
        engine
            .register_rule(
                InvalidationRule::builder("pricing")
                    .trigger("product")
                    .invalidate("pricing")
                    .relationship(DataRelationship::one_to_one("product", ["offer"]))
                    .batched()
                    .build()
                    .unwrap(),
            )
            .unwrap();

        for id in 0..5 {
            let id = id.to_string();
            let count = engine.invalidate_by_write("product", Some(&id), "update").await.unwrap();
            assert_eq!(count, 0);
            tokio::time::advance(Duration::from_millis(50)).await;
        }

        // 250ms since the first write, 50ms since the last
        assert!(engine.has_pending_timer());
        assert_eq!(engine.get_stats().flushes, 0);
        assert!(engine.backend().contains("pricing:1"));
        // pricing, offer and offer:0 through offer:4
        assert_eq!(engine.pending_len(), (7, 0));

        tokio::time::sleep(Duration::from_millis(100)).await;

        let stats = engine.get_stats();
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.batched_invalidations, 7);
        assert!(!stats.has_pending());
        assert_eq!(stats.rule("pricing").unwrap().execution_count, 5);
        for id in 0..5 {
            assert!(!engine.backend().contains(&format!("offer:{}:page", id)));
        }
        assert!(engine.backend().is_empty());
        assert!(!engine.has_pending_timer());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_deadline_fixed_at_schedule() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("a:1", "v", ["a"]);
        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_millis(100)),
        );

        engine.schedule_batch_invalidation(["a"], no_keys());

        // Clock moves before the timer task is ever polled
        tokio::time::advance(Duration::from_millis(60)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(engine.pending_len(), (0, 0));
        assert!(!engine.backend().contains("a:1"));
        assert_eq!(engine.get_stats().flushes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_flush_preempts_timer() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("a:1", "v", ["a"]);
        backend.insert("b:1", "v", ["b"]);
        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_millis(100)),
        );

        engine.schedule_batch_invalidation(["a", "b"], no_keys());
        tokio::time::advance(Duration::from_millis(40)).await;

        assert_eq!(engine.flush_pending().await.unwrap(), 2);
        assert!(!engine.has_pending_timer());

        tokio::time::sleep(Duration::from_millis(200)).await;

        let stats = engine.get_stats();
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.batched_invalidations, 2);
        assert!(!stats.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_scheduled_flush_retries() {
        let backend = FlakyBackend::default();
        backend.inner.insert("a:1", "v", ["a"]);
        backend.inner.insert("b:1", "v", ["b"]);
        backend.fail_on("b");

        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_millis(100)),
        );
        engine.schedule_batch_invalidation(["a", "b"], no_keys());

        tokio::time::sleep(Duration::from_millis(150)).await;

        // "a" went through, "b" is back in the batch with a fresh timer
        assert!(!engine.backend().inner.contains("a:1"));
        assert_eq!(engine.pending_len(), (1, 0));
        assert!(engine.has_pending_timer());
        assert_eq!(engine.get_stats().flushes, 0);

        engine.backend().recover();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let stats = engine.get_stats();
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.batched_invalidations, 2);
        assert!(!stats.has_pending());
        assert!(!engine.has_pending_timer());
        assert!(engine.backend().inner.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_batch_delay_not_retroactive() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("a:1", "v", ["a"]);
        backend.insert("b:1", "v", ["b"]);
        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_secs(1)),
        );

        engine.schedule_batch_invalidation(["a"], no_keys());
        engine.set_batch_delay(Duration::from_millis(10));
        assert_eq!(engine.batch_delay(), Duration::from_millis(10));

        tokio::time::advance(Duration::from_millis(20)).await;
        assert_eq!(engine.pending_len(), (1, 0));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.pending_len(), (0, 0));
        assert!(!engine.backend().contains("a:1"));

        // Next batch uses the new window
        engine.schedule_batch_invalidation(["b"], no_keys());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!engine.backend().contains("b:1"));
        assert_eq!(engine.get_stats().flushes, 2);
    }

    #[tokio::test]
    async fn test_cascade_terminates_on_cycle() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("a:1:view", "v", ["a:1"]);
        backend.insert("b:1:view", "v", ["b:1"]);
        backend.insert("b:2:view", "v", ["b:2"]);

        let engine = InvalidationEngine::new(backend);
        engine.register_relationship(DataRelationship::one_to_one("a", ["b"]));
        engine.register_relationship(DataRelationship::one_to_one("b", ["a"]));
        engine
            .register_rule(
                InvalidationRule::builder("cycle")
                    .trigger("a")
                    .cascade()
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let count = engine.invalidate_by_write("a", Some("1"), "update").await.unwrap();
        assert_eq!(count, 2);
        assert!(engine.backend().contains("b:2:view"));
        assert_eq!(engine.get_stats().cascade_invalidations, 2);
    }

    #[tokio::test]
    async fn test_cascade_through_rule_relationships() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("user:7:profile", "u", ["user:7"]);
        backend.insert("orders:7", "o", ["order:7"]);
        backend.insert("invoice:7", "i", ["invoice:7"]);
        backend.insert("invoice:8", "i", ["invoice:8"]);

        let engine = InvalidationEngine::new(backend);
        engine.register_relationship(DataRelationship::one_to_many("order", ["invoice"]));
        engine
            .register_rule(
                InvalidationRule::builder("user_cascade")
                    .trigger("user")
                    .cascade_through([
                        DataRelationship::one_to_many("user", ["order"]).with_cascade_depth(2)
                    ])
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let count = engine.invalidate_by_write("user", Some("7"), "update").await.unwrap();
        assert_eq!(count, 3);
        assert!(engine.backend().contains("invoice:8"));

        let stats = engine.get_stats();
        assert_eq!(stats.cascade_invalidations, 3);
        assert_eq!(stats.rule("user_cascade").unwrap().total_invalidated, 3);
    }

    #[tokio::test]
    async fn test_get_related_tags() {
        let engine = InvalidationEngine::new(MemoryBackend::with_defaults());
        engine.register_relationship(DataRelationship::one_to_many("user", ["order"]));
        engine.register_relationship(DataRelationship::one_to_many("order", ["invoice"]));

        let tags: Vec<_> = engine
            .get_related_tags("user", Some("1"), 1)
            .into_iter()
            .collect();
        assert_eq!(tags, vec!["order", "order:1", "user", "user:1"]);

        assert_eq!(engine.get_related_tags("user", None, 5).len(), 3);
        assert_eq!(engine.relationships_from("order").len(), 1);
    }

    #[tokio::test]
    async fn test_dependency_closure() {
        let backend = MemoryBackend::with_defaults();
        for key in ["c1", "c2", "c3"] {
            backend.insert(key, "v", no_keys());
        }
        let engine = InvalidationEngine::new(backend);
        engine.add_dependency("c2", ["c1"]);
        engine.add_dependency("c3", ["c2"]);

        let count = engine.invalidate_with_dependencies("c1", true).await.unwrap();
        assert_eq!(count, 3);
        assert!(engine.backend().is_empty());
        assert_eq!(engine.get_stats().dependency_invalidations, 3);

        // Edges survive; entries are gone, so nothing more to remove
        assert_eq!(engine.get_stats().dependencies, 2);
        assert_eq!(engine.invalidate_with_dependencies("c1", true).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dependency_non_recursive() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("c1", "v", no_keys());
        backend.insert("c2", "v", no_keys());
        let engine = InvalidationEngine::new(backend);
        engine.add_dependency("c2", ["c1"]);

        assert_eq!(engine.invalidate_with_dependencies("c1", false).await.unwrap(), 1);
        assert!(engine.backend().contains("c2"));

        assert!(engine.remove_dependency("c2"));
        assert_eq!(engine.get_stats().dependencies, 0);
    }

    #[tokio::test]
    async fn test_flush_is_idempotent() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("a:1", "v", ["a"]);
        backend.insert("a:2", "v", ["a"]);
        backend.insert("loose", "v", no_keys());
        let engine = InvalidationEngine::new(backend);

        engine.schedule_batch_invalidation(["a"], ["loose"]);
        assert_eq!(engine.pending_len(), (1, 1));

        let first = assert_ok!(engine.flush_pending().await);
        assert_eq!(first, 3);
        let second = assert_ok!(engine.flush_pending().await);
        assert_eq!(second, 0);

        let stats = engine.get_stats();
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.batched_invalidations, 3);
        assert!(!engine.has_pending_timer());
    }

    #[tokio::test]
    async fn test_conditional_rule_on_delete() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("pricing:42", "p", ["pricing"]);
        let engine = InvalidationEngine::new(backend);
        engine
            .register_rule(
                InvalidationRule::builder("pricing_on_delete")
                    .trigger("product")
                    .invalidate("pricing")
                    .condition(Condition::on_delete())
                    .build()
                    .unwrap(),
            )
            .unwrap();

        engine.invalidate_by_write("product", Some("42"), "update").await.unwrap();
        assert!(engine.backend().contains("pricing:42"));

        engine
            .invalidate_by_write("product", Some("42"), WriteOperation::Delete)
            .await
            .unwrap();
        assert!(!engine.backend().contains("pricing:42"));
        assert_eq!(engine.get_stats().immediate_invalidations, 1);
    }

    #[tokio::test]
    async fn test_condition_sees_extra_context() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("catalog:1", "c", ["catalog"]);
        let engine = InvalidationEngine::new(backend);
        engine
            .register_rule(
                InvalidationRule::builder("skip_imports")
                    .trigger("product")
                    .invalidate("catalog")
                    .when(|ctx| ctx.extra("source") != Some("import"))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let import = InvalidationContext::new("product")
            .with_id("1")
            .with_extra("source", "import");
        assert_eq!(engine.invalidate_with_context(import).await.unwrap(), 0);
        assert!(engine.backend().contains("catalog:1"));

        let admin = InvalidationContext::new("product").with_extra("source", "admin");
        assert_eq!(engine.invalidate_with_context(admin).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_pattern_rule() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("user:123:session:active", "s", no_keys());
        backend.insert("user:123:session:idle", "s", no_keys());
        backend.insert("other:data", "o", no_keys());

        let engine = InvalidationEngine::new(backend);
        engine
            .register_rule(
                InvalidationRule::builder("sessions")
                    .trigger("user")
                    .pattern(r"user:\d+:session:.*")
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let count = engine.invalidate_by_write("user", Some("123"), "update").await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(engine.backend().len(), 1);
        assert!(engine.backend().contains("other:data"));
    }

    #[tokio::test]
    async fn test_batched_pattern_keys_flush_later() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("user:1:feed", "f", no_keys());
        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_secs(60)),
        );
        engine
            .register_rule(
                InvalidationRule::builder("feeds")
                    .trigger("post")
                    .pattern(r"user:\d+:feed")
                    .batched()
                    .build()
                    .unwrap(),
            )
            .unwrap();

        engine.invalidate_by_write("post", Some("9"), "create").await.unwrap();
        assert_eq!(engine.pending_len(), (0, 1));
        assert!(engine.backend().contains("user:1:feed"));

        assert_eq!(engine.flush_pending().await.unwrap(), 1);
        assert!(engine.backend().is_empty());
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let engine = InvalidationEngine::new(MemoryBackend::with_defaults());
        engine.register_rule(immediate("r", "product", "pricing")).unwrap();

        let err = engine
            .register_rule(immediate("r", "order", "orders"))
            .unwrap_err();
        assert!(matches!(err, InvalidationError::DuplicateRule(_)));
        assert!(err.is_configuration());
        assert_eq!(engine.get_stats().rules, 1);

        assert!(engine.unregister_rule("r"));
        assert!(engine.rule("r").is_none());
        engine.register_rule(immediate("r", "order", "orders")).unwrap();
    }

    #[tokio::test]
    async fn test_guard_error_propagates() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("pricing:1", "p", ["pricing"]);
        let engine = InvalidationEngine::new(backend);
        engine
            .register_rule(
                InvalidationRule::builder("guarded")
                    .trigger("product")
                    .priority(100)
                    .condition(Condition::new(|_| {
                        Err(InvalidationError::guard("guarded", "inventory service down"))
                    }))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        engine.register_rule(immediate("pricing", "product", "pricing")).unwrap();

        let err = assert_err!(engine.invalidate_by_write("product", None, "update").await);
        assert!(matches!(err, InvalidationError::Guard { ref rule, .. } if rule == "guarded"));

        // Lower priority rule never ran
        assert!(engine.backend().contains("pricing:1"));
        let stats = engine.get_stats();
        assert_eq!(stats.total_invalidations, 0);
        assert_eq!(stats.rule("guarded").unwrap().execution_count, 0);
    }

    #[tokio::test]
    async fn test_flush_failure_requeues_remainder() {
        let backend = FlakyBackend::default();
        backend.inner.insert("x", "v", ["a"]);
        backend.inner.insert("y", "v", ["b"]);
        backend.inner.insert("k", "v", no_keys());
        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_secs(60)),
        );

        engine.schedule_batch_invalidation(["a", "b"], ["k"]);
        engine.backend().fail_on("b");

        let err = engine.flush_pending().await.unwrap_err();
        assert!(matches!(err, InvalidationError::Backend(_)));
        assert_eq!(engine.pending_len(), (1, 1));
        assert!(!engine.has_pending_timer());
        assert!(!engine.backend().inner.contains("x"));
        assert!(engine.backend().inner.contains("y"));

        let stats = engine.get_stats();
        assert_eq!(stats.failed_flushes, 1);
        assert_eq!(stats.flushes, 0);
        assert_eq!(stats.batched_invalidations, 1);

        engine.backend().recover();
        assert_eq!(engine.flush_pending().await.unwrap(), 2);
        assert!(engine.backend().inner.is_empty());

        let stats = engine.get_stats();
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.batched_invalidations, 3);
    }

    #[tokio::test]
    async fn test_immediate_backend_error_propagates() {
        let backend = FlakyBackend::default();
        backend.fail_on("pricing");
        let engine = InvalidationEngine::new(backend);
        engine.register_rule(immediate("pricing", "product", "pricing")).unwrap();

        let err = engine
            .invalidate_by_write("product", None, "update")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "backend error: tag `pricing` unavailable");
        assert_eq!(engine.get_stats().rule("pricing").unwrap().execution_count, 0);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("a:1", "v", ["a"]);
        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_secs(60)),
        );

        engine.schedule_batch_invalidation(["a"], no_keys());
        assert!(engine.has_pending_timer());

        assert_eq!(engine.shutdown().await.unwrap(), 1);
        assert!(!engine.has_pending_timer());
        assert!(engine.backend().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_can_discard() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("a:1", "v", ["a"]);
        let engine =
            InvalidationEngine::with_config(backend, EngineConfig::default().discard_on_shutdown());

        engine.schedule_batch_invalidation(["a"], no_keys());
        assert_eq!(engine.shutdown().await.unwrap(), 0);
        assert_eq!(engine.pending_len(), (0, 0));
        assert!(engine.backend().contains("a:1"));
    }

    #[test]
    fn test_schedule_without_runtime() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("a:1", "v", ["a"]);
        let engine = InvalidationEngine::new(backend);

        engine.schedule_batch_invalidation(["a"], no_keys());
        assert_eq!(engine.pending_len(), (1, 0));
        assert!(!engine.has_pending_timer());

        let count = tokio_test::block_on(engine.flush_pending()).unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_stats_snapshot() {
        let backend = MemoryBackend::with_defaults();
        backend.insert("pricing:1", "p", ["pricing"]);
        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_secs(60)),
        );
        engine.register_rule(immediate("pricing", "product", "pricing")).unwrap();
        engine
            .register_rule(
                InvalidationRule::builder("search")
                    .trigger("product")
                    .invalidate("search")
                    .priority(10)
                    .batched()
                    .build()
                    .unwrap(),
            )
            .unwrap();
        engine.register_relationship(DataRelationship::one_to_many("product", ["review"]));

        engine.invalidate_by_write("product", Some("1"), "update").await.unwrap();

        let stats = engine.get_stats();
        assert_eq!(stats.rules, 2);
        assert_eq!(stats.relationships, 1);
        assert_eq!(stats.pending_tags, 1);
        assert_eq!(stats.batch_delay_ms, 60_000);
        assert_eq!(stats.immediate_invalidations, 1);
        assert_eq!(stats.total_invalidations, 1);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["rule_details"][0]["name"], "search");
        assert_eq!(json["rule_details"][0]["strategy"], "batched");
        assert_eq!(json["rule_details"][1]["total_invalidated"], 1);

        engine.reset_stats();
        let stats = engine.get_stats();
        assert_eq!(stats.total_invalidations, 0);
        assert_eq!(stats.rule("pricing").unwrap().execution_count, 0);
        assert_eq!(stats.pending_tags, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_merge_into_one_batch() {
        let backend = MemoryBackend::with_defaults();
        for i in 0..32 {
            backend.insert(format!("product:{}", i), "v", [format!("product:{}", i)]);
        }
        let engine = InvalidationEngine::with_config(
            backend,
            EngineConfig::with_batch_delay(Duration::from_secs(60)),
        );

        let mut handles = Vec::new();
        for i in 0..32 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.schedule_batch_invalidation([format!("product:{}", i)], no_keys());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(engine.pending_len(), (32, 0));
        assert_eq!(engine.flush_pending().await.unwrap(), 32);
        assert!(engine.backend().is_empty());
    }
}
