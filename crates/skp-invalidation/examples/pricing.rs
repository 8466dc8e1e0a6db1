use skp_invalidation::prelude::*;
use skp_invalidation::TracingMetrics;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing subscriber
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    // 2. Populate a store the way a web shop would
    let backend = MemoryBackend::new(MemoryConfig::default());
    backend.insert("pricing:42", "19.99", ["pricing", "product:42"]);
    backend.insert("product:42:page", "<html>", ["product:42"]);
    backend.insert("review:42:list", "[]", ["review:42"]);
    backend.insert("search:shoes", "[42]", ["search"]);
    backend.insert("user:7:session:web", "s", Vec::<String>::new());

    let metrics = TracingMetrics::new().with_service_name("pricing-example");
    let engine = InvalidationEngine::with_metrics(
        backend.clone(),
        metrics,
        EngineConfig::with_batch_delay(Duration::from_millis(200)),
    );

    // 3. Declare policy once at start-up
    engine.register_relationship(DataRelationship::one_to_many("product", ["review"]));

    engine.register_rule(
        InvalidationRule::builder("pricing_on_delete")
            .trigger("product")
            .invalidate("pricing")
            .condition(Condition::on_delete())
            .priority(100)
            .build()?,
    )?;
    engine.register_rule(
        InvalidationRule::builder("product_graph")
            .trigger("product")
            .cascade()
            .priority(50)
            .build()?,
    )?;
    engine.register_rule(
        InvalidationRule::builder("search_index")
            .trigger("product")
            .invalidate("search")
            .batched()
            .build()?,
    )?;
    engine.register_rule(
        InvalidationRule::builder("sessions")
            .trigger("user")
            .pattern(r"user:\d+:session:")
            .build()?,
    )?;

    // 4. Report writes
    println!("\n⚡ Updating product 42...");
    let removed = engine
        .invalidate_by_write("product", Some("42"), "update")
        .await?;
    println!("   Removed now: {}, pricing still cached: {}", removed, backend.contains("pricing:42"));

    println!("\n⚡ Deleting product 42...");
    engine
        .invalidate_by_write("product", Some("42"), WriteOperation::Delete)
        .await?;
    println!("   Pricing cached: {}", backend.contains("pricing:42"));

    println!("\n⚡ Updating user 7...");
    engine.invalidate_by_write("user", Some("7"), "update").await?;

    println!("\n⏳ Waiting for the batched search flush...");
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("   Search cached: {}", backend.contains("search:shoes"));

    let stats = engine.get_stats();
    println!("\n📊 Stats:");
    for rule in &stats.rule_details {
        println!(
            "   {:<18} priority={:<4} strategy={:<9} runs={} removed={}",
            rule.name, rule.priority, rule.strategy, rule.execution_count, rule.total_invalidated
        );
    }
    println!(
        "   total={} immediate={} cascade={} batched={}",
        stats.total_invalidations,
        stats.immediate_invalidations,
        stats.cascade_invalidations,
        stats.batched_invalidations
    );

    engine.shutdown().await?;
    Ok(())
}
