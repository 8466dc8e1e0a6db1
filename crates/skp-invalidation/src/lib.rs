//! skp-invalidation: Tagged, rule-driven cache invalidation for Rust
//!
//! # Features
//!
//! - **Rules** keyed by trigger tags, with priorities and guard conditions
//! - **Strategies**: immediate, cascade through data relationships, batched
//! - **Debounced batching**: many writes collapse into one flush
//! - **Key dependencies** with recursive invalidation
//! - **Metrics integration**
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use skp_invalidation::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let backend = MemoryBackend::new(MemoryConfig::default());
//!     backend.insert("catalog:page:1", "<html>", ["catalog"]);
//!
//!     let engine = InvalidationEngine::new(backend);
//!     engine.register_rule(
//!         InvalidationRule::builder("product_pages")
//!             .trigger("product")
//!             .invalidate("catalog")
//!             .priority(100)
//!             .build()?,
//!     )?;
//!
//!     let removed = engine.invalidate_by_write("product", Some("42"), "update").await?;
//!     println!("Invalidated {} entries", removed);
//!
//!     engine.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod dependency;
mod engine;
pub mod global;
mod relationship;
mod rule;

// Re-export core
pub use skp_invalidation_core::*;

// Re-export storage
#[cfg(feature = "memory")]
pub use skp_invalidation_storage::{MemoryBackend, MemoryConfig, MemoryStats};

pub use config::EngineConfig;
pub use dependency::DependencyTracker;
pub use engine::InvalidationEngine;
pub use relationship::{DataRelationship, RelationshipType};
pub use rule::{Condition, InvalidationRule, InvalidationRuleBuilder, InvalidationStrategy};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Condition, DataRelationship, EngineConfig, InvalidationBackend, InvalidationContext,
        InvalidationEngine, InvalidationError, InvalidationRule, InvalidationStats,
        InvalidationStrategy, RelationshipType, Result, StrategyKind, WriteOperation,
    };

    #[cfg(feature = "memory")]
    pub use crate::{MemoryBackend, MemoryConfig};
}

#[cfg(test)]
mod tests;
