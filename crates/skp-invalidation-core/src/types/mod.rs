//! Core types for invalidation

mod context;
mod stats;
mod strategy;

pub use context::{InvalidationContext, WriteOperation};
pub use stats::{InvalidationStats, RuleDetail};
pub use strategy::StrategyKind;
