//! skp-invalidation-core: Core traits and types for the skp-invalidation library
//!
//! This crate provides the cache contract consumed by the invalidation engine,
//! the metrics hooks, and the value types shared across the workspace.

mod error;
mod traits;
mod types;

pub use error::{InvalidationError, Result};
pub use traits::*;
pub use types::*;
