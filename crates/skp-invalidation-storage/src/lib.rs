//! skp-invalidation-storage: Reference store for skp-invalidation

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "memory")]
pub use memory::{MemoryBackend, MemoryConfig, MemoryStats};
