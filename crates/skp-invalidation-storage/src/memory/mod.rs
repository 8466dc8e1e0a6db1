//! In-memory tagged store

mod backend;

pub use backend::{MemoryBackend, MemoryConfig, MemoryStats};
