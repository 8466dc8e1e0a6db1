//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`InvalidationEngine`](crate::InvalidationEngine)
///
/// Deserializable so it can live in an application config file:
///
/// ```toml
/// [invalidation]
/// batch_delay_ms = 250
/// default_cascade_depth = 2
/// flush_on_shutdown = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Debounce window: a batch flushes this long after its last addition
    #[serde(rename = "batch_delay_ms", with = "millis")]
    pub batch_delay: Duration,
    /// Hops followed by cascade rules that carry no relationships of their own
    pub default_cascade_depth: usize,
    /// Flush the pending batch in `shutdown()` instead of discarding it
    pub flush_on_shutdown: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_delay: Duration::from_millis(100),
            default_cascade_depth: 3,
            flush_on_shutdown: true,
        }
    }
}

impl EngineConfig {
    /// Create config with specific batch delay
    pub fn with_batch_delay(delay: Duration) -> Self {
        Self {
            batch_delay: delay,
            ..Default::default()
        }
    }

    /// Set the cascade depth used when a rule declares none
    pub fn default_cascade_depth(mut self, depth: usize) -> Self {
        self.default_cascade_depth = depth;
        self
    }

    /// Discard instead of flushing on shutdown
    pub fn discard_on_shutdown(mut self) -> Self {
        self.flush_on_shutdown = false;
        self
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
