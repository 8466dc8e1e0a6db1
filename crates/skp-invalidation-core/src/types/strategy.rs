//! Strategy labels

use serde::Serialize;
use std::fmt;

/// How a rule's invalidation is carried out
///
/// Field-less mirror of the engine's strategy union, used for stats and
/// metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Synchronous, at write time
    Immediate,
    /// Synchronous, following declared relationships
    Cascade,
    /// Deferred into the debounced pending batch
    Batched,
}

impl StrategyKind {
    /// Get strategy as string label
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Immediate => "immediate",
            StrategyKind::Cascade => "cascade",
            StrategyKind::Batched => "batched",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
