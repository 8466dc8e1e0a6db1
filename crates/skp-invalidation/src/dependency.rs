//! Key-level "derived from" edges

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Default)]
struct Edges {
    /// key -> keys it was computed from
    depends_on: HashMap<String, HashSet<String>>,
    /// key -> keys computed from it
    dependents: HashMap<String, HashSet<String>>,
}

/// Explicit dependency graph between cache keys
///
/// `add("C2", ["C1"])` records that the entry under `C2` was computed from
/// `C1`, so invalidating `C1` makes `C2` stale. Cycles are allowed.
#[derive(Debug, Default)]
pub struct DependencyTracker {
    edges: RwLock<Edges>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` was derived from each of `depends_on`
    ///
    /// Edges accumulate across calls.
    pub fn add<I, S>(&self, key: impl Into<String>, depends_on: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let mut edges = self.edges.write();
        for source in depends_on {
            let source = source.into();
            edges
                .dependents
                .entry(source.clone())
                .or_default()
                .insert(key.clone());
            edges.depends_on.entry(key.clone()).or_default().insert(source);
        }
    }

    /// Forget every edge touching `key`
    ///
    /// Returns `true` if the key had any edges.
    pub fn remove(&self, key: &str) -> bool {
        let mut edges = self.edges.write();
        let sources = edges.depends_on.remove(key);
        let derived = edges.dependents.remove(key);

        for source in sources.iter().flatten() {
            if let Some(set) = edges.dependents.get_mut(source) {
                set.remove(key);
                if set.is_empty() {
                    edges.dependents.remove(source);
                }
            }
        }
        for dependent in derived.iter().flatten() {
            if let Some(set) = edges.depends_on.get_mut(dependent) {
                set.remove(key);
                if set.is_empty() {
                    edges.depends_on.remove(dependent);
                }
            }
        }

        sources.is_some() || derived.is_some()
    }

    /// Keys `key` was derived from
    pub fn dependencies_of(&self, key: &str) -> HashSet<String> {
        self.edges
            .read()
            .depends_on
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Keys derived directly from `key`
    pub fn dependents_of(&self, key: &str) -> HashSet<String> {
        self.edges
            .read()
            .dependents
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of keys with recorded dependencies
    pub fn len(&self) -> usize {
        self.edges.read().depends_on.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut edges = self.edges.write();
        edges.depends_on.clear();
        edges.dependents.clear();
    }

    /// Keys to invalidate when `key` goes stale, `key` first
    ///
    /// When `recursive`, this is the fixed point of "any key derived from an
    /// already-stale key is stale", in breadth-first order. Each key appears
    /// once even on cyclic graphs.
    pub fn closure(&self, key: &str, recursive: bool) -> Vec<String> {
        let mut order = vec![key.to_string()];
        if !recursive {
            return order;
        }

        let edges = self.edges.read();
        let mut visited: HashSet<&str> = HashSet::from([key]);
        let mut queue: VecDeque<&str> = VecDeque::from([key]);

        while let Some(current) = queue.pop_front() {
            let Some(derived) = edges.dependents.get(current) else {
                continue;
            };
            let mut next: Vec<&str> = derived
                .iter()
                .map(String::as_str)
                .filter(|k| !visited.contains(k))
                .collect();
            // HashSet order is arbitrary; keep the output stable
            next.sort_unstable();
            for k in next {
                visited.insert(k);
                order.push(k.to_string());
                queue.push_back(k);
            }
        }

        order
    }
}
