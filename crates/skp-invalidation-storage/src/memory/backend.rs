//! In-memory tagged store using DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use skp_invalidation_core::{InvalidationBackend, Result};

/// Configuration for the memory backend
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Number of entries to preallocate
    pub initial_capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1_024,
        }
    }
}

impl MemoryConfig {
    /// Create config with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
        }
    }
}

/// Operation counters for the memory backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Number of inserts
    pub writes: u64,
    /// Entries removed, by key or by tag
    pub deletes: u64,
    /// Calls to `delete_by_tag`
    pub tag_deletes: u64,
    /// Calls to `keys`
    pub key_scans: u64,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: Vec<u8>,
    tags: HashSet<String>,
}

/// Tag index for tag-based lookups
type TagIndex = DashMap<String, HashSet<String>>;

/// In-memory tagged store
///
/// Holds opaque byte values stamped with tags. It has no TTL or eviction;
/// entries disappear only when deleted or invalidated.
/// Cloning creates a new handle to the SAME underlying store.
#[derive(Clone)]
pub struct MemoryBackend {
    /// Main data store
    data: Arc<DashMap<String, StoredEntry>>,
    /// Tag -> keys index
    tag_index: Arc<TagIndex>,
    /// Statistics
    stats: Arc<RwLock<MemoryStats>>,
}

impl MemoryBackend {
    /// Create a new memory backend
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            data: Arc::new(DashMap::with_capacity(config.initial_capacity)),
            tag_index: Arc::new(DashMap::new()),
            stats: Arc::new(RwLock::new(MemoryStats::default())),
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(MemoryConfig::default())
    }

    /// Store `value` under `key`, stamped with `tags`
    ///
    /// Replacing an existing key replaces its tags as well.
    pub fn insert<I, S>(&self, key: impl Into<String>, value: impl Into<Vec<u8>>, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let tags: HashSet<String> = tags.into_iter().map(Into::into).collect();

        self.unindex(&key);
        for tag in &tags {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }

        self.data.insert(
            key,
            StoredEntry {
                value: value.into(),
                tags,
            },
        );
        self.stats.write().writes += 1;
    }

    /// Get a copy of the value stored under `key`
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data.get(key).map(|entry| entry.value.clone())
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Tags stamped on `key`
    pub fn tags_of(&self, key: &str) -> Option<HashSet<String>> {
        self.data.get(key).map(|entry| entry.tags.clone())
    }

    /// Keys currently stamped with `tag`
    pub fn keys_with_tag(&self, tag: &str) -> Vec<String> {
        self.tag_index
            .get(tag)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.data.clear();
        self.tag_index.clear();
    }

    /// Snapshot of the operation counters
    pub fn stats(&self) -> MemoryStats {
        *self.stats.read()
    }

    /// Number of tags that index at least one key
    pub fn tag_count(&self) -> usize {
        self.tag_index.len()
    }

    /// Drop `key` from the tag index entries of its current tags
    fn unindex(&self, key: &str) {
        let tags = match self.data.get(key) {
            Some(entry) => entry.tags.clone(),
            None => return,
        };
        self.unlink(key, &tags);
    }

    /// Remove `key` from each of `tags`, pruning sets that become empty
    fn unlink(&self, key: &str, tags: &HashSet<String>) {
        for tag in tags {
            // The shard guard must be released before remove_if locks it again
            if let Some(mut keys) = self.tag_index.get_mut(tag) {
                keys.remove(key);
            }
            self.tag_index.remove_if(tag, |_, keys| keys.is_empty());
        }
    }

    /// Remove an entry and clean up indexes
    fn remove_entry(&self, key: &str) -> bool {
        if let Some((_, entry)) = self.data.remove(key) {
            self.unlink(key, &entry.tags);
            self.stats.write().deletes += 1;
            true
        } else {
            false
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl InvalidationBackend for MemoryBackend {
    async fn delete_by_tag(&self, tag: &str) -> Result<u64> {
        self.stats.write().tag_deletes += 1;

        // Take the index entry first so no guard is held while removing
        let Some((_, keys)) = self.tag_index.remove(tag) else {
            return Ok(0);
        };

        let mut count = 0;
        for key in keys {
            if self.remove_entry(&key) {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.remove_entry(key))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.stats.write().key_scans += 1;
        Ok(self.data.iter().map(|entry| entry.key().clone()).collect())
    }
}
