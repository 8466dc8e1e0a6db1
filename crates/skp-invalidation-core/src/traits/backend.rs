//! Cache contract consumed by the invalidation engine

use async_trait::async_trait;
use std::sync::Arc;

use crate::InvalidationError;

/// Operations the invalidation engine needs from a cache store
///
/// The engine never reads or writes cached values. It only removes entries,
/// either by tag or by key, and scans the key space for pattern rules.
#[async_trait]
pub trait InvalidationBackend: Send + Sync + 'static {
    /// Delete all entries stamped with `tag`
    ///
    /// Returns the number of entries removed.
    async fn delete_by_tag(&self, tag: &str) -> Result<u64, InvalidationError>;

    /// Delete a key from the cache
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> Result<bool, InvalidationError>;

    /// List every key currently held by the cache
    async fn keys(&self) -> Result<Vec<String>, InvalidationError>;

    /// Delete all entries stamped with any of `tags`
    ///
    /// Returns the total number of entries removed.
    async fn delete_many_tags(&self, tags: &[&str]) -> Result<u64, InvalidationError> {
        let mut count = 0;
        for tag in tags {
            count += self.delete_by_tag(tag).await?;
        }
        Ok(count)
    }

    /// Delete multiple keys
    ///
    /// Returns the number of keys that were deleted.
    async fn delete_many(&self, keys: &[&str]) -> Result<u64, InvalidationError> {
        let mut count = 0;
        for key in keys {
            if self.delete(key).await? {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl<T> InvalidationBackend for Arc<T>
where
    T: InvalidationBackend + ?Sized,
{
    async fn delete_by_tag(&self, tag: &str) -> Result<u64, InvalidationError> {
        (**self).delete_by_tag(tag).await
    }

    async fn delete(&self, key: &str) -> Result<bool, InvalidationError> {
        (**self).delete(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, InvalidationError> {
        (**self).keys().await
    }

    async fn delete_many_tags(&self, tags: &[&str]) -> Result<u64, InvalidationError> {
        (**self).delete_many_tags(tags).await
    }

    async fn delete_many(&self, keys: &[&str]) -> Result<u64, InvalidationError> {
        (**self).delete_many(keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecBackend {
        entries: Mutex<HashMap<String, HashSet<String>>>,
    }

    impl VecBackend {
        fn with(entries: &[(&str, Option<&str>)]) -> Self {
            let backend = Self::default();
            {
                let mut map = backend.entries.lock().unwrap();
                for (key, tag) in entries {
                    map.insert(key.to_string(), tag.iter().map(|t| t.to_string()).collect());
                }
            }
            backend
        }
    }

    #[async_trait]
    impl InvalidationBackend for VecBackend {
        async fn delete_by_tag(&self, tag: &str) -> Result<u64, InvalidationError> {
            let mut map = self.entries.lock().unwrap();
            let before = map.len();
            map.retain(|_, tags| !tags.contains(tag));
            Ok((before - map.len()) as u64)
        }

        async fn delete(&self, key: &str) -> Result<bool, InvalidationError> {
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        async fn keys(&self) -> Result<Vec<String>, InvalidationError> {
            Ok(self.entries.lock().unwrap().keys().cloned().collect())
        }
    }

    #[tokio::test]
    async fn test_default_delete_many_tags() {
        let backend = VecBackend::with(&[("a", Some("x")), ("b", Some("y")), ("c", Some("z"))]);
        let removed = backend.delete_many_tags(&["x", "y", "missing"]).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(backend.keys().await.unwrap(), vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_default_delete_many() {
        let backend = VecBackend::with(&[("a", None), ("b", None)]);
        let removed = backend.delete_many(&["a", "b", "c"]).await.unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_arc_dyn_forwarding() {
        let backend: Arc<dyn InvalidationBackend> =
            Arc::new(VecBackend::with(&[("a", Some("x"))]));
        assert_eq!(backend.delete_by_tag("x").await.unwrap(), 1);
        assert!(!backend.delete("a").await.unwrap());
    }
}
