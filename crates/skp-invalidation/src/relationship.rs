//! Declared relationships between entity types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cardinality of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    OneToOne,
    #[default]
    OneToMany,
    ManyToMany,
}

/// Writes to `source_type` make cached data of every `target_types` entry stale
///
/// # Example
/// ```
/// use skp_invalidation::DataRelationship;
///
/// let rel = DataRelationship::one_to_many("product", ["pricing", "search"]);
/// let tags = rel.related_tags("42");
/// assert!(tags.contains("pricing"));
/// assert!(tags.contains("pricing:42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRelationship {
    source_type: String,
    target_types: BTreeSet<String>,
    relationship_type: RelationshipType,
    cascade_depth: usize,
}

impl DataRelationship {
    /// Create a relationship with a cascade depth of 1
    pub fn new<I, S>(
        source_type: impl Into<String>,
        target_types: I,
        relationship_type: RelationshipType,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_type: source_type.into(),
            target_types: target_types.into_iter().map(Into::into).collect(),
            relationship_type,
            cascade_depth: 1,
        }
    }

    pub fn one_to_one<I, S>(source_type: impl Into<String>, target_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(source_type, target_types, RelationshipType::OneToOne)
    }

    pub fn one_to_many<I, S>(source_type: impl Into<String>, target_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(source_type, target_types, RelationshipType::OneToMany)
    }

    pub fn many_to_many<I, S>(source_type: impl Into<String>, target_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(source_type, target_types, RelationshipType::ManyToMany)
    }

    /// Set how many hops a cascade may follow from `source_type`
    pub fn with_cascade_depth(mut self, depth: usize) -> Self {
        self.cascade_depth = depth;
        self
    }

    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    pub fn target_types(&self) -> &BTreeSet<String> {
        &self.target_types
    }

    pub fn relationship_type(&self) -> RelationshipType {
        self.relationship_type
    }

    pub fn cascade_depth(&self) -> usize {
        self.cascade_depth
    }

    /// Tags made stale by a write to entity `id` of the source type
    ///
    /// Every target type, both bare and qualified with the id.
    pub fn related_tags(&self, id: &str) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        for target in &self.target_types {
            tags.insert(target.clone());
            tags.insert(format!("{}:{}", target, id));
        }
        tags
    }
}
