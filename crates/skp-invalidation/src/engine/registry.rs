//! Rule registry and relationship index

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use skp_invalidation_core::{InvalidationError, Result};

use crate::relationship::DataRelationship;
use crate::rule::InvalidationRule;

/// Registered policy: rules in priority order plus the relationship index
#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// Sorted by priority, highest first; ties keep registration order
    rules: Vec<Arc<InvalidationRule>>,
    relationships: Vec<DataRelationship>,
    /// source_type -> positions in `relationships`
    by_source: HashMap<String, Vec<usize>>,
}

impl Registry {
    pub(crate) fn add_rule(&mut self, rule: InvalidationRule) -> Result<Arc<InvalidationRule>> {
        if self.rules.iter().any(|r| r.name() == rule.name()) {
            return Err(InvalidationError::DuplicateRule(rule.name().to_string()));
        }
        let rule = Arc::new(rule);
        let pos = self
            .rules
            .partition_point(|r| r.priority() >= rule.priority());
        self.rules.insert(pos, rule.clone());
        Ok(rule)
    }

    pub(crate) fn remove_rule(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.name() != name);
        self.rules.len() != before
    }

    pub(crate) fn rule(&self, name: &str) -> Option<Arc<InvalidationRule>> {
        self.rules.iter().find(|r| r.name() == name).cloned()
    }

    pub(crate) fn rules(&self) -> &[Arc<InvalidationRule>] {
        &self.rules
    }

    /// Rules triggered by a write to `resource_type`, in execution order
    pub(crate) fn candidates(&self, resource_type: &str) -> Vec<Arc<InvalidationRule>> {
        self.rules
            .iter()
            .filter(|r| r.matches(resource_type))
            .cloned()
            .collect()
    }

    pub(crate) fn add_relationship(&mut self, relationship: DataRelationship) {
        let pos = self.relationships.len();
        self.by_source
            .entry(relationship.source_type().to_string())
            .or_default()
            .push(pos);
        self.relationships.push(relationship);
    }

    pub(crate) fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub(crate) fn relationships_from(&self, source_type: &str) -> Vec<DataRelationship> {
        self.outgoing(source_type).cloned().collect()
    }

    fn outgoing<'a>(&'a self, source_type: &str) -> impl Iterator<Item = &'a DataRelationship> {
        self.by_source
            .get(source_type)
            .into_iter()
            .flatten()
            .map(|&i| &self.relationships[i])
    }

    /// Breadth-first closure of tags reachable from `start` within `depth` hops
    ///
    /// Each visited type contributes its bare tag and, when `id` is given, the
    /// id-qualified tag. `extra` relationships are followed alongside the
    /// registered ones. Types are visited once, so cycles terminate.
    pub(crate) fn walk(
        &self,
        start: &str,
        id: Option<&str>,
        depth: usize,
        extra: &[DataRelationship],
    ) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        push_type_tags(&mut tags, start, id);

        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut frontier: Vec<&str> = vec![start];

        for _ in 0..depth {
            let mut next = Vec::new();
            for &ty in &frontier {
                let local = extra.iter().filter(|r| r.source_type() == ty);
                for rel in self.outgoing(ty).chain(local) {
                    for target in rel.target_types() {
                        if visited.insert(target.as_str()) {
                            push_type_tags(&mut tags, target, id);
                            next.push(target.as_str());
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        tags
    }
}

fn push_type_tags(tags: &mut BTreeSet<String>, ty: &str, id: Option<&str>) {
    tags.insert(ty.to_string());
    if let Some(id) = id {
        tags.insert(format!("{}:{}", ty, id));
    }
}
