//! Write notifications

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of authoritative write that triggered invalidation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum WriteOperation {
    Create,
    #[default]
    Update,
    Delete,
    /// Application-defined operation name
    Custom(String),
}

impl WriteOperation {
    /// Get operation as string label
    pub fn as_str(&self) -> &str {
        match self {
            WriteOperation::Create => "create",
            WriteOperation::Update => "update",
            WriteOperation::Delete => "delete",
            WriteOperation::Custom(name) => name,
        }
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for WriteOperation {
    fn from(s: &str) -> Self {
        match s {
            "create" => WriteOperation::Create,
            "update" => WriteOperation::Update,
            "delete" => WriteOperation::Delete,
            other => WriteOperation::Custom(other.to_string()),
        }
    }
}

impl FromStr for WriteOperation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(WriteOperation::from(s))
    }
}

/// Everything a rule sees about the write it is reacting to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvalidationContext {
    /// Entity type that was written, e.g. `"product"`
    pub resource_type: String,
    /// Identifier of the written entity, if known
    pub resource_id: Option<String>,
    /// What kind of write happened
    pub operation: WriteOperation,
    /// Caller-supplied extra fields
    pub extra: BTreeMap<String, String>,
}

impl InvalidationContext {
    /// Create a context for an update of `resource_type` with no id
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    /// Set the resource id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    /// Set the operation
    pub fn with_operation(mut self, operation: impl Into<WriteOperation>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Add an extra field
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up an extra field
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    /// `"{resource_type}:{resource_id}"` when an id is present
    pub fn entity_tag(&self) -> Option<String> {
        self.resource_id
            .as_ref()
            .map(|id| format!("{}:{}", self.resource_type, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_parse() {
        assert_eq!(WriteOperation::from("create"), WriteOperation::Create);
        assert_eq!(WriteOperation::from("delete"), WriteOperation::Delete);
        assert_eq!(
            "archive".parse::<WriteOperation>().unwrap(),
            WriteOperation::Custom("archive".into())
        );
        assert_eq!(WriteOperation::default(), WriteOperation::Update);
        assert_eq!(WriteOperation::Custom("archive".into()).as_str(), "archive");
    }

    #[test]
    fn test_context_builder() {
        let ctx = InvalidationContext::new("product")
            .with_id("42")
            .with_operation("delete")
            .with_extra("actor", "admin");

        assert_eq!(ctx.operation, WriteOperation::Delete);
        assert_eq!(ctx.extra("actor"), Some("admin"));
        assert_eq!(ctx.entity_tag().as_deref(), Some("product:42"));
        assert_eq!(InvalidationContext::new("product").entity_tag(), None);
    }
}
