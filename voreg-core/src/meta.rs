//! The hierarchical, multi-valued metadata store the document builders read.
//!
//! A key maps to a sequence of [`MetaValue`]s in source order; each value
//! carries a scalar plus named children (side attributes such as a date's
//! `role`, or nested sub-metadata such as a creator's `name` and `logo`).
//! Lookups take dotted paths and optionally propagate to a broader containing
//! scope when the local scope has nothing for the key.

use crate::error::BuildError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One metadata value: a scalar plus named sub-values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaValue {
    pub content: String,
    children: BTreeMap<String, Vec<MetaValue>>,
}

impl MetaValue {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            children: BTreeMap::new(),
        }
    }

    /// Attach a child value under `key`; chainable for literal construction.
    pub fn with(mut self, key: impl Into<String>, child: impl Into<MetaValue>) -> Self {
        self.children.entry(key.into()).or_default().push(child.into());
        self
    }

    /// Content of the first child under `key`, if any.
    pub fn child_text(&self, key: &str) -> Option<&str> {
        self.children
            .get(key)
            .and_then(|vs| vs.first())
            .map(|v| v.content.as_str())
            .filter(|s| !s.is_empty())
    }
}

impl From<&str> for MetaValue {
    fn from(content: &str) -> Self {
        MetaValue::new(content)
    }
}

impl From<String> for MetaValue {
    fn from(content: String) -> Self {
        MetaValue::new(content)
    }
}

/// Read access to a metadata scope.
///
/// `values` returns everything under a (possibly dotted) key in source order;
/// the sequence is finite and a repeated call yields the same result.
pub trait MetaScope {
    fn values(&self, key: &str, propagate: bool) -> Vec<MetaValue>;

    fn first(&self, key: &str, propagate: bool) -> Option<MetaValue> {
        self.values(key, propagate).into_iter().next()
    }

    /// First non-empty scalar under `key`.
    fn text(&self, key: &str, propagate: bool) -> Option<String> {
        self.values(key, propagate)
            .into_iter()
            .map(|v| v.content)
            .find(|s| !s.is_empty())
    }

    fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key, true).unwrap_or_else(|| default.to_string())
    }

    /// Like [`MetaScope::text`] with propagation, but absence is an error.
    fn required_text(&self, key: &str) -> Result<String, BuildError> {
        self.text(key, true)
            .ok_or_else(|| BuildError::MissingMeta(key.to_string()))
    }
}

/// A metadata scope with an optional broader parent scope.
///
/// Resources carry one of these; a resource's block may name its collection's
/// block as parent, which is what `propagate` lookups walk to.
#[derive(Debug, Clone, Default)]
pub struct MetaBlock {
    entries: BTreeMap<String, Vec<MetaValue>>,
    parent: Option<Arc<MetaBlock>>,
}

impl MetaBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Arc<MetaBlock>) -> Self {
        Self {
            entries: BTreeMap::new(),
            parent: Some(parent),
        }
    }

    /// Append a value under `key`. A dotted key descends, creating
    /// intermediate values as needed.
    pub fn add(&mut self, key: &str, value: impl Into<MetaValue>) {
        match key.split_once('.') {
            None => self.entries.entry(key.to_string()).or_default().push(value.into()),
            Some((head, rest)) => {
                let slot = self.entries.entry(head.to_string()).or_default();
                if slot.is_empty() {
                    slot.push(MetaValue::default());
                }
                // descend into the most recent value under `head`
                let last = slot.last_mut().expect("slot is non-empty");
                add_to_value(last, rest, value.into());
            }
        }
    }

    /// Replace everything under `key` with a single scalar.
    pub fn set(&mut self, key: &str, content: impl Into<String>) {
        self.entries
            .insert(key.to_string(), vec![MetaValue::new(content)]);
    }

    /// Chainable [`MetaBlock::add`], for literal construction.
    pub fn with(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.add(key, value);
        self
    }

    fn local_values(&self, key: &str) -> Vec<MetaValue> {
        match key.split_once('.') {
            None => self.entries.get(key).cloned().unwrap_or_default(),
            Some((head, rest)) => self
                .entries
                .get(head)
                .map(|vs| vs.iter().flat_map(|v| v.values(rest, false)).collect())
                .unwrap_or_default(),
        }
    }
}

fn add_to_value(value: &mut MetaValue, key: &str, new: MetaValue) {
    match key.split_once('.') {
        None => value.children.entry(key.to_string()).or_default().push(new),
        Some((head, rest)) => {
            let slot = value.children.entry(head.to_string()).or_default();
            if slot.is_empty() {
                slot.push(MetaValue::default());
            }
            let last = slot.last_mut().expect("slot is non-empty");
            add_to_value(last, rest, new);
        }
    }
}

impl MetaScope for MetaBlock {
    fn values(&self, key: &str, propagate: bool) -> Vec<MetaValue> {
        let local = self.local_values(key);
        if !local.is_empty() {
            return local;
        }
        if propagate {
            if let Some(parent) = &self.parent {
                return parent.values(key, true);
            }
        }
        Vec::new()
    }
}

impl MetaScope for MetaValue {
    // a value's children form a scope of their own; there is nothing to
    // propagate to from here
    fn values(&self, key: &str, _propagate: bool) -> Vec<MetaValue> {
        match key.split_once('.') {
            None => self.children.get(key).cloned().unwrap_or_default(),
            Some((head, rest)) => self
                .children
                .get(head)
                .map(|vs| vs.iter().flat_map(|v| v.values(rest, false)).collect())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_values_keep_source_order() {
        let mut m = MetaBlock::new();
        m.add("subject", "galaxies");
        m.add("subject", "quasars");
        let got: Vec<_> = m
            .values("subject", false)
            .into_iter()
            .map(|v| v.content)
            .collect();
        assert_eq!(got, ["galaxies", "quasars"]);
    }

    #[test]
    fn dotted_paths_descend() {
        let mut m = MetaBlock::new();
        m.add("contact.name", "Ops Team");
        m.add("contact.email", "ops@example.org");
        assert_eq!(m.text("contact.email", false).unwrap(), "ops@example.org");
        // the intermediate value exists and scopes its children
        let contact = m.first("contact", false).unwrap();
        assert_eq!(contact.child_text("name").unwrap(), "Ops Team");
    }

    #[test]
    fn propagation_walks_parent_chain() {
        let mut collection = MetaBlock::new();
        collection.add("creator.name", "Survey Consortium");
        let shared = Arc::new(collection);
        let resource = MetaBlock::with_parent(shared);

        assert_eq!(
            resource.text("creator.name", true).unwrap(),
            "Survey Consortium"
        );
        assert!(resource.text("creator.name", false).is_none());
    }

    #[test]
    fn local_values_shadow_parent() {
        let parent = Arc::new(MetaBlock::new().with("title", "Collection Title"));
        let mut m = MetaBlock::with_parent(parent);
        m.add("title", "Resource Title");
        assert_eq!(m.text("title", true).unwrap(), "Resource Title");
    }

    #[test]
    fn required_text_reports_the_key() {
        let m = MetaBlock::new();
        let err = m.required_text("title").unwrap_err();
        assert!(err.to_string().contains("'title'"));
    }

    #[test]
    fn value_children_carry_attributes() {
        let v = MetaValue::new("2024-02-01").with("role", "updated");
        assert_eq!(v.child_text("role").unwrap(), "updated");
        assert!(v.child_text("missing").is_none());
    }
}
