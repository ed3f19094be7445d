//! The typed document-tree primitive the assemblers produce.
//!
//! A [`Node`] knows its element identity (name plus namespace prefix key),
//! attributes, ordered children and emptiness rule. Empty nodes vanish from
//! their parent when the tree is finalized, so a handler can unconditionally
//! attach substructures and still end up with a schema-clean document.
//! Serialization collects the transitive prefix set and declares the
//! corresponding namespaces on the root element.

use crate::error::BuildError;
use crate::model;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeSet;

/// When a node counts as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Empty when it has no attributes, no text and no non-empty children.
    Standard,
    /// Never pruned; the schema explicitly allows the bare element.
    MayBeEmpty,
    /// Empty exactly when no non-empty child with the given name exists,
    /// whatever else the node carries.
    RequireChild(&'static str),
}

#[derive(Debug, Clone)]
pub struct Node {
    prefix: &'static str,
    name: &'static str,
    /// Local elements render unqualified; the prefix only feeds namespace
    /// bookkeeping on the document root.
    local: bool,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Node>,
    empty_policy: EmptyPolicy,
    child_order: Option<&'static [&'static str]>,
    extra_prefixes: &'static [&'static str],
}

/// Anything that can be attached as children: a node, an optional node, or a
/// whole sequence. `None` entries flatten away.
pub trait IntoNodes {
    fn into_nodes(self) -> Vec<Node>;
}

impl IntoNodes for Node {
    fn into_nodes(self) -> Vec<Node> {
        vec![self]
    }
}

impl IntoNodes for Option<Node> {
    fn into_nodes(self) -> Vec<Node> {
        self.into_iter().collect()
    }
}

impl IntoNodes for Vec<Node> {
    fn into_nodes(self) -> Vec<Node> {
        self
    }
}

impl Node {
    /// An unqualified element belonging to the namespace behind `prefix`.
    pub fn local(prefix: &'static str, name: &'static str) -> Self {
        Self {
            prefix,
            name,
            local: true,
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
            empty_policy: EmptyPolicy::Standard,
            child_order: None,
            extra_prefixes: &[],
        }
    }

    /// An element serialized with its prefix.
    pub fn qualified(prefix: &'static str, name: &'static str) -> Self {
        Self {
            local: false,
            ..Self::local(prefix, name)
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    // ── construction ──

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Attach an attribute only when a value is present.
    pub fn opt_attr(mut self, name: &str, value: Option<impl Into<String>>) -> Self {
        if let Some(v) = value {
            self.set_attr(name, v);
        }
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn push(&mut self, children: impl IntoNodes) {
        self.children.extend(children.into_nodes());
    }

    pub fn with(mut self, children: impl IntoNodes) -> Self {
        self.push(children);
        self
    }

    pub fn may_be_empty(mut self) -> Self {
        self.empty_policy = EmptyPolicy::MayBeEmpty;
        self
    }

    pub fn empty_unless_child(mut self, name: &'static str) -> Self {
        self.empty_policy = EmptyPolicy::RequireChild(name);
        self
    }

    /// Declare the schema-mandated child ordering for this element type.
    pub fn child_order(mut self, order: &'static [&'static str]) -> Self {
        self.child_order = Some(order);
        self
    }

    /// Namespace prefixes this element needs declared beyond its own
    /// (typically for `xsi:type` values).
    pub fn needs(mut self, prefixes: &'static [&'static str]) -> Self {
        self.extra_prefixes = prefixes;
        self
    }

    // ── emptiness and finalization ──

    pub fn is_empty(&self) -> bool {
        match self.empty_policy {
            EmptyPolicy::MayBeEmpty => false,
            EmptyPolicy::RequireChild(name) => !self
                .children
                .iter()
                .any(|c| c.name == name && !c.is_empty()),
            EmptyPolicy::Standard => {
                self.attrs.is_empty()
                    && self.text.is_none()
                    && self.children.iter().all(Node::is_empty)
            }
        }
    }

    /// Drop empty children transitively and apply declared child orderings.
    pub fn finalize(&mut self) {
        for child in &mut self.children {
            child.finalize();
        }
        self.children.retain(|c| !c.is_empty());
        if let Some(order) = self.child_order {
            // declared names first in declared order; the rest keep their
            // construction order behind them
            self.children.sort_by_key(|c| {
                order
                    .iter()
                    .position(|n| *n == c.name)
                    .unwrap_or(order.len())
            });
        }
    }

    fn collect_prefixes(&self, acc: &mut BTreeSet<&'static str>) {
        if !self.local {
            acc.insert(self.prefix);
        }
        for p in self.extra_prefixes {
            acc.insert(p);
        }
        for child in &self.children {
            child.collect_prefixes(acc);
        }
    }

    // ── serialization ──

    fn tag_name(&self) -> String {
        if self.local {
            self.name.to_string()
        } else {
            format!("{}:{}", self.prefix, self.name)
        }
    }

    fn write_into<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), BuildError> {
        let tag = self.tag_name();
        let mut start = BytesStart::new(tag.as_str());
        for (name, value) in &self.attrs {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.text.is_none() && self.children.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(|e| BuildError::Serialize(e.to_string()))?;
            return Ok(());
        }
        writer
            .write_event(Event::Start(start))
            .map_err(|e| BuildError::Serialize(e.to_string()))?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| BuildError::Serialize(e.to_string()))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(tag.as_str())))
            .map_err(|e| BuildError::Serialize(e.to_string()))?;
        Ok(())
    }

    /// Serialize as a standalone document: finalized tree, namespace and
    /// schema-location declarations on the root.
    pub fn to_xml(&self) -> Result<String, BuildError> {
        let mut tree = self.clone();
        tree.finalize();

        let mut prefixes = BTreeSet::new();
        tree.collect_prefixes(&mut prefixes);
        prefixes.insert(tree.prefix);

        let mut locations = Vec::new();
        for prefix in &prefixes {
            if let Some(ns) = model::namespace(prefix) {
                tree.set_attr(&format!("xmlns:{prefix}"), ns.uri);
                if !ns.schema.is_empty() {
                    locations.push(format!("{} {}", ns.uri, ns.schema));
                }
            }
        }
        if prefixes.contains("xsi") && !locations.is_empty() {
            tree.set_attr("xsi:schemaLocation", locations.join(" "));
        }

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        tree.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| BuildError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(text: &str) -> Node {
        Node::local("vr", "title").with_text(text)
    }

    #[test]
    fn standard_nodes_prune_transitively() {
        let doc = Node::local("vr", "curation")
            .with(Node::local("vr", "publisher"))
            .with(Node::local("vr", "creator").with(Node::local("vr", "name")));
        // nothing carries text or attributes anywhere below
        assert!(doc.is_empty());

        let mut doc = doc.with(title("NGC catalog"));
        assert!(!doc.is_empty());
        doc.finalize();
        assert_eq!(doc.children().len(), 1);
        assert_eq!(doc.children()[0].name(), "title");
    }

    #[test]
    fn attributes_alone_make_a_node_nonempty() {
        let n = Node::local("vr", "relatedResource").attr("ivo-id", "ivo://x/y");
        assert!(!n.is_empty());
    }

    #[test]
    fn may_be_empty_survives_finalize() {
        let mut doc = Node::qualified("oai", "ListSets")
            .may_be_empty()
            .with(Node::local("vr", "publisher"));
        doc.finalize();
        assert!(doc.children().is_empty());
        assert!(!doc.is_empty());
    }

    #[test]
    fn require_child_overrides_seeded_children() {
        // a relationship always carries its type, so plain emptiness would
        // never prune it
        let rel = Node::local("vr", "relationship")
            .empty_unless_child("relatedResource")
            .with(Node::local("vr", "relationshipType").with_text("Cites"));
        assert!(rel.is_empty());
        let rel = rel.with(
            Node::local("vr", "relatedResource").with_text("ivo://example/other"),
        );
        assert!(!rel.is_empty());
    }

    #[test]
    fn option_children_flatten_away() {
        let mut doc = Node::local("vr", "content");
        doc.push(None::<Node>);
        doc.push(Some(title("x")));
        doc.push(vec![title("y"), title("z")]);
        assert_eq!(doc.children().len(), 3);
    }

    #[test]
    fn declared_order_is_applied_stably() {
        let mut table = Node::local("vs", "table")
            .child_order(&["name", "title", "description", "utype", "nrows", "column"])
            .with(Node::local("vs", "column").with_text("ra"))
            .with(Node::local("vs", "name").with_text("dr3.main"))
            .with(Node::local("vs", "column").with_text("dec"))
            .with(Node::local("vs", "title").with_text("Main table"));
        table.finalize();
        let names: Vec<_> = table.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["name", "title", "column", "column"]);
        let cols: Vec<_> = table
            .children()
            .iter()
            .filter(|c| c.name() == "column")
            .map(|c| c.text().unwrap())
            .collect();
        assert_eq!(cols, ["ra", "dec"]);
    }

    #[test]
    fn serialization_declares_used_namespaces() {
        let doc = Node::qualified("ri", "Resource")
            .attr("xsi:type", "vs:CatalogService")
            .needs(&["vs", "xsi"])
            .with(title("NGC catalog"));
        let xml = doc.to_xml().unwrap();
        assert!(xml.contains("<ri:Resource"));
        assert!(xml.contains("xmlns:ri="));
        assert!(xml.contains("xmlns:vs="));
        assert!(xml.contains("xmlns:xsi="));
        assert!(xml.contains("xsi:schemaLocation"));
        assert!(xml.contains("<title>NGC catalog</title>"));
    }

    #[test]
    fn serialization_escapes_content() {
        let doc = Node::qualified("oai", "GetRecord")
            .with(title("M&M <survey>"))
            .attr("note", "a \"quoted\" value");
        let xml = doc.to_xml().unwrap();
        assert!(xml.contains("M&amp;M &lt;survey>") || xml.contains("M&amp;M &lt;survey&gt;"));
        assert!(!xml.contains("<survey>"));
    }
}
