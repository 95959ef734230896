//! Arena-backed document model.
//!
//! Every node lives in a single `Vec` owned by [`Document`] and is addressed by a
//! [`NodeId`]. Links between nodes are plain indices, so mutating the tree only ever
//! touches the child list of one parent.
//!
//! # Template content
//!
//! An HTML `<template>` element does not hold its content as children. The content is
//! a separate [`NodeData::Fragment`] node reachable through
//! [`Document::template_contents`], which keeps it inert: [`Document::descendants`]
//! and every query built on it never enter a template's content. Callers that want to
//! look inside templates must ask for the fragment explicitly.

use std::fmt;

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the document's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element namespaces the HTML parser can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Html,
    Svg,
    MathMl,
}

/// A single `name="value"` pair on an element.
///
/// Namespaced attributes keep their prefix in `name` (e.g. `xlink:href`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An element node: tag name, namespace and attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub namespace: Namespace,
    pub attrs: Vec<Attribute>,
    template_contents: Option<NodeId>,
}

impl Element {
    /// Create an element with no attributes.
    pub fn new(name: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            name: name.into(),
            namespace,
            attrs: Vec::new(),
            template_contents: None,
        }
    }

    /// Whether this element has the given namespace and (ASCII case-insensitive) tag name.
    pub fn is(&self, namespace: Namespace, name: &str) -> bool {
        self.namespace == namespace && self.name.eq_ignore_ascii_case(name)
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attrs.iter().any(|attr| attr.name == name)
    }

    /// Set an attribute. An existing attribute keeps its position; a new one is appended.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|attr| attr.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.get_attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    /// The content fragment, if this is an HTML `<template>` element.
    pub fn template_contents(&self) -> Option<NodeId> {
        self.template_contents
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document root.
    Document,
    /// A detached container; used for template content.
    Fragment,
    Doctype {
        name: String,
    },
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// An HTML document stored as a node arena.
///
/// Nodes are never freed: detaching a node (for instance by replacing it) only
/// unlinks it from its parent.
///
/// Accessors index the arena directly and panic on a [`NodeId`] that did not come
/// from this document. Use [`Document::has_node`] to check an id of unknown origin.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root node exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` addresses a node of this arena.
    pub fn has_node(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Add a node to the arena without attaching it.
    ///
    /// An HTML `<template>` element gets a fresh content fragment.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });

        let is_template = matches!(
            &self.nodes[id.0].data,
            NodeData::Element(el) if el.is(Namespace::Html, "template") && el.template_contents.is_none()
        );
        if is_template {
            let fragment = self.create(NodeData::Fragment);
            if let NodeData::Element(el) = &mut self.nodes[id.0].data {
                el.template_contents = Some(fragment);
            }
        }

        id
    }

    pub fn create_element(&mut self, name: &str, namespace: Namespace) -> NodeId {
        self.create(NodeData::Element(Element::new(name, namespace)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeData::Text(text.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.create(NodeData::Fragment)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// The content fragment of an HTML `<template>` element.
    pub fn template_contents(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).and_then(Element::template_contents)
    }

    /// Append `child` as the last child of `parent`, detaching it first if needed.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Put `new` where `old` is in `parent`'s child list.
    ///
    /// Returns false (and changes nothing) when `old` is not a child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        if old == new {
            return self.nodes[old.0].parent == Some(parent);
        }
        if !self.nodes[parent.0].children.contains(&old) {
            return false;
        }

        self.detach(new);
        let Some(pos) = self.nodes[parent.0].children.iter().position(|&c| c == old) else {
            return false;
        };
        self.nodes[parent.0].children[pos] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        true
    }

    /// Unlink a node from its parent. The node and its subtree stay in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Pre-order walk of everything below `scope`, excluding `scope` itself.
    ///
    /// Template content is not visited.
    pub fn descendants(&self, scope: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: self.children(scope).iter().rev().copied().collect(),
        }
    }

    /// Elements below `scope` carrying the attribute `name`, in document order.
    pub fn elements_with_attribute(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&id| self.element(id).is_some_and(|el| el.has_attribute(name)))
            .collect()
    }

    /// HTML `<template>` elements below `scope`, in document order.
    pub fn templates(&self, scope: NodeId) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&id| {
                self.element(id)
                    .is_some_and(|el| el.is(Namespace::Html, "template"))
            })
            .collect()
    }

    /// First element below `scope` for which `pred` holds.
    pub fn find_element(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.descendants(scope)
            .find(|&id| self.element(id).is_some_and(&pred))
    }

    /// Every element below `scope` for which `pred` holds.
    pub fn find_elements(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&id| self.element(id).is_some_and(&pred))
            .collect()
    }

    pub fn get_element_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.find_element(scope, |el| el.get_attribute("id") == Some(id))
    }

    /// Whether `node` is `ancestor` or sits somewhere below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let NodeData::Text(text) = self.data(node) {
                out.push_str(text);
            }
        }
        out
    }
}

/// Iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_with(doc: &mut Document, parent: NodeId, name: &str) -> NodeId {
        let id = doc.create_element(name, Namespace::Html);
        doc.append_child(parent, id);
        id
    }

    #[test]
    fn test_set_attribute_keeps_position() {
        let mut el = Element::new("i", Namespace::Html);
        el.set_attribute("a", "1");
        el.set_attribute("b", "2");
        el.set_attribute("a", "3");
        let names: Vec<_> = el.attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(el.get_attribute("a"), Some("3"));
        assert_eq!(el.remove_attribute("a"), Some("3".to_string()));
        assert!(!el.has_attribute("a"));
    }

    #[test]
    fn test_class_list() {
        let mut el = Element::new("i", Namespace::Html);
        assert_eq!(el.class_list().count(), 0);
        el.set_attribute("class", "  one\ttwo  three ");
        assert_eq!(el.class_list().collect::<Vec<_>>(), ["one", "two", "three"]);
    }

    #[test]
    fn test_replace_child_keeps_position() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = element_with(&mut doc, root, "a");
        let b = element_with(&mut doc, root, "b");
        let c = element_with(&mut doc, root, "c");

        let svg = doc.create_element("svg", Namespace::Svg);
        assert!(doc.replace_child(root, b, svg));
        assert_eq!(doc.children(root), &[a, svg, c]);
        assert_eq!(doc.parent(svg), Some(root));
        assert_eq!(doc.parent(b), None);
    }

    #[test]
    fn test_replace_child_rejects_non_child() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = element_with(&mut doc, root, "a");
        let nested = element_with(&mut doc, a, "b");
        let svg = doc.create_element("svg", Namespace::Svg);

        assert!(!doc.replace_child(root, nested, svg));
        assert_eq!(doc.children(a), &[nested]);
        assert_eq!(doc.parent(svg), None);
    }

    #[test]
    fn test_template_gets_content_fragment() {
        let mut doc = Document::new();
        let root = doc.root();
        let template = element_with(&mut doc, root, "template");
        let content = doc.template_contents(template).unwrap();
        assert_eq!(doc.data(content), &NodeData::Fragment);

        let svg_template = doc.create_element("template", Namespace::Svg);
        assert_eq!(doc.template_contents(svg_template), None);
    }

    #[test]
    fn test_descendants_skip_template_content() {
        let mut doc = Document::new();
        let root = doc.root();
        let div = element_with(&mut doc, root, "div");
        let template = element_with(&mut doc, div, "template");
        let content = doc.template_contents(template).unwrap();
        let hidden = element_with(&mut doc, content, "i");
        let span = element_with(&mut doc, root, "span");

        let walked: Vec<_> = doc.descendants(root).collect();
        assert_eq!(walked, [div, template, span]);
        assert_eq!(doc.descendants(content).collect::<Vec<_>>(), [hidden]);
        assert_eq!(doc.templates(root), [template]);
    }

    #[test]
    fn test_queries() {
        let mut doc = Document::new();
        let root = doc.root();
        let div = element_with(&mut doc, root, "div");
        let marker = element_with(&mut doc, div, "i");
        doc.element_mut(marker)
            .unwrap()
            .set_attribute("data-lucide", "circle");
        doc.element_mut(div).unwrap().set_attribute("id", "wrap");
        let text = doc.create_text("hello");
        doc.append_child(div, text);

        assert_eq!(doc.elements_with_attribute(root, "data-lucide"), [marker]);
        assert_eq!(doc.get_element_by_id(root, "wrap"), Some(div));
        assert!(doc.contains(div, marker));
        assert!(!doc.contains(marker, div));
        assert_eq!(doc.text_content(div), "hello");
    }

    #[test]
    fn test_append_child_moves_node() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = element_with(&mut doc, root, "a");
        let b = element_with(&mut doc, root, "b");
        doc.append_child(a, b);
        assert_eq!(doc.children(root), &[a]);
        assert_eq!(doc.children(a), &[b]);
    }
}
