//! HTML parsing into and serialization out of a [`Document`].
//!
//! Parsing goes through html5ever's spec-compliant tree builder into an `RcDom`, which
//! is then copied into the arena. Template content arrives as html5ever's
//! `template_contents` and is moved into the template's fragment node.

use crate::dom::{Document, Namespace, NodeData, NodeId};
use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{LocalName, ParseOpts, QualName, namespace_url, ns};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use std::io;

/// Parse a complete HTML document.
///
/// Parsing never fails: malformed markup is recovered the way browsers recover it.
/// Scripting is disabled, so `<noscript>` content is parsed as markup.
pub fn parse_document(html: &str) -> Document {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = html5ever::parse_document(RcDom::default(), opts).one(html);

    let mut doc = Document::new();
    let root = doc.root();

    // (source handle, arena parent). Children are pushed in reverse so they are popped,
    // and therefore appended, in source order.
    let mut stack: Vec<(Handle, NodeId)> = dom
        .document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), root))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let Some(id) = convert_node(&mut doc, &handle) else {
            continue;
        };
        doc.append_child(parent, id);

        let (source, target) = match (&handle.data, doc.template_contents(id)) {
            (
                RcNodeData::Element {
                    template_contents, ..
                },
                Some(fragment),
            ) => match template_contents.borrow().as_ref() {
                Some(content) => (content.clone(), fragment),
                None => continue,
            },
            _ => (handle.clone(), id),
        };

        for child in source.children.borrow().iter().rev() {
            stack.push((child.clone(), target));
        }
    }

    doc
}

/// Create the arena counterpart of an rcdom node, without children.
fn convert_node(doc: &mut Document, handle: &Handle) -> Option<NodeId> {
    let data = match &handle.data {
        RcNodeData::Element { name, attrs, .. } => {
            let namespace = if name.ns == ns!(svg) {
                Namespace::Svg
            } else if name.ns == ns!(mathml) {
                Namespace::MathMl
            } else {
                Namespace::Html
            };
            let id = doc.create_element(&name.local, namespace);
            if let Some(el) = doc.element_mut(id) {
                for attr in attrs.borrow().iter() {
                    let attr_name = match &attr.name.prefix {
                        // Plain `xmlns` on foreign elements comes back with an empty prefix.
                        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, attr.name.local),
                        _ => attr.name.local.to_string(),
                    };
                    el.set_attribute(&attr_name, attr.value.to_string());
                }
            }
            return Some(id);
        }
        RcNodeData::Text { contents } => NodeData::Text(contents.borrow().to_string()),
        RcNodeData::Comment { contents } => NodeData::Comment(contents.to_string()),
        RcNodeData::Doctype { name, .. } => NodeData::Doctype {
            name: name.to_string(),
        },
        RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return None,
    };
    Some(doc.create(data))
}

/// Serialize the whole document, doctype included.
pub fn serialize_document(doc: &Document) -> io::Result<String> {
    inner_html(doc, doc.root())
}

/// Serialize the children of `id`. For a template element this is its content.
pub fn inner_html(doc: &Document, id: NodeId) -> io::Result<String> {
    write_html(doc, id, TraversalScope::ChildrenOnly(None))
}

/// Serialize `id` itself along with its subtree.
pub fn outer_html(doc: &Document, id: NodeId) -> io::Result<String> {
    write_html(doc, id, TraversalScope::IncludeNode)
}

fn write_html(doc: &Document, node: NodeId, traversal_scope: TraversalScope) -> io::Result<String> {
    let mut out = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    serialize(&mut out, &Subtree { doc, node }, opts)?;
    String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

struct Subtree<'a> {
    doc: &'a Document,
    node: NodeId,
}

enum Step {
    Open(NodeId),
    Close(QualName),
}

impl Subtree<'_> {
    /// Children whose markup belongs inside `id`: the content fragment for templates.
    fn content_of(&self, id: NodeId) -> &[NodeId] {
        let content = self.doc.template_contents(id).unwrap_or(id);
        self.doc.children(content)
    }
}

impl Serialize for Subtree<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        let mut steps: Vec<Step> = match traversal_scope {
            TraversalScope::IncludeNode => vec![Step::Open(self.node)],
            TraversalScope::ChildrenOnly(_) => self
                .content_of(self.node)
                .iter()
                .rev()
                .map(|&child| Step::Open(child))
                .collect(),
        };

        while let Some(step) = steps.pop() {
            let id = match step {
                Step::Close(name) => {
                    serializer.end_elem(name)?;
                    continue;
                }
                Step::Open(id) => id,
            };

            match self.doc.data(id) {
                NodeData::Element(el) => {
                    let name = element_name(el.namespace, &el.name);
                    let attrs: Vec<(QualName, &str)> = el
                        .attrs
                        .iter()
                        .map(|attr| (attribute_name(&attr.name), attr.value.as_str()))
                        .collect();
                    serializer.start_elem(name.clone(), attrs.iter().map(|(n, v)| (n, *v)))?;
                    steps.push(Step::Close(name));
                }
                NodeData::Document | NodeData::Fragment => {}
                NodeData::Doctype { name } => {
                    serializer.write_doctype(name)?;
                    continue;
                }
                NodeData::Text(text) => {
                    serializer.write_text(text)?;
                    continue;
                }
                NodeData::Comment(text) => {
                    serializer.write_comment(text)?;
                    continue;
                }
            }

            for &child in self.content_of(id).iter().rev() {
                steps.push(Step::Open(child));
            }
        }

        Ok(())
    }
}

fn element_name(namespace: Namespace, local: &str) -> QualName {
    let ns = match namespace {
        Namespace::Html => ns!(html),
        Namespace::Svg => ns!(svg),
        Namespace::MathMl => ns!(mathml),
    };
    QualName::new(None, ns, LocalName::from(local))
}

/// Attribute names are written verbatim, prefix included.
fn attribute_name(name: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(name))
}
