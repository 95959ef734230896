//! Replacing icon markers with inline SVG.
//!
//! A marker is any element carrying the name attribute (`data-lucide` by default):
//!
//! ```html
//! <i data-lucide="circle" class="big"></i>
//! ```
//!
//! becomes
//!
//! ```html
//! <svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"
//!      fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"
//!      stroke-linejoin="round" data-lucide="circle" class="lucide lucide-circle big">
//!   <circle cx="12" cy="12" r="10"></circle>
//! </svg>
//! ```
//!
//! Template content is inert and invisible to ordinary tree walks, so the scopes to
//! search are gathered first: the root, then the content fragment of every
//! `<template>` found in a scope, repeated for the fragments themselves until no
//! new templates turn up.

use crate::dom::{Attribute, Document, Element, Namespace, NodeData, NodeId};
use crate::icons::{IconElement, IconRegistry, to_kebab_case};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

/// Attribute that marks an element for replacement unless configured otherwise.
pub const DEFAULT_NAME_ATTR: &str = "data-lucide";

/// Class carried by every generated `<svg>`; also the prefix of the per-icon class.
pub const BASE_CLASS: &str = "lucide";

/// Attributes every generated `<svg>` starts with, in this order.
pub const DEFAULT_ATTRS: [(&str, &str); 9] = [
    ("xmlns", "http://www.w3.org/2000/svg"),
    ("width", "24"),
    ("height", "24"),
    ("viewBox", "0 0 24 24"),
    ("fill", "none"),
    ("stroke", "currentColor"),
    ("stroke-width", "2"),
    ("stroke-linecap", "round"),
    ("stroke-linejoin", "round"),
];

/// Options for [`create_icons`].
#[derive(Debug, Clone)]
pub struct CreateIconsOptions<'a> {
    /// Icons to resolve markers against. With no registry nothing is replaced.
    pub icons: Option<&'a IconRegistry>,
    /// Attribute identifying markers; its value is the icon name.
    pub name_attr: String,
    /// Extra attributes for every generated `<svg>`. Marker attributes override them;
    /// a `class` entry is merged into the class list.
    pub attrs: IndexMap<String, String>,
    /// Only search below this node. Defaults to the document root.
    ///
    /// The id must come from the document being processed; an id past the end of
    /// that document's arena makes the pass a no-op.
    pub root: Option<NodeId>,
    /// Whether to search the content of `<template>` elements.
    pub in_templates: bool,
}

impl Default for CreateIconsOptions<'_> {
    fn default() -> Self {
        Self {
            icons: None,
            name_attr: DEFAULT_NAME_ATTR.to_string(),
            attrs: IndexMap::new(),
            root: None,
            in_templates: true,
        }
    }
}

impl<'a> CreateIconsOptions<'a> {
    pub fn new(icons: &'a IconRegistry) -> Self {
        Self {
            icons: Some(icons),
            ..Default::default()
        }
    }

    pub fn name_attr(mut self, name_attr: impl Into<String>) -> Self {
        self.name_attr = name_attr.into();
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    pub fn in_templates(mut self, in_templates: bool) -> Self {
        self.in_templates = in_templates;
        self
    }
}

/// What a replacement pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceStats {
    /// The root plus every template content fragment searched.
    pub scopes_searched: usize,
    /// Elements carrying the name attribute.
    pub markers_found: usize,
    /// Markers swapped for an `<svg>`.
    pub icons_replaced: usize,
    /// Names with no registry entry, first occurrence order, without duplicates.
    pub unknown_icons: Vec<String>,
}

impl ReplaceStats {
    /// Markers left in place.
    pub fn markers_skipped(&self) -> usize {
        self.markers_found - self.icons_replaced
    }
}

/// Replace every resolvable marker under the configured root, templates included.
///
/// Markers whose name is not in the registry are left untouched. Elements already
/// converted to `<svg>` are not markers, so running this again over its own output
/// changes nothing while still picking up markers added since.
pub fn create_icons(document: &mut Document, options: &CreateIconsOptions<'_>) {
    IconReplacer::new(options.clone()).run(document);
}

/// A configured replacement pass that reports what it did.
#[derive(Debug, Clone)]
pub struct IconReplacer<'a> {
    options: CreateIconsOptions<'a>,
}

impl<'a> IconReplacer<'a> {
    pub fn new(options: CreateIconsOptions<'a>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CreateIconsOptions<'a> {
        &self.options
    }

    /// Replace markers in `document` and return counts.
    pub fn run(&self, document: &mut Document) -> ReplaceStats {
        let root = self.options.root.unwrap_or_else(|| document.root());
        if !document.has_node(root) {
            debug!(root = %root, "root is not a node of this document");
            return ReplaceStats::default();
        }
        let scopes = self.collect_scopes(document, root);

        let mut stats = ReplaceStats {
            scopes_searched: scopes.len(),
            ..Default::default()
        };

        for scope in scopes {
            // Collect before mutating: replacement edits child lists under `scope`.
            for marker in self.find_markers(document, scope) {
                // A marker nested in an already replaced one went out with its subtree.
                if !document.contains(scope, marker) {
                    continue;
                }
                stats.markers_found += 1;
                if self.replace_marker(document, marker, &mut stats) {
                    stats.icons_replaced += 1;
                }
            }
        }

        debug!(
            scopes = stats.scopes_searched,
            markers = stats.markers_found,
            replaced = stats.icons_replaced,
            "icon replacement pass finished"
        );
        stats
    }

    /// The root and every template content fragment reachable from it.
    fn collect_scopes(&self, document: &Document, root: NodeId) -> Vec<NodeId> {
        let mut scopes = Vec::new();
        let mut pending = vec![root];

        if self.options.in_templates
            && let Some(content) = document.template_contents(root)
        {
            pending.push(content);
        }

        while let Some(scope) = pending.pop() {
            scopes.push(scope);
            if !self.options.in_templates {
                continue;
            }
            for template in document.templates(scope).into_iter().rev() {
                if let Some(content) = document.template_contents(template) {
                    pending.push(content);
                }
            }
        }

        scopes
    }

    fn find_markers(&self, document: &Document, scope: NodeId) -> Vec<NodeId> {
        let name_attr = self.options.name_attr.as_str();
        document.find_elements(scope, |el| {
            el.has_attribute(name_attr) && !el.is(Namespace::Svg, "svg")
        })
    }

    /// Swap one marker for its icon. Returns false when the marker stays.
    fn replace_marker(&self, document: &mut Document, marker: NodeId, stats: &mut ReplaceStats) -> bool {
        let Some(element) = document.element(marker) else {
            return false;
        };
        let Some(name) = element.get_attribute(&self.options.name_attr) else {
            return false;
        };

        let Some(icon) = self.options.icons.and_then(|icons| icons.get(name)) else {
            if !stats.unknown_icons.iter().any(|known| known == name) {
                stats.unknown_icons.push(name.to_string());
            }
            return false;
        };

        let Some(parent) = document.parent(marker) else {
            return false;
        };

        let name = name.to_string();
        let svg = self.build_svg(&name, icon, element);
        let svg = self.insert_svg(document, svg, icon);

        trace!(icon = %name, marker = %marker, svg = %svg, "replaced icon marker");
        document.replace_child(parent, marker, svg)
    }

    /// The `<svg>` element for `marker`, without children.
    fn build_svg(&self, name: &str, icon: &[IconElement], marker: &Element) -> Element {
        let mut svg = Element::new("svg", Namespace::Svg);

        for (attr, value) in DEFAULT_ATTRS {
            svg.set_attribute(attr, value);
        }
        for (attr, value) in &self.options.attrs {
            if attr != "class" {
                svg.set_attribute(attr, value.as_str());
            }
        }
        for Attribute { name: attr, value } in &marker.attrs {
            if attr != "class" {
                svg.set_attribute(attr, value.as_str());
            }
        }

        svg.set_attribute("class", self.class_names(name, marker));

        trace!(icon = name, primitives = icon.len(), "built icon element");
        svg
    }

    /// Base class, per-icon class, marker classes, then configured classes; no repeats.
    fn class_names(&self, name: &str, marker: &Element) -> String {
        let icon_class = format!("{BASE_CLASS}-{}", to_kebab_case(name));
        let configured = self
            .options
            .attrs
            .get("class")
            .map(String::as_str)
            .unwrap_or_default();

        let classes: IndexSet<&str> = [BASE_CLASS, icon_class.as_str()]
            .into_iter()
            .chain(marker.class_list())
            .chain(configured.split_ascii_whitespace())
            .collect();

        classes.into_iter().collect::<Vec<_>>().join(" ")
    }

    /// Add `svg` and one child per primitive to the arena, detached.
    fn insert_svg(&self, document: &mut Document, svg: Element, icon: &[IconElement]) -> NodeId {
        let svg = document.create(NodeData::Element(svg));
        for primitive in icon {
            let mut child = Element::new(primitive.tag.as_str(), Namespace::Svg);
            for (attr, value) in &primitive.attrs {
                child.set_attribute(attr, value.as_str());
            }
            let child = document.create(NodeData::Element(child));
            document.append_child(svg, child);
        }
        svg
    }
}
