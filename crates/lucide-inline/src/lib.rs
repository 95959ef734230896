//! Replace icon marker elements in HTML with inline Lucide SVG icons.
//!
//! Markers are ordinary elements carrying a name attribute:
//!
//! ```html
//! <i data-lucide="circle"></i>
//! ```
//!
//! Each one is swapped for an `<svg>` built from an [`IconRegistry`], keeping the
//! marker's attributes and merging its classes with `lucide lucide-<name>`.
//!
//! # Usage
//!
//! ```bash
//! lucide-inline ./public --icons icons.json
//! ```
//!
//! or, as a library:
//!
//! ```rust,ignore
//! use lucide_inline::{CreateIconsOptions, IconRegistry, create_icons, parse_document, serialize_document};
//!
//! let icons = IconRegistry::from_json(r#"{"Circle": [["circle", {"cx": "12", "cy": "12", "r": "10"}]]}"#)?;
//! let mut doc = parse_document(r#"<i data-lucide="circle"></i>"#);
//! create_icons(&mut doc, &CreateIconsOptions::new(&icons));
//! let html = serialize_document(&doc)?;
//! ```
//!
//! # How it works
//!
//! 1. **Parsing**: HTML is parsed with html5ever into an arena [`Document`]. Template
//!    content is kept in a separate fragment per `<template>`, as in a browser.
//!
//! 2. **Replacement**: [`create_icons`] searches the document and, recursively, every
//!    template's content for markers and replaces those whose name is in the registry.
//!    Unknown names are left alone.
//!
//! 3. **Directories**: [`Processor`] walks a directory tree and streams every `.html`
//!    file through lol_html. Only marker elements are rewritten, so the rest of each
//!    file keeps its exact bytes. Files without a resolvable marker are not written.

pub mod dom;
mod html;
mod icons;
mod processor;
mod replace;

pub use dom::{Attribute, Document, Element, Namespace, NodeData, NodeId};
pub use html::{inner_html, outer_html, parse_document, serialize_document};
pub use icons::{IconElement, IconNode, IconRegistry, RegistryError, to_kebab_case, to_pascal_case};
pub use processor::{ProcessError, ProcessOptions, Processor, ProcessorStats};
pub use replace::{
    BASE_CLASS, CreateIconsOptions, DEFAULT_ATTRS, DEFAULT_NAME_ATTR, IconReplacer, ReplaceStats,
    create_icons,
};
