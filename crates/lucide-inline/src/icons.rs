//! Icon registries: icon names mapped to the SVG elements that draw them.
//!
//! The JSON form matches Lucide's `IconNode` export, an object whose values are
//! arrays of `[tag, attributes]` pairs:
//!
//! ```json
//! {
//!   "Circle": [["circle", { "cx": "12", "cy": "12", "r": "10" }]],
//!   "Minus": [["path", { "d": "M5 12h14" }]]
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// One drawing primitive: an SVG child element with its attributes in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "(String, IndexMap<String, Value>)")]
pub struct IconElement {
    pub tag: String,
    pub attrs: IndexMap<String, String>,
}

impl IconElement {
    pub fn new<'a>(tag: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: attrs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl TryFrom<(String, IndexMap<String, Value>)> for IconElement {
    type Error = String;

    fn try_from((tag, raw): (String, IndexMap<String, Value>)) -> Result<Self, Self::Error> {
        let mut attrs = IndexMap::with_capacity(raw.len());
        for (name, value) in raw {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(format!(
                        "attribute `{name}` of <{tag}> must be a string, number or boolean, got {other}"
                    ));
                }
            };
            attrs.insert(name, value);
        }
        Ok(Self { tag, attrs })
    }
}

/// The drawing primitives of one icon.
pub type IconNode = Vec<IconElement>;

/// Errors from loading a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read icon registry {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid icon registry: {0}")]
    Json(#[from] serde_json::Error),
}

/// Icon name → drawing primitives.
///
/// Lookups accept the stored key or any spelling that converts to it in PascalCase,
/// so a registry keyed by component name (`Volume2`) answers marker names
/// (`volume-2`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct IconRegistry {
    icons: IndexMap<String, IconNode>,
}

impl IconRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from Lucide's JSON icon-node format.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON registry file.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let json = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Add or replace an icon.
    pub fn insert(&mut self, name: impl Into<String>, node: IconNode) {
        self.icons.insert(name.into(), node);
    }

    /// Look up an icon by its exact key, then by the PascalCase form of `name`.
    pub fn get(&self, name: &str) -> Option<&[IconElement]> {
        self.icons
            .get(name)
            .or_else(|| self.icons.get(&to_pascal_case(name)))
            .map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Stored keys, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.icons.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, IconNode)> for IconRegistry {
    fn from_iter<I: IntoIterator<Item = (S, IconNode)>>(iter: I) -> Self {
        Self {
            icons: iter
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        }
    }
}

/// `arrow-up-right` → `ArrowUpRight`, `volume-2` → `Volume2`.
///
/// Whitespace, `-` and `_` separate words; the first letter of each word is
/// uppercased and the rest is kept as written.
pub fn to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut word_start = true;
    for c in name.chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            word_start = true;
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `ArrowUpRight` → `arrow-up-right`, `Volume2` → `volume2`.
///
/// A dash goes before every uppercase letter that follows a lowercase letter or a
/// digit; everything is then lowercased.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('-');
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }
    out
}
