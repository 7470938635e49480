//! Types produced by the note scanner.
//!
//! A scanned note is reduced to the raw link references and tags it declares.
//! Link targets are unresolved here; `archivist-index` maps them onto vault paths.

use serde::{Deserialize, Serialize};

/// How a link was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `[[target]]`
    Wiki,
    /// `[label](target)`
    Markdown,
    /// A `file` node on a canvas.
    Canvas,
}

/// A single, unresolved link reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    /// Link text naming the target file (heading and alias stripped).
    pub target: String,
    /// `#heading` or `^block` part, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
    /// Display alias (`[[target|alias]]`), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// `![[target]]` embeds.
    #[serde(default)]
    pub embed: bool,
    pub style: LinkStyle,
}

impl LinkRef {
    #[must_use]
    pub fn wiki(target: &str) -> Self {
        Self {
            target: target.to_string(),
            subpath: None,
            alias: None,
            embed: false,
            style: LinkStyle::Wiki,
        }
    }
}

/// Everything the scanner extracted from one note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRefs {
    pub links: Vec<LinkRef>,
    /// Inline and frontmatter tags, `#`-prefixed, deduplicated, in first-seen order.
    pub tags: Vec<String>,
}

impl NoteRefs {
    /// Add a tag unless it is already present.
    pub fn push_tag(&mut self, tag: String) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }
}
