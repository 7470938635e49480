//! YAML frontmatter splitting and tag extraction.
//!
//! Notes may start with a `---` delimited YAML block:
//! ```markdown
//! ---
//! tags: [mirror, project]
//! aliases: [Alpha]
//! ---
//!
//! ## Body content here
//! ```
//!
//! Only the `tags` / `tag` keys matter to archivist. Everything else is ignored.

use serde::Deserialize;

use crate::error::ArchivistError;

/// Split a markdown note into `(yaml, body)`.
///
/// Returns `None` when the note does not open with a frontmatter block or the
/// block is never closed; the whole note is then body.
#[must_use]
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    // An empty block closes immediately.
    if let Some(body) = rest.strip_prefix("---") {
        return Some(("", strip_line_break(body)));
    }

    let close_pos = rest.find("\n---")?;
    let yaml = &rest[..close_pos];
    let body = strip_line_break(&rest[close_pos + 4..]);
    Some((yaml, body))
}

fn strip_line_break(s: &str) -> &str {
    let s = s.strip_prefix('\r').unwrap_or(s);
    s.strip_prefix('\n').unwrap_or(s)
}

#[derive(Debug, Default, Deserialize)]
struct TagFields {
    #[serde(default)]
    tags: Option<TagValue>,
    #[serde(default)]
    tag: Option<TagValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagValue {
    One(String),
    Many(Vec<Option<String>>),
}

impl TagValue {
    fn into_tags(self) -> Vec<String> {
        match self {
            // `tags: a, b` and `tags: a b` are both accepted by knowledge-base apps.
            Self::One(raw) => raw
                .split([',', ' '])
                .filter_map(normalize_tag)
                .collect(),
            Self::Many(items) => items.into_iter().flatten().filter_map(|t| normalize_tag(&t)).collect(),
        }
    }
}

/// Normalize a tag to its `#`-prefixed form. Blank tags yield `None`.
#[must_use]
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().trim_start_matches('#');
    if tag.is_empty() {
        None
    } else {
        Some(format!("#{tag}"))
    }
}

/// Tags declared in a frontmatter YAML block, normalized with a leading `#`.
///
/// # Errors
///
/// Returns [`ArchivistError::Serialization`] if the YAML cannot be parsed.
pub fn frontmatter_tags(yaml: &str) -> Result<Vec<String>, ArchivistError> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let fields: Option<TagFields> =
        serde_yaml::from_str(yaml).map_err(|e| ArchivistError::Serialization(e.to_string()))?;
    let Some(fields) = fields else {
        return Ok(Vec::new());
    };

    let mut tags = Vec::new();
    for value in [fields.tags, fields.tag].into_iter().flatten() {
        tags.extend(value.into_tags());
    }
    Ok(tags)
}
