//! # archivist-parser
//!
//! Link and tag extraction for vault notes, driven by a pest PEG grammar
//! (`src/note.pest`).
//!
//! Markdown notes yield wikilinks, markdown links, inline tags and
//! frontmatter tags. Canvas files (JSON) yield their `file` nodes as links
//! plus whatever their text nodes reference.

pub mod ast;

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde::Deserialize;

use archivist_core::error::{ArchivistError, Result};
use archivist_core::frontmatter::{frontmatter_tags, normalize_tag, split_frontmatter};

pub use ast::{LinkRef, LinkStyle, NoteRefs};

#[derive(Parser)]
#[grammar = "note.pest"]
struct NoteScanner;

/// Parse a markdown note: frontmatter tags plus everything the body references.
///
/// # Errors
///
/// Returns [`ArchivistError::Serialization`] if the frontmatter YAML is malformed.
pub fn parse_note(content: &str) -> Result<NoteRefs> {
    let mut refs = NoteRefs::default();
    let body = match split_frontmatter(content) {
        Some((yaml, body)) => {
            for tag in frontmatter_tags(yaml)? {
                refs.push_tag(tag);
            }
            body
        }
        None => content,
    };
    scan_body(body, &mut refs)?;
    Ok(refs)
}

/// Scan markdown text for links and inline tags, appending to `refs`.
///
/// # Errors
///
/// Returns [`ArchivistError::Parse`] if the scanner rejects the input.
pub fn scan_body(text: &str, refs: &mut NoteRefs) -> Result<()> {
    let pairs =
        NoteScanner::parse(Rule::note, text).map_err(|e| ArchivistError::Parse(e.to_string()))?;

    for pair in pairs {
        match pair.as_rule() {
            Rule::wikilink => {
                if let Some(link) = wikilink(pair) {
                    refs.links.push(link);
                }
            }
            Rule::md_link => {
                if let Some(link) = markdown_link(pair) {
                    refs.links.push(link);
                }
            }
            Rule::tag => {
                if let Some(tag) = inline_tag(pair.as_str()) {
                    refs.push_tag(tag);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn wikilink(pair: Pair<'_, Rule>) -> Option<LinkRef> {
    let mut link = LinkRef::wiki("");
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::embed_mark => link.embed = true,
            Rule::link_target => link.target = inner.as_str().trim().to_string(),
            Rule::link_subpath => link.subpath = Some(inner.as_str().to_string()),
            Rule::link_alias => {
                let alias = inner.as_str().trim();
                if !alias.is_empty() {
                    link.alias = Some(alias.to_string());
                }
            }
            _ => {}
        }
    }
    (!link.target.is_empty()).then_some(link)
}

fn markdown_link(pair: Pair<'_, Rule>) -> Option<LinkRef> {
    let raw = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::md_target)?
        .as_str();
    let raw = raw
        .strip_prefix('<')
        .and_then(|r| r.strip_suffix('>'))
        .unwrap_or(raw);
    if has_scheme(raw) {
        return None;
    }

    let (path, subpath) = match raw.find('#') {
        Some(idx) => (&raw[..idx], Some(raw[idx..].to_string())),
        None => (raw, None),
    };
    let decoded = urlencoding::decode(path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_string());
    let target = decoded.trim();
    if target.is_empty() {
        return None;
    }

    Some(LinkRef {
        target: target.to_string(),
        subpath,
        alias: None,
        embed: false,
        style: LinkStyle::Markdown,
    })
}

/// `https://…`, `mailto:…`, `obsidian://…` and friends point outside the vault.
fn has_scheme(raw: &str) -> bool {
    match raw.find(':') {
        Some(idx) if idx > 0 => raw[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

/// A tag needs at least one non-numeric character: `#2024` is not a tag.
fn inline_tag(raw: &str) -> Option<String> {
    let name = raw.trim_start_matches('#').trim_end_matches('/');
    if !name.chars().any(|c| !c.is_ascii_digit() && c != '/') {
        return None;
    }
    normalize_tag(name)
}

#[derive(Debug, Default, Deserialize)]
struct Canvas {
    #[serde(default)]
    nodes: Vec<CanvasNode>,
}

#[derive(Debug, Deserialize)]
struct CanvasNode {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    subpath: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Parse a canvas file. File nodes become links; text nodes are scanned as markdown.
///
/// # Errors
///
/// Returns [`ArchivistError::Serialization`] if the canvas JSON is malformed.
pub fn parse_canvas(content: &str) -> Result<NoteRefs> {
    let mut refs = NoteRefs::default();
    if content.trim().is_empty() {
        return Ok(refs);
    }

    let canvas: Canvas =
        serde_json::from_str(content).map_err(|e| ArchivistError::Serialization(e.to_string()))?;

    for node in canvas.nodes {
        match (node.kind.as_str(), node.file, node.text) {
            ("file", Some(file), _) if !file.trim().is_empty() => refs.links.push(LinkRef {
                target: file.trim().to_string(),
                subpath: node.subpath,
                alias: None,
                embed: true,
                style: LinkStyle::Canvas,
            }),
            ("text", _, Some(text)) => scan_body(&text, &mut refs)?,
            _ => {}
        }
    }
    Ok(refs)
}
