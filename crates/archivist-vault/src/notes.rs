//! Dispatch from a file's format to the matching parser.

use archivist_core::frontmatter::split_frontmatter;
use archivist_core::FileRef;
use archivist_parser::{parse_canvas, parse_note, scan_body, NoteRefs};

/// Whether the file is a format that can declare links and tags.
#[must_use]
pub fn is_linkable(file: &FileRef) -> bool {
    matches!(
        file.extension.to_ascii_lowercase().as_str(),
        "md" | "markdown" | "canvas"
    )
}

/// Extract links and tags from a file's text. Non-linkable files yield nothing.
///
/// A note with malformed frontmatter still contributes its body links; only
/// the frontmatter tags are lost.
#[must_use]
pub fn refs_from_text(file: &FileRef, text: &str) -> NoteRefs {
    if !is_linkable(file) {
        return NoteRefs::default();
    }

    if file.extension.eq_ignore_ascii_case("canvas") {
        return parse_canvas(text).unwrap_or_else(|err| {
            tracing::warn!(path = %file.path, error = %err, "unreadable canvas");
            NoteRefs::default()
        });
    }

    match parse_note(text) {
        Ok(refs) => refs,
        Err(err) => {
            tracing::warn!(path = %file.path, error = %err, "malformed frontmatter");
            let body = split_frontmatter(text).map_or(text, |(_, body)| body);
            let mut refs = NoteRefs::default();
            if let Err(err) = scan_body(body, &mut refs) {
                tracing::warn!(path = %file.path, error = %err, "unscannable note body");
            }
            refs
        }
    }
}
