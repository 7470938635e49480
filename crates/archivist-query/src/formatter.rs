//! Discovery formatting: JSON, plain table, markdown, and the archive-view
//! report document.

use archivist_core::ARCHIVE_VIEW_TAG;

use crate::discovery::{DiscoveredFile, Discovery, DiscoveryMode};

/// Output format for discovery results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
    Markdown,
}

/// Format a discovery in the specified output format.
#[must_use]
pub fn format_discovery(discovery: &Discovery, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(discovery),
        OutputFormat::Table => format_table(discovery),
        OutputFormat::Markdown => format_markdown(discovery),
    }
}

fn format_json(discovery: &Discovery) -> String {
    serde_json::to_string_pretty(discovery).unwrap_or_else(|_| "{}".to_string())
}

fn format_table(discovery: &Discovery) -> String {
    if discovery.is_empty() {
        return "(no untracked files)".to_string();
    }

    let width = discovery
        .files
        .iter()
        .map(|f| f.path.len())
        .max()
        .unwrap_or(0)
        .max("FILE".len());

    let mut output = format!("{:width$}  REASON\n", "FILE");
    output.push_str(&format!("{}  ------\n", "-".repeat(width)));
    for file in &discovery.files {
        output.push_str(&format!("{:width$}  {}\n", file.path, file.reason));
    }
    output
}

fn format_markdown(discovery: &Discovery) -> String {
    if discovery.is_empty() {
        return "*No untracked files*\n".to_string();
    }
    table(&discovery.files)
}

fn table(files: &[DiscoveredFile]) -> String {
    let mut output = String::from("| File | Reason |\n| --- | --- |\n");
    for file in files {
        // The pipe is escaped so the alias survives inside a table cell.
        output.push_str(&format!("| [[{}\\|{}]] | {} |\n", file.path, file.name, file.reason));
    }
    output
}

/// Render the discovery report document.
///
/// The frontmatter tags the document as an archive view, so running
/// archive-current on it archives every file the table links to.
#[must_use]
pub fn render_report(discovery: &Discovery) -> String {
    let tag = ARCHIVE_VIEW_TAG.trim_start_matches('#');
    let scope = match &discovery.mode {
        DiscoveryMode::RootTracking { root } => format!("not reachable from `{root}`"),
        DiscoveryMode::Orphan => "without links to or from other notes".to_string(),
    };

    let mut output = format!("---\ntags:\n  - {tag}\n---\n\n");
    output.push_str(&format!(
        "> [!info] Found {} file(s) {scope}\n",
        discovery.len()
    ));
    output.push_str("> Run archive-current on this note to archive every file listed below.\n\n");
    output.push_str(&table(&discovery.files));
    output
}
