//! # archivist-query
//!
//! Link-graph queries for archivist.
//!
//! Includes:
//! - [`QueryContext`]: inclusion filter, exclusion toggle and host handle,
//!   passed explicitly to every query
//! - [`LinkGraph`]: a filtered snapshot with explicit-stack reachability
//! - Untracked-file discovery (root tracking or orphan fallback)
//! - Result formatter (JSON, Table, Markdown) and the archive-view report

pub mod context;
pub mod discovery;
pub mod formatter;
pub mod graph;

pub use context::{InclusionFilter, QueryContext};
pub use discovery::{find_untracked, DiscoveredFile, Discovery, DiscoveryMode, Reason};
pub use formatter::{format_discovery, render_report, OutputFormat};
pub use graph::LinkGraph;
