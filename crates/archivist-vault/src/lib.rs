//! # archivist-vault
//!
//! Host implementations for archivist.
//!
//! - [`FsVault`] — a vault directory on disk. Notes are re-parsed on every
//!   link-index read; nothing is cached between calls.
//! - [`MemoryVault`] — an in-memory vault with explicitly declared links
//!   and tags, for tests.

pub mod fs;
pub mod memory;
pub mod notes;

pub use fs::FsVault;
pub use memory::MemoryVault;
