//! Command implementations
//!
//! Every command is an `impl Repository` block that writes its output to the
//! repository writer and returns `anyhow::Result`, so core errors surface
//! with their context attached.
//!
//! - `plumbing`: direct object and index manipulation (hash-object, cat-file,
//!   ls-tree, ls-files, write-tree, commit-tree)
//! - `porcelain`: workflows composed from plumbing (init, add, commit)

pub mod plumbing;
pub mod porcelain;
