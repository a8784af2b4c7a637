//! Content-addressable object store and staging-area codec
//!
//! The library is split the same way the command line uses it:
//!
//! - `artifacts`: pure data types and byte-level codecs
//! - `areas`: owners of on-disk state (object database, index file, refs)
//! - `commands`: plumbing and porcelain operations on a [`areas::repository::Repository`]
//! - `errors`: the typed failures every core operation returns

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
