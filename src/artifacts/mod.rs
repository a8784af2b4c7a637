//! Data structures and codecs
//!
//! - `index`: Staging area entries and the binary index format
//! - `objects`: Object types (blob, tree, commit), hashing and compression

pub mod index;
pub mod objects;
