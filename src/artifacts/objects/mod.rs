//! Object types and their encoding
//!
//! Content is stored as objects identified by SHA-1 hashes. There are three types:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: One directory level (modes, names, and object IDs)
//! - **Commit**: Snapshot with metadata (tree, parent, author, committer, message)
//!
//! Objects are hashed and stored in their framed form: `<type> <size>\0<content>`

pub mod blob;
pub mod codec;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in raw bytes
pub const RAW_OBJECT_ID_LENGTH: usize = 20;
