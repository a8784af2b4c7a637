//! Index file format
//!
//! The index (also called staging area or cache) records the tracked paths and
//! the object each one was last staged as.
//!
//! ## File Format (Version 2)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - 62 bytes of fixed fields, then the path and NUL padding
//!   - Each entry padded to 8-byte alignment, with at least one NUL
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod codec;
pub mod entry_flags;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;
pub mod reconcile;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Magic signature identifying index files
pub const SIGNATURE: &[u8; 4] = b"DIRC";

/// Index file format version
pub const VERSION: u32 = 2;
