//! Core repository components
//!
//! - `database`: Object database for storing blobs, trees, and commits
//! - `index`: Staging area file (locked reads, atomic writes)
//! - `refs`: HEAD and the branch it points at
//! - `repository`: Repository layout and the handles above
//! - `workspace`: Working directory reads and file metadata

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
