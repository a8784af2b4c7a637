//! Plumbing commands (low-level operations)
//!
//! ## Commands
//!
//! - `hash-object`: Compute object ID and optionally store in database
//! - `cat-file`: Print an object found by id prefix
//! - `ls-tree`: List contents of a tree object
//! - `ls-files`: List the staging list
//! - `write-tree`: Store a tree built from the staging list
//! - `commit-tree`: Store a commit for an existing tree

pub mod cat_file;
pub mod commit_tree;
pub mod hash_object;
pub mod ls_files;
pub mod ls_tree;
pub mod write_tree;
