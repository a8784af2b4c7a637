//! Porcelain commands (user-facing operations)
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add`: Stage files for commit
//! - `commit`: Create a new commit on the current branch

pub mod add;
pub mod commit;
pub mod init;
