use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::io::Write;

const AUTHOR_ENV_PREFIX: &str = "GIT_AUTHOR";
const COMMITTER_ENV_PREFIX: &str = "GIT_COMMITTER";

impl Repository {
    pub fn commit_tree(
        &self,
        tree_prefix: &str,
        parent_prefix: Option<&str>,
        message: &str,
    ) -> anyhow::Result<()> {
        let (tree_id, _) = self
            .database()
            .find_object(tree_prefix, ObjectType::Tree)
            .with_context(|| format!("{tree_prefix} is not a valid tree"))?;

        let parent = parent_prefix
            .map(|prefix| {
                self.database()
                    .find_object(prefix, ObjectType::Commit)
                    .map(|(oid, _)| oid)
                    .with_context(|| format!("{prefix} is not a valid commit"))
            })
            .transpose()?;

        let commit_id = self.store_commit(parent, tree_id, message)?;
        writeln!(self.writer(), "{commit_id}")?;

        Ok(())
    }

    /// Store a commit signed with the identities found in the environment
    ///
    /// The committer falls back to the author when `GIT_COMMITTER_*` is unset.
    pub(crate) fn store_commit(
        &self,
        parent: Option<ObjectId>,
        tree_id: ObjectId,
        message: &str,
    ) -> anyhow::Result<ObjectId> {
        let author = Author::load_from_env(AUTHOR_ENV_PREFIX)?;
        let committer = match std::env::var_os(format!("{COMMITTER_ENV_PREFIX}_NAME")) {
            Some(_) => Author::load_from_env(COMMITTER_ENV_PREFIX)?,
            None => author.clone(),
        };

        let mut message = message.to_string();
        if !message.ends_with('\n') {
            message.push('\n');
        }

        let commit = Commit::new(parent, tree_id, author, committer, message);
        let commit_id = self.database().store(&commit)?;
        tracing::debug!(oid = %commit_id, root = commit.parent().is_none(), "commit written");

        Ok(commit_id)
    }
}
