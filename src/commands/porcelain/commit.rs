use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Commit the staging list on top of HEAD and advance the current branch
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        let tree_id = self.store_index_tree()?;
        let parent = self.refs().read_head()?;
        let is_root = match parent {
            Some(_) => "",
            None => "(root-commit) ",
        };

        let commit_id = self.store_commit(parent, tree_id, message)?;
        self.refs().update_head(&commit_id)?;

        writeln!(
            self.writer(),
            "[{}{}] {}",
            is_root,
            commit_id.to_short_oid(),
            message.lines().next().unwrap_or_default()
        )?;

        Ok(())
    }
}
