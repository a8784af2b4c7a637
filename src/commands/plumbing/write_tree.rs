use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::io::Write;

impl Repository {
    pub fn write_tree(&self) -> anyhow::Result<()> {
        let tree_id = self.store_index_tree()?;
        writeln!(self.writer(), "{tree_id}")?;

        Ok(())
    }

    /// Build a single-level tree from the staging list and store it
    pub(crate) fn store_index_tree(&self) -> anyhow::Result<ObjectId> {
        let entries = self.index().load()?;
        let tree = Tree::build(&entries);

        let tree_id = self.database().store(&tree)?;
        tracing::debug!(oid = %tree_id, entries = tree.len(), "tree written");

        Ok(tree_id)
    }
}
