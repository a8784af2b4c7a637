use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::bail;
use std::io::Write;

impl Repository {
    /// List the entries of a tree, or of the tree a commit points at
    ///
    /// Only the listed tree's own entries are printed; subtrees are not
    /// descended into.
    pub fn ls_tree(&self, prefix: &str) -> anyhow::Result<()> {
        let tree = match self.database().find_object(prefix, ObjectType::Tree) {
            Ok((_, ObjectBox::Tree(tree))) => *tree,
            Ok(_) => bail!("object {prefix} is not a tree"),
            Err(crate::errors::Error::NotFound(_)) => {
                let (_, commit) = self.database().find_object(prefix, ObjectType::Commit)?;
                let ObjectBox::Commit(commit) = commit else {
                    bail!("object {prefix} is not a tree or commit");
                };

                self.database()
                    .parse_object_as_tree(commit.tree_oid())?
                    .ok_or_else(|| anyhow::anyhow!("commit {prefix} does not point at a tree"))?
            }
            Err(e) => return Err(e.into()),
        };

        let mut writer = self.writer();
        for entry in tree.entries() {
            writeln!(
                writer,
                "{} {} {}\t{}",
                entry.mode,
                entry.object_type(),
                entry.oid,
                entry.path
            )?;
        }

        Ok(())
    }
}
