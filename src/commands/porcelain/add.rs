use crate::areas::repository::Repository;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::reconcile::reconcile;
use anyhow::{Context, bail};
use std::path::{Path, PathBuf};

impl Repository {
    /// Store each file as a blob and stage it
    ///
    /// Paths are resolved against `base`. Nothing is staged unless every path
    /// can be read.
    pub fn add(&self, base: &Path, paths: &[PathBuf]) -> anyhow::Result<()> {
        let incoming = paths
            .iter()
            .map(|path| self.stage_file(base, path))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let existing = self.index().load()?;
        let entries = reconcile(&existing, &incoming);
        self.index().save(&entries)?;

        tracing::debug!(added = incoming.len(), staged = entries.len(), "index updated");

        Ok(())
    }

    fn stage_file(&self, base: &Path, path: &Path) -> anyhow::Result<IndexEntry> {
        let name = self.workspace().relative_path(base, path)?;

        let stat = self
            .workspace()
            .stat_file(Path::new(&name))
            .with_context(|| format!("pathspec '{}' did not match any files", path.display()))?;
        if stat.mode == EntryMode::Directory {
            bail!("'{name}' is a directory; only files can be staged");
        }

        let blob = self.workspace().parse_blob(Path::new(&name))?;
        let blob_id = self.database().store(&blob)?;

        Ok(IndexEntry::new(name, blob_id, stat).with_path_flags())
    }
}
