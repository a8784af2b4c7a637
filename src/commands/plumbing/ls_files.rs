use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print staged paths in staging-list order
    ///
    /// With `stage`, each line is `mode oid stage\tpath`.
    pub fn ls_files(&self, stage: bool) -> anyhow::Result<()> {
        let entries = self.index().load()?;

        let mut writer = self.writer();
        for entry in &entries {
            if stage {
                writeln!(
                    writer,
                    "{} {} {}\t{}",
                    entry.metadata.mode,
                    entry.oid,
                    entry.stage(),
                    entry.name
                )?;
            } else {
                writeln!(writer, "{}", entry.name)?;
            }
        }

        Ok(())
    }
}
