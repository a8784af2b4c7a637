use crate::areas::refs::DEFAULT_BRANCH;
use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

const DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

impl Repository {
    /// Create the control directory skeleton
    ///
    /// Running it again only fills in what is missing.
    pub fn init(&self) -> anyhow::Result<()> {
        let git_dir = self.git_dir();
        let reinitialized = git_dir.is_dir();

        fs::create_dir_all(self.objects_path()).context("Failed to create .git/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .git/refs/heads directory")?;

        fs::create_dir_all(self.refs().refs_path().join("tags"))
            .context("Failed to create .git/refs/tags directory")?;

        fs::create_dir_all(git_dir.join("branches"))
            .context("Failed to create .git/branches directory")?;

        let description_path = git_dir.join("description");
        if !description_path.exists() {
            fs::write(&description_path, DESCRIPTION)
                .context("Failed to create .git/description file")?;
        }

        self.refs()
            .init_head(DEFAULT_BRANCH)
            .context("Failed to create initial HEAD reference")?;

        tracing::info!(path = %git_dir.display(), reinitialized, "repository ready");

        let verb = if reinitialized {
            "Reinitialized existing"
        } else {
            "Initialized empty"
        };
        writeln!(self.writer(), "{verb} Git repository in {}", git_dir.display())?;

        Ok(())
    }
}
