use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;

impl Repository {
    /// Create the metadata directory layout
    ///
    /// Existing directories are kept and an existing HEAD is never replaced,
    /// so running this twice is harmless.
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .git/objects directory")?;

        fs::create_dir_all(self.refs().branches_path())
            .context("Failed to create .git/branches directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .git/refs/heads directory")?;

        self.refs()
            .set_head_if_missing()
            .context("Failed to create initial HEAD reference")?;

        tracing::info!(git_dir = %self.git_path().display(), "initialized repository");
        writeln!(
            self.writer(),
            "Initialized empty Git repository in {}",
            self.git_path().display()
        )?;

        Ok(())
    }
}
