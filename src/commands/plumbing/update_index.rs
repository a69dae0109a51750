use crate::areas::lockfile::Lockfile;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::stage_outcome::StageOutcome;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use anyhow::Context;
use colored::Colorize;
use std::path::PathBuf;

impl Repository {
    /// Stage `paths`, expanding directories, and write the index
    ///
    /// Paths the index does not track yet are only staged when `add` is set;
    /// the others are reported as warnings and left out. A path that does not
    /// exist aborts the whole update before the index is touched.
    pub fn update_index(
        &self,
        paths: &[PathBuf],
        add: bool,
    ) -> anyhow::Result<Vec<(PathBuf, StageOutcome)>> {
        let mut index = self.index();
        let lock = Lockfile::acquire(index.path())?;

        index.load().context("failed to read the index")?;

        let files = paths
            .iter()
            .map(|path| -> anyhow::Result<Vec<PathBuf>> {
                let relative = self.workspace().relative_path(path)?;
                Ok(self.workspace().list_files(&relative)?)
            })
            .collect::<anyhow::Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let blob = Blob::new(self.workspace().read_file(&file)?);
            let metadata = self.workspace().stat_file(&file)?;
            let entry = IndexEntry::new(file.clone(), blob.object_id(), metadata);

            let outcome = index.stage(entry, add);
            match outcome {
                StageOutcome::Staged => {
                    self.database()
                        .store(&blob)
                        .with_context(|| format!("failed to store {}", file.display()))?;
                }
                StageOutcome::Rejected(reason) => {
                    eprintln!("{} {}: {}", "warning:".yellow().bold(), file.display(), reason);
                }
            }

            outcomes.push((file, outcome));
        }

        if index.is_changed() {
            index
                .save(lock, self.workspace(), self.database())
                .context("failed to write the index")?;
        }

        Ok(outcomes)
    }
}
