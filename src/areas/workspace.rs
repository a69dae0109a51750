//! Working tree access: file content, stat data and path expansion

use crate::artifacts::index::index_entry::EntryMetadata;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 1] = [".git"];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a user-supplied path (relative to the current directory) to a
    /// path relative to the repository root
    pub fn relative_path(&self, path: &Path) -> Result<PathBuf> {
        let absolute = path.canonicalize().map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::PathNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io(err),
        })?;

        absolute
            .strip_prefix(&self.path)
            .map(Path::to_path_buf)
            .map_err(|_| Error::PathOutsideRepository {
                path: path.to_path_buf(),
                root: self.path.to_path_buf(),
            })
    }

    /// Expand a repository-relative path into the files it names
    ///
    /// A file yields itself; a directory yields every file below it, sorted,
    /// skipping the metadata directory.
    pub fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let absolute = self.path.join(path);
        let metadata = std::fs::symlink_metadata(&absolute).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::PathNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io(err),
        })?;

        if !metadata.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&absolute)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.file_name().to_string_lossy().as_ref()))
        {
            let entry = entry.map_err(|err| {
                Error::Io(
                    err.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
                )
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            if let Ok(relative) = entry.path().strip_prefix(&self.path) {
                files.push(relative.to_path_buf());
            }
        }

        Ok(files)
    }

    fn is_ignored(name: &str) -> bool {
        IGNORED_PATHS.contains(&name)
    }

    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let content = std::fs::read(self.path.join(file_path))?;

        Ok(Bytes::from(content))
    }

    /// `lstat` the file and convert the result into index metadata
    pub fn stat_file(&self, file_path: &Path) -> Result<EntryMetadata> {
        let absolute = self.path.join(file_path);
        let metadata = std::fs::symlink_metadata(&absolute)?;

        Ok((absolute.as_path(), &metadata).into())
    }
}
