//! Repository handle
//!
//! Bundles the components that live under one metadata directory and the
//! worktree root they describe. The metadata directory is always passed down
//! explicitly; nothing below this layer consults the process working
//! directory.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::errors::{Error, Result};
use std::cell::{RefCell, RefMut};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the metadata directory inside a worktree
pub const GIT_DIR_NAME: &str = ".git";

pub struct Repository {
    root: Box<Path>,
    git_path: Box<Path>,
    writer: RefCell<Box<dyn Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("git_path", &self.git_path)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Assemble a handle for `root` whose metadata lives in `git_path`
    pub fn new(root: &Path, git_path: &Path, writer: Box<dyn Write>) -> Self {
        Repository {
            root: root.into(),
            git_path: git_path.into(),
            writer: RefCell::new(writer),
            index: RefCell::new(Index::new(git_path.join("index").into_boxed_path())),
            database: Database::new(git_path.join("objects").into_boxed_path()),
            workspace: Workspace::new(root.into()),
            refs: Refs::new(git_path.into()),
        }
    }

    /// Handle for a repository about to be created at `path`
    ///
    /// The directory is created when missing; the metadata directory is not.
    pub fn init_at(path: &Path, writer: Box<dyn Write>) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let root = path.canonicalize()?;
        let git_path = root.join(GIT_DIR_NAME);

        Ok(Self::new(&root, &git_path, writer))
    }

    /// Walk up from `start` until a directory containing `.git` is found
    pub fn discover(start: &Path, writer: Box<dyn Write>) -> Result<Self> {
        let start = start.canonicalize()?;

        let root = start
            .ancestors()
            .find(|candidate| candidate.join(GIT_DIR_NAME).is_dir())
            .ok_or_else(|| Error::NotARepository {
                start: start.clone(),
            })?;

        tracing::debug!(root = %root.display(), "discovered repository");
        Ok(Self::new(root, &root.join(GIT_DIR_NAME), writer))
    }

    /// Locate the repository for the current process
    ///
    /// `GIT_DIR` names the metadata directory directly, with the current
    /// directory as worktree root; otherwise the current directory is the
    /// starting point for discovery.
    pub fn from_env(writer: Box<dyn Write>) -> Result<Self> {
        let current_dir = std::env::current_dir()?;

        match std::env::var_os("GIT_DIR").filter(|value| !value.is_empty()) {
            Some(git_dir) => {
                let git_path = current_dir.join(PathBuf::from(git_dir));
                if !git_path.is_dir() {
                    return Err(Error::NotARepository { start: git_path });
                }

                Ok(Self::new(
                    &current_dir.canonicalize()?,
                    &git_path.canonicalize()?,
                    writer,
                ))
            }
            None => Self::discover(&current_dir, writer),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn git_path(&self) -> &Path {
        &self.git_path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }
}
