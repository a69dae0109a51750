//! Exclusive `<file>.lock` companion used for load-modify-save cycles
//!
//! The lock file is created with `O_CREAT | O_EXCL`, receives the new content
//! and is renamed over the target on `commit`. Dropping an uncommitted lock
//! removes the lock file, so the target is either fully replaced or untouched.

use crate::errors::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Lockfile {
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
}

impl Lockfile {
    pub fn acquire(target: &Path) -> Result<Self> {
        let mut lock_name = target.as_os_str().to_owned();
        lock_name.push(".lock");
        let lock_path = PathBuf::from(lock_name);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::AlreadyExists => Error::IndexLocked {
                    path: lock_path.clone(),
                },
                _ => Error::Io(err),
            })?;

        tracing::debug!(lock = %lock_path.display(), "acquired lock");

        Ok(Lockfile {
            target: target.to_path_buf(),
            lock_path,
            file: Some(file),
        })
    }

    /// Flush the written content and atomically move it over the target
    pub fn commit(mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }

        if let Err(err) = std::fs::rename(&self.lock_path, &self.target) {
            let _ = std::fs::remove_file(&self.lock_path);
            return Err(err.into());
        }

        tracing::debug!(target = %self.target.display(), "committed lock");
        Ok(())
    }
}

impl Write for Lockfile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.write(buf),
            None => Err(std::io::Error::other("lock already committed")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = std::fs::remove_file(&self.lock_path);
            tracing::debug!(lock = %self.lock_path.display(), "released uncommitted lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[rstest]
    fn second_acquire_fails_while_held(dir: TempDir) {
        let target = dir.path().join("index");
        let _held = Lockfile::acquire(&target).unwrap();

        assert!(matches!(
            Lockfile::acquire(&target),
            Err(Error::IndexLocked { .. })
        ));
    }

    #[rstest]
    fn dropping_releases_without_touching_target(dir: TempDir) {
        let target = dir.path().join("index");
        std::fs::write(&target, b"old").unwrap();

        {
            let mut lock = Lockfile::acquire(&target).unwrap();
            lock.write_all(b"new").unwrap();
        }

        assert_eq!(std::fs::read(&target).unwrap(), b"old");
        assert!(!dir.path().join("index.lock").exists());
        assert!(Lockfile::acquire(&target).is_ok());
    }

    #[rstest]
    fn commit_replaces_target(dir: TempDir) {
        let target = dir.path().join("index");
        std::fs::write(&target, b"old").unwrap();

        let mut lock = Lockfile::acquire(&target).unwrap();
        lock.write_all(b"new").unwrap();
        lock.commit().unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert!(!dir.path().join("index.lock").exists());
    }
}
