//! Mode word recorded for freshly staged files
//!
//! The word holds the object kind in bits 12..16 and the unix permission bits
//! below it. Entries read back from disk keep whatever word they carried;
//! this type only derives the word for a file we just `lstat`ed.

use is_executable::IsExecutable;
use std::fs::Metadata;
use std::path::Path;

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    File(FileMode),
    Symlink,
}

impl Default for EntryMode {
    fn default() -> Self {
        EntryMode::File(FileMode::Regular)
    }
}

impl EntryMode {
    /// Coarse guess from `lstat` data: symlink or regular file, with the
    /// executable bit deciding between the two file permissions
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        if metadata.file_type().is_symlink() {
            EntryMode::Symlink
        } else if path.is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Symlink => 0o120000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn stat_derived_modes() {
        let dir = TempDir::new().unwrap();
        let plain = dir.child("plain.txt");
        plain.write_str("text").unwrap();
        let script = dir.child("run.sh");
        script.write_str("#!/bin/sh\n").unwrap();
        std::fs::set_permissions(script.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
        let link = dir.child("link");
        link.symlink_to_file(plain.path()).unwrap();

        let mode_of = |path: &Path| {
            EntryMode::from_metadata(path, &std::fs::symlink_metadata(path).unwrap()).as_u32()
        };

        pretty_assertions::assert_eq!(mode_of(plain.path()), 0o100644);
        pretty_assertions::assert_eq!(mode_of(script.path()), 0o100755);
        pretty_assertions::assert_eq!(mode_of(link.path()), 0o120000);
    }
}
