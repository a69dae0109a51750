//! Git references (HEAD and branch refs)
//!
//! References are small text files inside the metadata directory holding
//! either a 40-character hex digest or `ref: <other-ref>` for symbolic
//! indirection. Updates follow the indirection chain and rewrite the final
//! target in place under an exclusive lock.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Component, Path, PathBuf};

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

pub const DEFAULT_BRANCH: &str = "master";

/// Symbolic indirection deeper than this is treated as a loop
const MAX_SYMREF_DEPTH: usize = 5;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Parsed content of a ref file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefValue {
    SymRef(String),
    Oid(ObjectId),
}

impl RefValue {
    fn parse(content: &str) -> Result<Option<RefValue>> {
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_regex =
            regex::Regex::new(SYMREF_REGEX).map_err(|err| Error::invalid_ref(err.to_string()))?;

        match symref_regex.captures(content) {
            Some(symref_match) => Ok(Some(RefValue::SymRef(symref_match[1].to_string()))),
            None => Ok(Some(RefValue::Oid(ObjectId::try_parse(content)?))),
        }
    }
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.git`)
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    pub fn branches_path(&self) -> PathBuf {
        self.path.join("branches")
    }

    /// Point HEAD at the default branch unless HEAD already exists
    ///
    /// Returns whether HEAD was written.
    pub fn set_head_if_missing(&self) -> Result<bool> {
        let head_path = self.head_path();

        let mut head_file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&head_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        head_file.write_all(format!("ref: refs/heads/{DEFAULT_BRANCH}\n").as_bytes())?;
        Ok(true)
    }

    /// Read a ref file without following indirection
    pub fn read_raw(&self, name: &str) -> Result<Option<RefValue>> {
        let ref_path = self.ref_path(name)?;

        match std::fs::read_to_string(&ref_path) {
            Ok(content) => RefValue::parse(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Resolve `name` to a digest, following symbolic refs
    ///
    /// A ref that does not exist yet (e.g. the default branch before the
    /// first commit) resolves to `None`.
    pub fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        let target = self.resolve_symref_chain(name)?;

        match self.read_raw(&target)? {
            Some(RefValue::Oid(oid)) => Ok(Some(oid)),
            Some(RefValue::SymRef(_)) | None => Ok(None),
        }
    }

    /// Write `oid` into the ref `name` finally points to
    ///
    /// Returns the name of the ref file actually rewritten.
    pub fn update_ref(&self, name: &str, oid: &ObjectId) -> Result<String> {
        let target = self.resolve_symref_chain(name)?;
        let target_path = self.ref_path(&target)?;

        if let Some(parent) = target_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&target_path)?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().set_len(0)?;
        lock.deref_mut().write_all(format!("{oid}\n").as_bytes())?;

        tracing::info!(reference = %target, oid = %oid, "updated ref");
        Ok(target)
    }

    /// Follow `ref: ` indirection starting at `name`, returning the last name
    /// in the chain
    fn resolve_symref_chain(&self, name: &str) -> Result<String> {
        let mut current = name.to_string();

        for _ in 0..=MAX_SYMREF_DEPTH {
            match self.read_raw(&current)? {
                Some(RefValue::SymRef(next)) => {
                    tracing::debug!(from = %current, to = %next, "following symbolic ref");
                    current = next;
                }
                Some(RefValue::Oid(_)) | None => return Ok(current),
            }
        }

        Err(Error::invalid_ref(format!(
            "symbolic ref chain starting at {name} is deeper than {MAX_SYMREF_DEPTH}"
        )))
    }

    /// Map a ref name onto a file inside the metadata directory
    fn ref_path(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);

        let is_contained = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_contained {
            return Err(Error::invalid_ref(format!(
                "{name:?} does not name a file inside the repository"
            )));
        }

        Ok(self.path.join(relative))
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

    fn refs(dir: &TempDir) -> Refs {
        Refs::new(dir.path().to_path_buf().into_boxed_path())
    }

    #[rstest]
    fn head_is_written_once(dir: TempDir) {
        let refs = refs(&dir);

        assert!(refs.set_head_if_missing().unwrap());
        std::fs::write(refs.head_path(), "ref: refs/heads/other\n").unwrap();
        assert!(!refs.set_head_if_missing().unwrap());

        assert_eq!(
            std::fs::read_to_string(refs.head_path()).unwrap(),
            "ref: refs/heads/other\n"
        );
    }

    #[rstest]
    fn update_through_head_writes_the_branch(dir: TempDir) {
        let refs = refs(&dir);
        refs.set_head_if_missing().unwrap();
        let oid = ObjectId::digest(b"commit");

        let written = refs.update_ref(HEAD_REF_NAME, &oid).unwrap();

        assert_eq!(written, "refs/heads/master");
        assert_eq!(
            std::fs::read_to_string(refs.heads_path().join("master")).unwrap(),
            format!("{oid}\n")
        );
        assert_eq!(
            std::fs::read_to_string(refs.head_path()).unwrap(),
            "ref: refs/heads/master\n"
        );
        assert_eq!(refs.read_ref(HEAD_REF_NAME).unwrap(), Some(oid));
    }

    #[rstest]
    fn shorter_value_fully_replaces_longer_content(dir: TempDir) {
        let refs = refs(&dir);
        let path = dir.path().join("refs/heads/topic");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, format!("{}\n\n\n\n", ObjectId::digest(b"old"))).unwrap();
        let oid = ObjectId::digest(b"new");

        refs.update_ref("refs/heads/topic", &oid).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{oid}\n"));
    }

    #[rstest]
    fn unborn_branch_reads_as_none(dir: TempDir) {
        let refs = refs(&dir);
        refs.set_head_if_missing().unwrap();

        assert_eq!(refs.read_ref(HEAD_REF_NAME).unwrap(), None);
    }

    #[rstest]
    fn cyclic_symrefs_are_rejected(dir: TempDir) {
        let refs = refs(&dir);
        std::fs::write(dir.path().join("A"), "ref: B\n").unwrap();
        std::fs::write(dir.path().join("B"), "ref: A\n").unwrap();

        assert!(matches!(
            refs.update_ref("A", &ObjectId::digest(b"x")),
            Err(Error::InvalidRef { .. })
        ));
    }

    #[rstest]
    #[case("../outside")]
    #[case("/etc/passwd")]
    #[case("refs/../../escape")]
    #[case("")]
    fn names_escaping_the_metadata_dir_are_rejected(dir: TempDir, #[case] name: &str) {
        assert!(matches!(
            refs(&dir).update_ref(name, &ObjectId::digest(b"x")),
            Err(Error::InvalidRef { .. })
        ));
    }
}
