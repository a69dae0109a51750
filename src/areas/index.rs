//! Git index (staging area)
//!
//! The index tracks which files should be included in the next tree, along
//! with their stat data and blob ids.
//!
//! ## Parsing
//!
//! A load walks `ReadHeader -> ReadEntry* -> ReadChecksum -> Done`, except
//! that the trailing checksum is verified over the raw bytes before any field
//! is interpreted: a single flipped byte anywhere in the file is reported as
//! corruption rather than as a confusing header or entry error.
//!
//! ## Saving
//!
//! `save` re-derives every entry from the working tree (fresh `lstat`, fresh
//! blob hash) and then writes the file through an `index.lock`, which is
//! renamed over the old index once complete. `write_updates` writes the
//! in-memory entries verbatim.

use crate::areas::database::Database;
use crate::areas::lockfile::Lockfile;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::checksum::{self, Checksum};
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::stage_outcome::{RejectReason, StageOutcome};
use crate::artifacts::index::HEADER_SIZE;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Error, Result};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::ops::DerefMut;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    /// Staged files keyed by raw path bytes, which keeps them in on-disk order
    entries: BTreeMap<Vec<u8>, IndexEntry>,
    header: IndexHeader,
    /// Set when entries were added or replaced since the last load or write
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            header: IndexHeader::empty(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path.as_os_str().as_bytes())
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.entry_by_path(path).is_some()
    }

    /// Entries in ascending byte-wise path order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Insert or replace the entry for its path
    pub fn add(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.name_bytes().to_vec(), entry);
        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;
    }

    /// Stage `entry`, refusing paths the index does not know yet unless
    /// `allow_new` is set
    pub fn stage(&mut self, entry: IndexEntry, allow_new: bool) -> StageOutcome {
        if !allow_new && !self.is_tracked(&entry.name) {
            tracing::debug!(path = %entry.name.display(), "refusing to stage untracked path");
            return StageOutcome::Rejected(RejectReason::PathNotTracked);
        }

        self.add(entry);
        StageOutcome::Staged
    }

    /// Load the index from disk
    ///
    /// A missing or zero-length file yields an empty index. The file is read
    /// under a shared lock.
    pub fn load(&mut self) -> Result<()> {
        self.clear();

        let mut index_file = match std::fs::File::open(self.path()) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no index file, starting empty");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let mut content = Vec::new();
        {
            let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;
            lock.deref_mut().read_to_end(&mut content)?;
        }

        if content.is_empty() {
            return Ok(());
        }

        self.parse(&content)?;
        self.changed = false;

        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "loaded index");
        Ok(())
    }

    fn parse(&mut self, content: &[u8]) -> Result<()> {
        let body = checksum::verify(content)?;

        if body.len() < HEADER_SIZE {
            return Err(Error::index_corrupt("file too short for header"));
        }

        let mut reader = Cursor::new(body);
        let header = IndexHeader::deserialize(&mut reader)?;
        header.validate()?;

        for _ in 0..header.entries_count {
            let entry = IndexEntry::deserialize(&mut reader)?;
            self.entries.insert(entry.name_bytes().to_vec(), entry);
        }

        let remaining = body.len() as u64 - reader.position();
        if remaining > 0 {
            tracing::debug!(bytes = remaining, "skipping index extension data");
        }

        self.header = header;
        self.header.entries_count = self.entries.len() as u32;

        Ok(())
    }

    /// Refresh every entry from the working tree, then write through `lock`
    ///
    /// Each staged file is re-stat'ed and re-hashed; the resulting blob is
    /// stored so the index never points at a missing object. Entries whose file
    /// has vanished keep their cached data.
    pub fn save(&mut self, lock: Lockfile, workspace: &Workspace, database: &Database) -> Result<()> {
        self.refresh(workspace, database)?;
        self.write_updates(lock)
    }

    fn refresh(&mut self, workspace: &Workspace, database: &Database) -> Result<()> {
        for entry in self.entries.values_mut() {
            let metadata = match workspace.stat_file(&entry.name) {
                Ok(metadata) => metadata,
                Err(Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(path = %entry.name.display(), "staged file is gone, keeping cached entry");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let blob = Blob::new(workspace.read_file(&entry.name)?);
            entry.oid = database.store(&blob)?;
            entry.metadata = metadata;
        }

        Ok(())
    }

    /// Serialize header, entries and checksum into `lock` and commit it
    pub fn write_updates(&mut self, mut lock: Lockfile) -> Result<()> {
        self.write_to(&mut lock)?;
        lock.commit()?;

        self.changed = false;
        tracing::info!(path = %self.path.display(), entries = self.entries.len(), "wrote index");

        Ok(())
    }

    /// Serialize the index, trailing checksum included
    pub fn write_to<W: Write>(&mut self, writer: W) -> Result<W> {
        let mut writer = Checksum::new(writer);

        self.header = IndexHeader {
            entries_count: self.entries.len() as u32,
            ..self.header.clone()
        };
        writer.write(&self.header.serialize()?)?;

        for entry in self.entries.values() {
            writer.write(&entry.serialize()?)?;
        }

        writer.finish()
    }
}
