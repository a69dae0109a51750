//! Git tree object
//!
//! A tree is built from a snapshot of the index: one segment per staged path,
//! kept flat (full repository-relative paths, no nested subtrees).
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `100644 blob <path>\0<20-byte-sha1>`
//!
//! Segments need no separator: the NUL ends the path and the id is always 20 bytes.

use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::collections::BTreeMap;

/// Mode literal written for every tree entry
pub const TREE_ENTRY_MODE: &str = "100644";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    /// Path bytes to blob id; byte-wise ordering gives the serialization order
    entries: BTreeMap<Vec<u8>, ObjectId>,
}

impl Tree {
    /// Build a tree from index entries, in any order
    pub fn build<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.name_bytes().to_vec(), entry.oid))
            .collect();

        Tree { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&[u8], &ObjectId)> {
        self.entries.iter().map(|(name, oid)| (name.as_slice(), oid))
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn content(&self) -> Bytes {
        let mut content = Vec::new();

        for (name, oid) in &self.entries {
            content.extend_from_slice(TREE_ENTRY_MODE.as_bytes());
            content.push(b' ');
            content.extend_from_slice(ObjectType::Blob.as_str().as_bytes());
            content.push(b' ');
            content.extend_from_slice(name);
            content.push(b'\0');
            content.extend_from_slice(oid.as_bytes());
        }

        Bytes::from(content)
    }
}
