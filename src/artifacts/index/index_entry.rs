//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path (raw bytes, relative to the repository root)
//! - Content hash (object ID)
//! - File metadata (mode, size, timestamps)
//!
//! ## Entry Format
//!
//! ```text
//! ctime sec | ctime usec | mtime sec | mtime usec | dev | ino | mode | uid | gid | size
//!   (ten big-endian u32 fields, 40 bytes)
//! object id (20 raw bytes)
//! flags (big-endian u16): assume-valid bit, stage bits, 12-bit path length
//! path bytes, NUL, then NUL padding up to the next multiple of 8
//! ```

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bitflags::bitflags;
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::ffi::OsString;
use std::fs::Metadata;
use std::io::{BufRead, Read, Write};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Largest path length representable in the flags word; longer paths saturate
pub const MAX_PATH_SIZE: usize = 0xFFF;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Stat fields + object id + flags, before the path
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Smallest possible entry: one-byte path, NUL, padding
pub const ENTRY_MIN_SIZE: usize = 64;

bitflags! {
    /// High bits of the 16-bit flags word; the low 12 bits are the path length
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntryFlags: u16 {
        const ASSUME_VALID = 0x8000;
        const EXTENDED = 0x4000;
        const STAGE = 0x3000;
    }
}

impl Default for EntryFlags {
    fn default() -> Self {
        EntryFlags::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub name: PathBuf,
    /// SHA-1 of the blob holding the file content
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
    #[new(default)]
    pub flags: EntryFlags,
}

impl IndexEntry {
    pub fn name_bytes(&self) -> &[u8] {
        self.name.as_os_str().as_bytes()
    }

    /// Path length as recorded in the flags word, saturated at 0xFFF
    pub fn name_length(&self) -> u16 {
        self.name_bytes().len().min(MAX_PATH_SIZE) as u16
    }

    pub fn flags_word(&self) -> u16 {
        self.flags.bits() | self.name_length()
    }

    /// Total on-disk size including NUL terminator and padding
    pub fn padded_size(&self) -> usize {
        padded_entry_size(self.name_bytes().len())
    }
}

fn padded_entry_size(name_len: usize) -> usize {
    (ENTRY_FIXED_SIZE + name_len + 1).div_ceil(ENTRY_BLOCK) * ENTRY_BLOCK
}

/// Stat data cached per entry
///
/// Every field is stored as 32 bits on disk, so values from `lstat` are
/// truncated on the way in. Fractional times are kept in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: u32,
    pub ctime_usec: u32,
    pub mtime: u32,
    pub mtime_usec: u32,
    pub dev: u32,
    pub ino: u32,
    /// Raw mode word; kept verbatim so entries from other writers round-trip
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// File size truncated to 32 bits
    pub size: u32,
}

impl From<(&Path, &Metadata)> for EntryMetadata {
    fn from((file_path, metadata): (&Path, &Metadata)) -> Self {
        Self {
            ctime: metadata.ctime() as u32,
            ctime_usec: (metadata.ctime_nsec() / 1_000) as u32,
            mtime: metadata.mtime() as u32,
            mtime_usec: (metadata.mtime_nsec() / 1_000) as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode: EntryMode::from_metadata(file_path, metadata).as_u32(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
        }
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Result<Bytes> {
        let name = self.name_bytes();
        let mut entry_bytes = Vec::with_capacity(self.padded_size());

        entry_bytes.write_u32::<NetworkEndian>(self.metadata.ctime)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.ctime_usec)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.mtime)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.mtime_usec)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.dev)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.ino)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.mode)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.size)?;
        self.oid.write_raw_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<NetworkEndian>(self.flags_word())?;
        entry_bytes.write_all(name)?;

        // at least one NUL, then pad to the block size
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    /// Consume one entry, padding included, from `reader`
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let truncated = |_| Error::index_corrupt("truncated entry");

        let ctime = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let ctime_usec = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let mtime = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let mtime_usec = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let dev = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let ino = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let mode = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let uid = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let gid = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let size = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let oid = ObjectId::read_raw_from(&mut reader).map_err(truncated)?;
        let flags = reader.read_u16::<NetworkEndian>().map_err(truncated)?;

        let mut name = Vec::new();
        reader.read_until(b'\0', &mut name)?;
        if name.pop() != Some(b'\0') {
            return Err(Error::index_corrupt("missing NUL terminator in entry name"));
        }

        let consumed = ENTRY_FIXED_SIZE + name.len() + 1;
        let mut padding = vec![0u8; padded_entry_size(name.len()) - consumed];
        reader.read_exact(&mut padding).map_err(truncated)?;
        if padding.iter().any(|&b| b != 0) {
            return Err(Error::index_corrupt("non-NUL padding after entry name"));
        }

        Ok(IndexEntry {
            name: PathBuf::from(OsString::from_vec(name)),
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_usec,
                mtime,
                mtime_usec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
            flags: EntryFlags::from_bits_retain(flags & !(MAX_PATH_SIZE as u16)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn oid() -> ObjectId {
        ObjectId::digest(b"test data")
    }

    #[fixture]
    fn entry_metadata() -> EntryMetadata {
        EntryMetadata {
            ctime: 1_700_000_000,
            ctime_usec: 123_456,
            mtime: 1_700_000_001,
            mtime_usec: 654_321,
            dev: 2049,
            ino: 131_072,
            mode: 0o100755,
            uid: 1000,
            gid: 100,
            size: 42,
        }
    }

    #[rstest]
    #[case("a", 64)]
    #[case("ab", 72)]
    #[case("abcdefghi", 72)]
    #[case("abcdefghij", 80)]
    fn entries_are_padded_to_eight_bytes(
        oid: ObjectId,
        entry_metadata: EntryMetadata,
        #[case] name: &str,
        #[case] expected_size: usize,
    ) {
        let entry = IndexEntry::new(PathBuf::from(name), oid, entry_metadata);
        let bytes = entry.serialize().unwrap();

        assert_eq!(bytes.len(), expected_size);
        assert_eq!(entry.padded_size(), expected_size);
        assert_eq!(bytes[ENTRY_FIXED_SIZE + name.len()], 0);
    }

    #[rstest]
    fn fields_are_laid_out_in_order(oid: ObjectId, entry_metadata: EntryMetadata) {
        let entry = IndexEntry::new(PathBuf::from("src/lib.rs"), oid, entry_metadata);
        let bytes = entry.serialize().unwrap();

        assert_eq!(&bytes[0..4], &1_700_000_000u32.to_be_bytes());
        assert_eq!(&bytes[24..28], &0o100755u32.to_be_bytes());
        assert_eq!(&bytes[36..40], &42u32.to_be_bytes());
        assert_eq!(&bytes[40..60], oid.as_bytes());
        assert_eq!(&bytes[60..62], &10u16.to_be_bytes());
        assert_eq!(&bytes[62..72], b"src/lib.rs");
    }

    #[rstest]
    fn deserialize_reads_back_every_field(oid: ObjectId, entry_metadata: EntryMetadata) {
        let mut entry = IndexEntry::new(PathBuf::from("dir/file.txt"), oid, entry_metadata);
        entry.flags = EntryFlags::ASSUME_VALID;
        let bytes = entry.serialize().unwrap();

        let mut reader = bytes.as_ref();
        let parsed = IndexEntry::deserialize(&mut reader).unwrap();

        assert_eq!(parsed, entry);
        assert!(parsed.flags.contains(EntryFlags::ASSUME_VALID));
        assert!(reader.is_empty(), "padding must be consumed");
    }

    #[rstest]
    #[case(0o120755)]
    #[case(0o100664)]
    #[case(0o160000)]
    fn foreign_mode_words_survive_a_round_trip(
        oid: ObjectId,
        mut entry_metadata: EntryMetadata,
        #[case] mode: u32,
    ) {
        entry_metadata.mode = mode;
        let entry = IndexEntry::new(PathBuf::from("link"), oid, entry_metadata);
        let bytes = entry.serialize().unwrap();

        let parsed = IndexEntry::deserialize(bytes.as_ref()).unwrap();

        assert_eq!(parsed.metadata.mode, mode);
        assert_eq!(parsed, entry);
    }

    #[rstest]
    fn long_paths_saturate_the_length_field(oid: ObjectId, entry_metadata: EntryMetadata) {
        let name = PathBuf::from(OsString::from_vec(vec![b'x'; 5000]));
        let entry = IndexEntry::new(name, oid, entry_metadata);

        assert_eq!(entry.name_length(), 0xFFF);
        assert_eq!(entry.flags_word(), 0xFFF);

        let bytes = entry.serialize().unwrap();
        let parsed = IndexEntry::deserialize(bytes.as_ref()).unwrap();
        assert_eq!(parsed.name_bytes().len(), 5000);
        assert_eq!(parsed, entry);
    }

    #[rstest]
    fn non_nul_padding_is_corrupt(oid: ObjectId, entry_metadata: EntryMetadata) {
        let entry = IndexEntry::new(PathBuf::from("ab"), oid, entry_metadata);
        let mut bytes = entry.serialize().unwrap().to_vec();
        let last = bytes.len() - 1;
        bytes[last] = b'!';

        assert!(matches!(
            IndexEntry::deserialize(bytes.as_slice()),
            Err(Error::IndexCorrupt { .. })
        ));
    }

    #[rstest]
    fn truncated_entry_is_corrupt(oid: ObjectId, entry_metadata: EntryMetadata) {
        let entry = IndexEntry::new(PathBuf::from("ab"), oid, entry_metadata);
        let bytes = entry.serialize().unwrap();

        assert!(matches!(
            IndexEntry::deserialize(&bytes[..40]),
            Err(Error::IndexCorrupt { .. })
        ));
    }
}
