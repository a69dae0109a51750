use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Error, Result};
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Read, Write};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub(crate) marker: [u8; 4],
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn empty() -> Self {
        IndexHeader {
            marker: *SIGNATURE,
            version: VERSION,
            entries_count: 0,
        }
    }

    /// Reject anything but a version 2 `DIRC` header
    pub(crate) fn validate(&self) -> Result<()> {
        if &self.marker != SIGNATURE {
            return Err(Error::index_corrupt(format!(
                "bad signature {:?}",
                String::from_utf8_lossy(&self.marker)
            )));
        }

        if self.version != VERSION {
            return Err(Error::UnsupportedIndexVersion {
                version: self.version,
            });
        }

        Ok(())
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.write_all(&self.marker)?;
        bytes.write_u32::<NetworkEndian>(self.version)?;
        bytes.write_u32::<NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let truncated = |_| Error::index_corrupt("truncated header");

        let mut marker = [0u8; 4];
        reader.read_exact(&mut marker).map_err(truncated)?;
        let version = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let entries_count = reader.read_u32::<NetworkEndian>().map_err(truncated)?;

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn header_layout_is_big_endian() {
        let header = IndexHeader::new(*SIGNATURE, VERSION, 3);

        assert_eq!(
            header.serialize().unwrap().as_ref(),
            b"DIRC\x00\x00\x00\x02\x00\x00\x00\x03"
        );
    }

    #[rstest]
    fn version_three_is_unsupported() {
        let header = IndexHeader::deserialize(&b"DIRC\x00\x00\x00\x03\x00\x00\x00\x00"[..]).unwrap();

        assert!(matches!(
            header.validate(),
            Err(Error::UnsupportedIndexVersion { version: 3 })
        ));
    }

    #[rstest]
    fn wrong_signature_is_corrupt() {
        let header = IndexHeader::deserialize(&b"CRID\x00\x00\x00\x02\x00\x00\x00\x00"[..]).unwrap();

        assert!(matches!(header.validate(), Err(Error::IndexCorrupt { .. })));
    }

    #[rstest]
    fn short_header_is_corrupt() {
        assert!(matches!(
            IndexHeader::deserialize(&b"DIRC\x00\x00"[..]),
            Err(Error::IndexCorrupt { .. })
        ));
    }
}
