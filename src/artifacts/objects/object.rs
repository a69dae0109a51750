use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::io::BufRead;

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// A typed object that can be rendered into its canonical encoding
pub trait Object {
    fn object_type(&self) -> ObjectType;

    /// Object body, without the `<type> <size>\0` header
    fn content(&self) -> Bytes;

    fn encode(&self) -> RawObject {
        RawObject::encode(&self.object_type(), &self.content())
    }

    fn object_id(&self) -> ObjectId {
        self.encode().object_id()
    }
}

/// Canonical object bytes: `<type> <size>\0<content>`
///
/// This is the unit hashed for identity and the unit persisted (compressed) by
/// the object database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    bytes: Bytes,
}

impl RawObject {
    pub fn encode(object_type: &ObjectType, content: &[u8]) -> Self {
        let header = format!("{} {}\0", object_type.as_str(), content.len());

        let mut bytes = Vec::with_capacity(header.len() + content.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(content);

        RawObject {
            bytes: Bytes::from(bytes),
        }
    }

    /// Wrap already-encoded bytes; nothing is validated until a decode method is called
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        RawObject {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn object_id(&self) -> ObjectId {
        hash(&self.bytes)
    }

    pub fn object_type(&self) -> Result<ObjectType> {
        let (header, _) = self.split()?;
        let type_end = header
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::malformed_object("missing space in object header"))?;

        let object_type = std::str::from_utf8(&header[..type_end])
            .map_err(|_| Error::malformed_object("object type is not valid ASCII"))?;

        ObjectType::try_from(object_type)
            .map_err(|_| Error::malformed_object(format!("invalid object type {object_type:?}")))
    }

    pub fn content(&self) -> Result<&[u8]> {
        let (_, content) = self.split()?;
        Ok(content)
    }

    /// Size recorded in the header, which may disagree with the actual content length
    pub fn declared_size(&self) -> Result<usize> {
        let (header, _) = self.split()?;
        let size_start = header
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::malformed_object("missing space in object header"))?;

        std::str::from_utf8(&header[size_start + 1..])
            .ok()
            .and_then(|size| size.parse::<usize>().ok())
            .ok_or_else(|| Error::malformed_object("object size is not a decimal number"))
    }

    fn split(&self) -> Result<(&[u8], &[u8])> {
        let nul = self
            .bytes
            .iter()
            .position(|&b| b == b'\0')
            .ok_or_else(|| Error::malformed_object("missing NUL after object header"))?;

        Ok((&self.bytes[..nul], &self.bytes[nul + 1..]))
    }
}

/// SHA-1 of canonical object bytes
pub fn hash(canonical: &[u8]) -> ObjectId {
    ObjectId::digest(canonical)
}
