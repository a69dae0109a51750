//! Loose object database
//!
//! Objects live zlib-compressed under `objects/<first-2-hex>/<remaining-38-hex>`.
//! Writes are idempotent: an object already on disk is left alone, since equal
//! ids imply equal bytes.

use crate::artifacts::objects::object::{Object, RawObject};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    /// Encode, hash and persist a typed object
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let raw = object.encode();
        let object_id = raw.object_id();

        self.write(&object_id, &raw)?;

        Ok(object_id)
    }

    /// Persist canonical object bytes under `object_id`
    pub fn write(&self, object_id: &ObjectId, raw: &RawObject) -> Result<()> {
        let object_path = self.object_path(object_id);

        if object_path.exists() {
            tracing::debug!(oid = %object_id, "object already stored");
            return Ok(());
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::corrupt_object(object_id, "invalid object path"))?;
        std::fs::create_dir_all(object_dir)?;

        self.write_object(object_dir, &object_path, raw.as_bytes())?;
        tracing::debug!(oid = %object_id, size = raw.as_bytes().len(), "stored object");

        Ok(())
    }

    /// Load and decompress the canonical bytes of `object_id`
    ///
    /// The bytes are checked against the id and against the size in their
    /// header before being handed out.
    pub fn read(&self, object_id: &ObjectId) -> Result<RawObject> {
        let object_path = self.object_path(object_id);

        let compressed = match std::fs::read(&object_path) {
            Ok(compressed) => compressed,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ObjectNotFound {
                    oid: object_id.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let raw = RawObject::from_bytes(
            Self::decompress(&compressed)
                .map_err(|err| Error::corrupt_object(object_id, format!("zlib: {err}")))?,
        );

        if &raw.object_id() != object_id {
            return Err(Error::corrupt_object(object_id, "content does not match object id"));
        }

        let content_len = raw
            .content()
            .map_err(|err| Error::corrupt_object(object_id, err.to_string()))?
            .len();
        let declared_size = raw
            .declared_size()
            .map_err(|err| Error::corrupt_object(object_id, err.to_string()))?;
        if content_len != declared_size {
            return Err(Error::corrupt_object(
                object_id,
                format!("header declares {declared_size} bytes, found {content_len}"),
            ));
        }

        tracing::debug!(oid = %object_id, "loaded object");
        Ok(raw)
    }

    pub fn object_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        self.read(object_id)?.object_type()
    }

    fn write_object(&self, object_dir: &Path, object_path: &Path, content: &[u8]) -> Result<()> {
        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let compressed = Self::compress(content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)?;
        file.write_all(&compressed)?;
        drop(file);

        // rename the temp file into place so readers never see a partial object
        if let Err(err) = std::fs::rename(&temp_object_path, object_path) {
            let _ = std::fs::remove_file(&temp_object_path);
            return Err(err.into());
        }

        Ok(())
    }

    fn compress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;

        encoder.finish().map(Bytes::from)
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
