use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::{Error, Result};
use sha1::{Digest, Sha1};
use std::io::Write;

/// Writer that hashes everything passing through it and appends the SHA-1
/// trailer on `finish`
#[derive(Debug)]
pub struct Checksum<W: Write> {
    inner: W,
    digest: Sha1,
}

impl<W: Write> Checksum<W> {
    pub(crate) fn new(inner: W) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
        }
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    pub(crate) fn finish(mut self) -> Result<W> {
        let checksum = self.digest.finalize();
        self.inner.write_all(checksum.as_slice())?;
        self.inner.flush()?;

        Ok(self.inner)
    }
}

/// Check the trailing SHA-1 of `data` and return the bytes it covers
pub(crate) fn verify(data: &[u8]) -> Result<&[u8]> {
    if data.len() < CHECKSUM_SIZE {
        return Err(Error::index_corrupt("file too short for checksum"));
    }

    let (body, expected) = data.split_at(data.len() - CHECKSUM_SIZE);
    let actual = Sha1::digest(body);

    if expected != actual.as_slice() {
        return Err(Error::index_corrupt(
            "checksum does not match value stored on disk",
        ));
    }

    Ok(body)
}
