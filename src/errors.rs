//! Typed errors for the object store, the index codec and repository lookup
//!
//! Every integrity check surfaces as one of these variants instead of a panic,
//! so callers can abort the current operation cleanly. Command implementations
//! wrap them into `anyhow::Error` with additional context.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No metadata directory between the start path and the filesystem root
    #[error("not a git repository (or any of the parent directories): {start}")]
    NotARepository { start: PathBuf },

    #[error("unsupported index version {version}, only version 2 is supported")]
    UnsupportedIndexVersion { version: u32 },

    #[error("index file corrupt: {reason}")]
    IndexCorrupt { reason: String },

    /// Another writer holds `index.lock`
    #[error("unable to create {path}: file exists, another process seems to be updating the index")]
    IndexLocked { path: PathBuf },

    #[error("object {oid} not found")]
    ObjectNotFound { oid: String },

    #[error("object {oid} is corrupt: {reason}")]
    CorruptObject { oid: String, reason: String },

    #[error("malformed object: {reason}")]
    MalformedObject { reason: String },

    #[error("invalid object id: {reason}")]
    InvalidObjectId { reason: String },

    #[error("invalid object type {value:?}")]
    InvalidObjectType { value: String },

    #[error("invalid reference: {reason}")]
    InvalidRef { reason: String },

    #[error("{path} is outside repository at {root}")]
    PathOutsideRepository { path: PathBuf, root: PathBuf },

    #[error("pathspec {path} did not match any files")]
    PathNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn index_corrupt(reason: impl Into<String>) -> Self {
        Error::IndexCorrupt {
            reason: reason.into(),
        }
    }

    pub fn corrupt_object(oid: impl ToString, reason: impl Into<String>) -> Self {
        Error::CorruptObject {
            oid: oid.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed_object(reason: impl Into<String>) -> Self {
        Error::MalformedObject {
            reason: reason.into(),
        }
    }

    pub fn invalid_ref(reason: impl Into<String>) -> Self {
        Error::InvalidRef {
            reason: reason.into(),
        }
    }
}
