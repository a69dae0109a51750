//! `sg`: a minimal content-addressable object store and staging index
//!
//! Objects are stored loose and zlib-compressed, the index uses the version 2
//! `DIRC` layout, and trees are flat lists of regular-file blobs.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
