//! Filesystem-facing repository components
//!
//! - `database`: Loose object store for blobs, trees, and commits
//! - `index`: Staging area backed by the binary index file
//! - `lockfile`: Exclusive `<file>.lock` used to replace files atomically
//! - `refs`: HEAD and branch references
//! - `repository`: Handle tying the components to one metadata directory
//! - `workspace`: Working tree reads, stat data and path expansion

pub mod database;
pub mod index;
pub mod lockfile;
pub mod refs;
pub mod repository;
pub mod workspace;
