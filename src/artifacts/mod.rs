//! Git data structures and codecs
//!
//! - `index`: Index file header, entries, checksum and staging outcomes
//! - `objects`: Git object types (blob, tree, commit) and their encoding

pub mod index;
pub mod objects;
