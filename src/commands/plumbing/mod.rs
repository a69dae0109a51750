//! Plumbing commands (low-level Git operations)
//!
//! ## Commands
//!
//! - `hash-object`: Compute an object id and optionally store the object
//! - `cat-file`: Show the type or raw content of a stored object
//! - `commit-tree`: Create a commit from a tree, parents and a message
//! - `update-index`: Stage files in the index
//! - `write-tree`: Store the index as a tree object
//! - `update-ref`: Point a reference at an object

pub mod cat_file;
pub mod commit_tree;
pub mod hash_object;
pub mod update_index;
pub mod update_ref;
pub mod write_tree;
