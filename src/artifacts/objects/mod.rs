//! Git object types and the object codec
//!
//! Every object is stored in its canonical encoding:
//! `<type> <size>\0<content>`
//!
//! The SHA-1 of that encoding is the object's identity. Three types are modelled:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: Flat listing of staged paths with their blob ids
//! - **Commit**: Tree snapshot bound to parents, authorship and a message
//!
//! `hash-object -t` may also produce objects of arbitrary type, which is why
//! `ObjectType` carries an `Other` variant.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in raw bytes
pub const OBJECT_ID_SIZE: usize = 20;
