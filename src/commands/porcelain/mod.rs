//! Porcelain commands (user-facing Git operations)
//!
//! - `init`: Initialize a new repository

pub mod init;
