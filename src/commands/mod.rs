//! Command implementations
//!
//! Commands are `impl Repository` blocks, split the way Git splits them:
//!
//! - `plumbing`: Low-level commands for direct object and index manipulation
//! - `porcelain`: User-facing commands (repository initialization)

pub mod plumbing;
pub mod porcelain;
