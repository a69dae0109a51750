//! Git commit object
//!
//! Commits bind a tree snapshot to its parent commits, authorship and a message.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>          (zero or more)
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! The message bytes are kept exactly as supplied.

use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use derive_new::new;

const DEFAULT_NAME: &str = "sg";
const DEFAULT_EMAIL: &str = "sg@localhost";

/// Author or committer information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Create a new author with the current local time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// "Name <email> <epoch-seconds> <+HHMM>", as written in commit headers
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Author identity from `GIT_AUTHOR_NAME`, `GIT_AUTHOR_EMAIL` and `GIT_AUTHOR_DATE`
    ///
    /// Unset name or email fall back to the built-in identity; an unset date
    /// means "now".
    pub fn load_from_env() -> anyhow::Result<Self> {
        Self::load_role_from_env("AUTHOR", None)
    }

    /// Committer identity from the `GIT_COMMITTER_*` variables, each falling
    /// back to the corresponding author value
    pub fn load_committer_from_env(author: &Author) -> anyhow::Result<Self> {
        Self::load_role_from_env("COMMITTER", Some(author))
    }

    fn load_role_from_env(role: &str, fallback: Option<&Author>) -> anyhow::Result<Self> {
        let var = |field: &str| {
            std::env::var(format!("GIT_{role}_{field}"))
                .ok()
                .filter(|value| !value.is_empty())
        };

        let name = var("NAME")
            .or_else(|| fallback.map(|author| author.name.clone()))
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let email = var("EMAIL")
            .or_else(|| fallback.map(|author| author.email.clone()))
            .unwrap_or_else(|| DEFAULT_EMAIL.to_string());

        match var("DATE") {
            Some(date) => {
                let timestamp = parse_date(&date)
                    .with_context(|| format!("Invalid GIT_{role}_DATE: {date}"))?;
                Ok(Author::new_with_timestamp(name, email, timestamp))
            }
            None => match fallback {
                Some(author) => Ok(Author::new_with_timestamp(name, email, author.timestamp)),
                None => Ok(Author::new(name, email)),
            },
        }
    }
}

/// Accepts RFC 2822, `%Y-%m-%d %H:%M:%S %z` and the raw `<epoch> <+HHMM>` form
fn parse_date(date: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc2822(date) {
        return Ok(timestamp);
    }
    if let Ok(timestamp) = DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z") {
        return Ok(timestamp);
    }

    DateTime::parse_from_str(date, "%s %z").context("unrecognised date format")
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Commit {
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    #[new(into)]
    message: Bytes,
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn content(&self) -> Bytes {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        lines.extend(self.parents.iter().map(|parent| format!("parent {parent}")));
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));

        let mut content = lines.join("\n").into_bytes();
        content.extend_from_slice(b"\n\n");
        content.extend_from_slice(&self.message);

        Bytes::from(content)
    }
}
