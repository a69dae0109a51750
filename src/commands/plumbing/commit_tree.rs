use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;

impl Repository {
    /// Create a commit for `tree` with the given parents and message
    ///
    /// The tree and every parent must already be stored with the right type.
    pub fn commit_tree(
        &self,
        tree: &str,
        parents: &[String],
        message: Bytes,
    ) -> anyhow::Result<ObjectId> {
        let tree_oid = ObjectId::try_parse(tree)?;
        self.expect_object_type(&tree_oid, ObjectType::Tree)?;

        let parents = parents
            .iter()
            .map(|parent| -> anyhow::Result<ObjectId> {
                let parent_oid = ObjectId::try_parse(parent)?;
                self.expect_object_type(&parent_oid, ObjectType::Commit)?;
                Ok(parent_oid)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let author = Author::load_from_env()?;
        let committer = Author::load_committer_from_env(&author)?;
        let commit = Commit::new(parents, tree_oid, author, committer, message);

        let commit_id = self
            .database()
            .store(&commit)
            .context("failed to store commit")?;
        tracing::info!(oid = %commit_id, tree = %tree_oid, "created commit");

        writeln!(self.writer(), "{commit_id}")?;
        Ok(commit_id)
    }

    fn expect_object_type(&self, object_id: &ObjectId, expected: ObjectType) -> anyhow::Result<()> {
        let actual = self
            .database()
            .object_type(object_id)
            .with_context(|| format!("{object_id} is not a valid '{expected}' object"))?;

        if actual != expected {
            anyhow::bail!("{object_id} is a '{actual}', not a '{expected}'");
        }

        Ok(())
    }
}
