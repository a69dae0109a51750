use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;

impl Repository {
    /// Store the current index as a tree and print its id
    pub fn write_tree(&self) -> anyhow::Result<ObjectId> {
        let tree = {
            let mut index = self.index();
            index.load().context("failed to read the index")?;

            Tree::build(index.entries())
        };

        let tree_id = self
            .database()
            .store(&tree)
            .context("failed to store tree")?;
        tracing::info!(oid = %tree_id, entries = tree.len(), "wrote tree");

        writeln!(self.writer(), "{tree_id}")?;
        Ok(tree_id)
    }
}
