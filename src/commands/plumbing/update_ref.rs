use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;

impl Repository {
    /// Point `reference` (after following symbolic refs) at `value`
    pub fn update_ref(&self, reference: &str, value: &str) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(value)?;

        self.refs()
            .update_ref(reference, &object_id)
            .with_context(|| format!("cannot update ref '{reference}'"))?;

        Ok(())
    }
}
