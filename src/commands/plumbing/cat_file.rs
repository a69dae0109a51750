use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    /// Print the object type
    Type,
    /// Print the raw object content
    Pretty,
}

impl Repository {
    pub fn cat_file(&self, object_id: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(object_id)?;
        let raw = self
            .database()
            .read(&object_id)
            .with_context(|| format!("could not read object {object_id}"))?;

        match mode {
            CatFileMode::Type => writeln!(self.writer(), "{}", raw.object_type()?)?,
            CatFileMode::Pretty => self.writer().write_all(raw.content()?)?,
        }

        self.writer().flush()?;
        Ok(())
    }
}
