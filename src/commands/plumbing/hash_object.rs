use crate::areas::database::Database;
use crate::artifacts::objects::object::RawObject;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::io::Write;
use std::path::PathBuf;

/// Print the id of each file's content encoded as `object_type`
///
/// Hashing needs no repository. When `database` is given, each object is
/// stored there as well.
pub fn hash_object(
    files: &[PathBuf],
    object_type: &str,
    database: Option<&Database>,
    mut writer: impl Write,
) -> anyhow::Result<Vec<ObjectId>> {
    let object_type = ObjectType::try_from(object_type)?;
    let mut object_ids = Vec::with_capacity(files.len());

    for file in files {
        let content = std::fs::read(file)
            .with_context(|| format!("could not open {} for reading", file.display()))?;

        let raw = RawObject::encode(&object_type, &content);
        let object_id = raw.object_id();

        if let Some(database) = database {
            database
                .write(&object_id, &raw)
                .with_context(|| format!("failed to store {}", file.display()))?;
        }

        writeln!(writer, "{object_id}")?;
        object_ids.push(object_id);
    }

    Ok(object_ids)
}
