use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Print the id `file` would have as an object of `object_type`
    ///
    /// Non-blob content must parse as the requested type. With `write` the
    /// object is also stored.
    pub fn hash_object(
        &self,
        file: &Path,
        object_type: ObjectType,
        write: bool,
    ) -> anyhow::Result<()> {
        let data = self
            .workspace()
            .read_file(file)
            .with_context(|| format!("unable to read {}", file.display()))?;

        let object = ObjectBox::parse(object_type, data)
            .with_context(|| format!("{} is not a valid {object_type}", file.display()))?;

        let object_id = if write {
            self.database().store(&object)?
        } else {
            object.object_id()?
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
