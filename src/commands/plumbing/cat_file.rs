use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_type::ObjectType;
use std::io::Write;

impl Repository {
    /// Print, for each prefix in turn, the first object of `object_type`
    /// whose id starts with it
    ///
    /// Blobs are written byte for byte; trees and commits in their readable
    /// form. The first prefix that resolves to nothing stops the command.
    pub fn cat_file(&self, prefixes: &[String], object_type: ObjectType) -> anyhow::Result<()> {
        for prefix in prefixes {
            let (object_id, object) = self.database().find_object(prefix, object_type)?;
            tracing::debug!(prefix, oid = %object_id, "resolved object");

            let mut writer = self.writer();
            match object {
                ObjectBox::Blob(blob) => writer.write_all(blob.content())?,
                other => writeln!(writer, "{}", other.display())?,
            }
        }

        Ok(())
    }
}
