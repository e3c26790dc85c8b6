use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use std::io::Write;

impl Repository {
    /// Hash file content as an object of the given kind, optionally storing it
    pub fn hash_object(&mut self, file: &str, kind: &str, write: bool) -> anyhow::Result<()> {
        if write {
            self.ensure_initialized()?;
        }

        let kind = ObjectType::try_from(kind)?;
        let payload = self.workspace().read_file(file)?;
        let oid = self.database().store_raw(kind, &payload, write)?;

        writeln!(self.writer(), "{}", oid)?;
        Ok(())
    }
}
