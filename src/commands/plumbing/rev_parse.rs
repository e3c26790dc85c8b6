use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print the full object id each name resolves to
    pub fn rev_parse(&mut self, names: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        for name in names {
            let oid = self.resolve_revision(name)?;
            writeln!(self.writer(), "{}", oid)?;
        }

        Ok(())
    }
}
