use crate::areas::refs::Refs;
use crate::areas::repository::Repository;
use crate::artifacts::core::Fatal;
use crate::artifacts::refs::ref_name::RefName;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// List branches, or create one at `start_point` (HEAD by default)
    pub fn branch(
        &mut self,
        name: Option<&str>,
        start_point: Option<&str>,
    ) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let name = match name {
            None => return self.list_branches(),
            Some(name) => name,
        };

        let name = RefName::try_parse(name)
            .map_err(|err| Fatal::Usage(format!("fatal: {}", err)))?;

        let branch_path = Refs::branch_ref(name.as_ref());
        if self.refs().ref_exists(&branch_path) {
            return Err(Fatal::Usage(format!(
                "fatal: A branch named '{}' already exists.",
                name
            ))
            .into());
        }

        let start_oid = self.resolve_commit(start_point.unwrap_or("HEAD"))?;
        self.refs().update_ref(&branch_path, start_oid.as_ref(), false)?;

        Ok(())
    }

    fn list_branches(&mut self) -> anyhow::Result<()> {
        let current = self.refs().current_branch()?;

        for branch in self.refs().list_refs("heads")? {
            if current.as_deref() == Some(branch.as_str()) {
                writeln!(self.writer(), "* {}", branch.green())?;
            } else {
                writeln!(self.writer(), "  {}", branch)?;
            }
        }

        Ok(())
    }
}
