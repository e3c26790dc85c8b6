use crate::areas::repository::Repository;
use crate::artifacts::status::file_change::{IndexStatus, WorkdirStatus};
use crate::artifacts::status::report::StatusReport;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print the working tree status, section by section
    pub async fn status(&mut self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let report = StatusReport::gather(self, &index)?;

        match self.refs().current_branch()? {
            Some(branch) => writeln!(self.writer(), "On branch {}", branch)?,
            None => match self.refs().resolve("HEAD", self.database())? {
                Some(oid) => writeln!(self.writer(), "HEAD detached at {}", oid.short())?,
                None => writeln!(self.writer(), "On branch main")?,
            },
        }

        let mut staged = Vec::new();
        let mut conflicted = Vec::new();
        let mut unstaged = Vec::new();
        let mut untracked = Vec::new();

        for entry in report.entries() {
            if entry.index_status == IndexStatus::Conflicted {
                conflicted.push(format!("  both modified:   {}", entry.path));
                continue;
            }

            match entry.index_status {
                IndexStatus::Modified => staged.push(format!("  modified:   {}", entry.path)),
                IndexStatus::Added => staged.push(format!("  new file:   {}", entry.path)),
                IndexStatus::Deleted => staged.push(format!("  deleted:    {}", entry.path)),
                _ => {}
            }

            match entry.workdir_status {
                WorkdirStatus::Modified => unstaged.push(format!("  modified:   {}", entry.path)),
                WorkdirStatus::Deleted => unstaged.push(format!("  deleted:    {}", entry.path)),
                WorkdirStatus::Untracked => untracked.push(format!("  {}", entry.path)),
                _ => {}
            }
        }

        if report.has_conflicts() {
            writeln!(self.writer(), "\nYou have unmerged paths.")?;
            writeln!(self.writer(), "  (fix conflicts and run \"nit commit\")")?;
        } else if report.merge_in_progress() {
            writeln!(
                self.writer(),
                "\nAll conflicts fixed but you are still merging."
            )?;
            writeln!(self.writer(), "  (use \"nit commit\" to conclude merge)")?;
        }

        if staged.is_empty() && conflicted.is_empty() && unstaged.is_empty() && untracked.is_empty()
        {
            writeln!(self.writer(), "nothing to commit, working tree clean")?;
            return Ok(());
        }

        if !staged.is_empty() {
            writeln!(self.writer(), "\nChanges to be committed:")?;
            writeln!(
                self.writer(),
                "  (use \"nit rm --cached <file>...\" to unstage)"
            )?;
            for line in &staged {
                writeln!(self.writer(), "{}", line.green())?;
            }
        }

        if !conflicted.is_empty() {
            writeln!(self.writer(), "\nUnmerged paths:")?;
            writeln!(
                self.writer(),
                "  (use \"nit add <file>...\" to mark resolution)"
            )?;
            for line in &conflicted {
                writeln!(self.writer(), "{}", line.red())?;
            }
        }

        if !unstaged.is_empty() {
            writeln!(self.writer(), "\nChanges not staged for commit:")?;
            writeln!(
                self.writer(),
                "  (use \"nit add <file>...\" to update what will be committed)"
            )?;
            for line in &unstaged {
                writeln!(self.writer(), "{}", line.red())?;
            }
        }

        if !untracked.is_empty() {
            writeln!(self.writer(), "\nUntracked files:")?;
            writeln!(
                self.writer(),
                "  (use \"nit add <file>...\" to include in what will be committed)"
            )?;
            for line in &untracked {
                writeln!(self.writer(), "{}", line.red())?;
            }
        }

        Ok(())
    }
}
