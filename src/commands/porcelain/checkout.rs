use crate::areas::repository::Repository;
use crate::artifacts::core::Fatal;
use crate::artifacts::status::report::StatusReport;
use std::io::Write;

const DETACHED_NOTICE: &str = "\
You are in 'detached HEAD' state. You can look around, make experimental
changes and commit them, and you can discard any commits you make in this
state by checking out a branch again.";

impl Repository {
    /// Switch the working tree, index and HEAD to another commit
    ///
    /// Refuses while tracked paths carry local modifications or unmerged
    /// stages; untracked files are left alone.
    pub async fn checkout(&mut self, target: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        {
            let index = self.index();
            let mut index = index.lock().await;
            index.rehydrate()?;

            let report = StatusReport::gather(self, &index)?;
            if report.has_conflicts() {
                eprintln!("hint: Fix them up in the work tree, and then use 'nit add <file>'.");
                return Err(Fatal::UnmergedIndex("You have unmerged paths.".to_string()).into());
            }
            if !report.is_clean() {
                eprintln!(
                    "error: Your local changes to the following files would be overwritten by checkout:"
                );
                for path in report.dirty_paths() {
                    eprintln!("  {}", path);
                }
                return Err(Fatal::DirtyWorkdir(
                    "Please commit your changes before you switch branches.\nAborting".to_string(),
                )
                .into());
            }
        }

        let target_oid = self.resolve_commit(target)?;
        let tree_oid = self.commit_tree_oid(&target_oid)?;

        self.apply_tree(&tree_oid, true).await?;
        self.refs().set_head(target, &target_oid)?;

        match self.refs().current_branch()? {
            Some(_) => writeln!(self.writer(), "Switched to branch '{}'", target)?,
            None => {
                writeln!(
                    self.writer(),
                    "Note: switching to '{}'.\n\n{}\n\nHEAD is now at {}",
                    target,
                    DETACHED_NOTICE,
                    target_oid.short()
                )?;
            }
        }

        Ok(())
    }
}
