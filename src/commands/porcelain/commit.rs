use crate::areas::repository::Repository;
use crate::artifacts::core::Fatal;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::trees::builder::TreeBuilder;
use std::io::Write;

impl Repository {
    /// Record the index as a new commit and move HEAD forward
    ///
    /// When `MERGE_HEAD` exists its commit becomes the second parent and the
    /// marker is removed after the ref update, concluding the merge.
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let message = message.trim();
        if message.is_empty() {
            return Err(
                Fatal::Usage("Aborting commit due to empty commit message.".to_string()).into(),
            );
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if index.has_conflicts() {
            eprintln!("hint: Fix them up in the work tree, and then use 'nit add <file>'");
            eprintln!("hint: to mark resolution.");
            return Err(Fatal::UnmergedIndex(
                "Committing is not possible because you have unmerged files.".to_string(),
            )
            .into());
        }

        let merge_head = self.refs().read_merge_head()?;
        let tree_oid = TreeBuilder::new(self.database()).build_from_index(&index)?;
        let head_oid = self.refs().resolve("HEAD", self.database())?;

        if let Some(head_oid) = &head_oid {
            if merge_head.is_none() && self.commit_tree_oid(head_oid)? == tree_oid {
                writeln!(self.writer(), "nothing to commit, working tree clean")?;
                return Ok(());
            }
        }

        let mut parents = Vec::new();
        if let Some(head_oid) = head_oid {
            parents.push(head_oid);
        }
        if let Some(merge_oid) = &merge_head {
            if !parents.contains(merge_oid) {
                parents.push(merge_oid.clone());
            }
        }

        let author = Author::load_from_env();
        let commit = Commit::new(parents.clone(), tree_oid, author, message.to_string());
        let commit_oid = self.database().store(&commit)?;

        self.refs().advance_head(&commit_oid)?;

        if merge_head.is_some() {
            self.refs().clear_merge_head()?;
        }

        let branch_display = match self.refs().current_branch()? {
            Some(branch) => branch,
            None => format!("detached HEAD at {}", commit_oid.short()),
        };
        let root_marker = if parents.is_empty() { " (root-commit)" } else { "" };
        let merge_marker = if parents.len() > 1 { " (merge)" } else { "" };

        writeln!(
            self.writer(),
            "[{}{}{} {}] {}",
            branch_display,
            root_marker,
            merge_marker,
            commit_oid,
            commit.short_message()
        )?;

        Ok(())
    }
}
