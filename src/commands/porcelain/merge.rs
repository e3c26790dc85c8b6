use crate::areas::repository::Repository;
use crate::artifacts::core::Fatal;
use crate::artifacts::index::index_entry::{IndexEntry, Stage};
use crate::artifacts::merge::base_finder::MergeBaseFinder;
use crate::artifacts::merge::three_way::{
    ConflictKind, MergeDisposition, PathMergeOutcome, classify_trees,
};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::report::StatusReport;
use crate::artifacts::trees::reader::TreeReader;
use bytes::Bytes;
use std::io::Write;

impl Repository {
    /// Merge another branch into HEAD
    ///
    /// Trivial cases short-circuit: an up-to-date target reports and exits,
    /// and a target ahead of HEAD fast-forwards by moving the current ref.
    /// The general case runs the three-way classification against the merge
    /// base, materialises the result, and either concludes through the commit
    /// protocol or leaves conflict state behind for resolution.
    pub async fn merge(&mut self, target: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        {
            let index = self.index();
            let mut index = index.lock().await;
            index.rehydrate()?;

            if index.has_conflicts() {
                return Err(Fatal::UnmergedIndex(
                    "You have unmerged paths from a previous merge.".to_string(),
                )
                .into());
            }
            if self.refs().merge_in_progress() {
                return Err(Fatal::MergeInProgress(
                    "You are in the middle of a merge already.".to_string(),
                )
                .into());
            }

            let report = StatusReport::gather(self, &index)?;
            if !report.is_clean() {
                eprintln!("hint: Commit or stash your changes before merging.");
                return Err(Fatal::DirtyWorkdir(
                    "Your local changes would be overwritten by merge.".to_string(),
                )
                .into());
            }
        }

        let head_oid = self
            .refs()
            .resolve("HEAD", self.database())?
            .ok_or_else(|| Fatal::Usage("fatal: cannot merge, HEAD is unborn".to_string()))?;
        let merge_oid = self.resolve_commit(target)?;

        if head_oid == merge_oid {
            writeln!(self.writer(), "Already up to date.")?;
            return Ok(());
        }

        let database = self.database();
        let base_finder = MergeBaseFinder::new(|oid: &ObjectId| database.slim_commit(oid));
        let base_oid = base_finder
            .find(&head_oid, &merge_oid)?
            .ok_or_else(|| Fatal::Usage("fatal: no common ancestor found".to_string()))?;

        if base_oid == merge_oid {
            writeln!(self.writer(), "Already up to date.")?;
            return Ok(());
        }

        if base_oid == head_oid {
            return self.fast_forward(&head_oid, &merge_oid).await;
        }

        self.three_way_merge(&base_oid, &head_oid, &merge_oid, target)
            .await
    }

    /// Move the current ref onto the target; no new commit
    async fn fast_forward(&mut self, head_oid: &ObjectId, merge_oid: &ObjectId) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "Updating {}..{}\nFast-forward",
            head_oid.short(),
            merge_oid.short()
        )?;

        let tree_oid = self.commit_tree_oid(merge_oid)?;
        self.apply_tree(&tree_oid, true).await?;
        self.refs().advance_head(merge_oid)?;

        Ok(())
    }

    async fn three_way_merge(
        &mut self,
        base_oid: &ObjectId,
        head_oid: &ObjectId,
        merge_oid: &ObjectId,
        target: &str,
    ) -> anyhow::Result<()> {
        let reader = TreeReader::new(self.database());
        let base_tree = reader.flatten_commit(base_oid)?;
        let ours_tree = reader.flatten_commit(head_oid)?;
        let theirs_tree = reader.flatten_commit(merge_oid)?;

        let outcomes = classify_trees(&base_tree, &ours_tree, &theirs_tree);

        let mut conflicts_found = false;
        {
            let index = self.index();
            let mut index = index.lock().await;
            index.rehydrate()?;
            index.reset();

            for (path, outcome) in &outcomes {
                match &outcome.disposition {
                    MergeDisposition::Unmodified => {
                        self.materialise_entry(&mut index, path, outcome, None)?;
                    }
                    MergeDisposition::Modified => {
                        self.materialise_entry(&mut index, path, outcome, Some('M'))?;
                    }
                    MergeDisposition::Added => {
                        self.materialise_entry(&mut index, path, outcome, Some('A'))?;
                    }
                    MergeDisposition::Deleted => {
                        if let Err(err) = self.workspace().remove_file(path) {
                            eprintln!("warning: unable to delete {}: {}", path, err);
                        }
                        writeln!(self.writer(), " D\t{}", path)?;
                    }
                    MergeDisposition::Conflict(kind) => {
                        conflicts_found = true;
                        self.report_conflict(*kind, path, target);
                        self.materialise_conflict(&mut index, path, outcome, target)?;
                        writeln!(self.writer(), " C\t{}", path)?;
                    }
                }
            }

            index.write_updates()?;
        }

        // recorded in both outcomes so the concluding commit carries the
        // second parent
        self.refs().write_merge_head(merge_oid)?;

        if conflicts_found {
            return Err(Fatal::MergeConflict(
                "Automatic merge failed; fix conflicts and then commit the result.".to_string(),
            )
            .into());
        }

        self.commit(&format!("Merge branch '{}'", target)).await
    }

    fn materialise_entry(
        &self,
        index: &mut crate::areas::index::Index,
        path: &str,
        outcome: &PathMergeOutcome,
        marker: Option<char>,
    ) -> anyhow::Result<()> {
        let entry = outcome
            .merged
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("missing merged entry for {}", path))?;

        self.write_blob_to_workdir(path, entry)?;
        index.add(IndexEntry::new(
            path.to_string(),
            entry.oid.clone(),
            entry.mode,
            Stage::Resolved,
        ));

        if let Some(marker) = marker {
            writeln!(self.writer(), " {}\t{}", marker, path)?;
        }

        Ok(())
    }

    /// Insert the present sides at stages 1/2/3 and write the marker envelope
    fn materialise_conflict(
        &self,
        index: &mut crate::areas::index::Index,
        path: &str,
        outcome: &PathMergeOutcome,
        target: &str,
    ) -> anyhow::Result<()> {
        let staged_sides = [
            (Stage::Base, &outcome.base),
            (Stage::Ours, &outcome.ours),
            (Stage::Theirs, &outcome.theirs),
        ];
        for (stage, side) in staged_sides {
            if let Some(entry) = side {
                index.set(IndexEntry::new(
                    path.to_string(),
                    entry.oid.clone(),
                    entry.mode,
                    stage,
                ));
            }
        }

        let ours_content = self.side_content(&outcome.ours)?;
        let theirs_content = self.side_content(&outcome.theirs)?;

        let mut envelope = Vec::new();
        envelope.extend_from_slice(b"<<<<<<< HEAD\n");
        Self::push_terminated(&mut envelope, &ours_content);
        envelope.extend_from_slice(b"=======\n");
        Self::push_terminated(&mut envelope, &theirs_content);
        envelope.extend_from_slice(format!(">>>>>>> {}\n", target).as_bytes());

        self.workspace().write_file(path, &envelope)?;
        Ok(())
    }

    fn side_content(
        &self,
        side: &Option<crate::artifacts::database::database_entry::DatabaseEntry>,
    ) -> anyhow::Result<Bytes> {
        match side {
            None => Ok(Bytes::new()),
            Some(entry) => {
                let blob = self
                    .database()
                    .parse_object_as_blob(&entry.oid)?
                    .ok_or_else(|| {
                        anyhow::anyhow!("conflict side {} is not a blob", entry.oid.short())
                    })?;
                Ok(Bytes::copy_from_slice(blob.content()))
            }
        }
    }

    /// Append a content block, newline-terminating it if needed
    fn push_terminated(envelope: &mut Vec<u8>, content: &[u8]) {
        envelope.extend_from_slice(content);
        if content.last() != Some(&b'\n') {
            envelope.push(b'\n');
        }
    }

    fn report_conflict(&self, kind: ConflictKind, path: &str, target: &str) {
        match kind {
            ConflictKind::AddAdd => {
                eprintln!("CONFLICT (add/add): File {} added in both branches.", path);
            }
            ConflictKind::ModifyDelete => {
                eprintln!(
                    "CONFLICT (modify/delete): File {} modified in HEAD and deleted in {}.",
                    path, target
                );
            }
            ConflictKind::DeleteModify => {
                eprintln!(
                    "CONFLICT (delete/modify): File {} deleted in HEAD and modified in {}.",
                    path, target
                );
            }
            ConflictKind::Content => {
                eprintln!("CONFLICT (content): Merge conflict in {}", path);
            }
        }
    }
}
