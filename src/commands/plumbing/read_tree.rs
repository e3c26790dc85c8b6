use crate::areas::repository::Repository;
use crate::artifacts::core::Fatal;
use crate::artifacts::index::index_entry::{IndexEntry, Stage};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;

impl Repository {
    /// Reset the index (and optionally the working tree) to a stored tree
    pub async fn read_tree(
        &mut self,
        target: &str,
        update_workdir: bool,
        merge: bool,
    ) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        if merge {
            return Err(Fatal::Usage(
                "read-tree: merge mode is handled by the merge command".to_string(),
            )
            .into());
        }

        let tree_oid = self.resolve_tree(target)?;
        self.apply_tree(&tree_oid, update_workdir).await?;

        Ok(())
    }

    /// Resolve a tree-ish name: commits peel to their tree
    pub(crate) fn resolve_tree(&self, target: &str) -> anyhow::Result<ObjectId> {
        let oid = self.resolve_revision(target)?;
        let (kind, _) = self.database().object_kind(&oid)?;

        match kind {
            ObjectType::Tree => Ok(oid),
            ObjectType::Commit => self.commit_tree_oid(&oid),
            other => Err(Fatal::WrongObjectKind(format!(
                "'{}' (which resolved to {}) is a {}, not a tree",
                target,
                oid.short(),
                other
            ))
            .into()),
        }
    }

    /// Replace the index with a tree's flattened entries
    ///
    /// With `update_workdir`, the working tree is first reconciled: paths in
    /// the old stage-0 view but not the new tree are deleted (best effort),
    /// and every path in the new tree whose workdir copy is missing, has
    /// different content, or a different mode is rewritten from its blob with
    /// the executable bit applied. Per-path failures warn and the batch
    /// continues; the final index replacement is atomic.
    pub(crate) async fn apply_tree(
        &self,
        tree_oid: &ObjectId,
        update_workdir: bool,
    ) -> anyhow::Result<()> {
        let flat = crate::artifacts::trees::reader::TreeReader::new(self.database())
            .flatten(tree_oid)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if update_workdir {
            let old_paths: Vec<String> = index
                .stage0_entries()
                .map(|entry| entry.path.clone())
                .collect();

            for path in old_paths {
                if !flat.contains_key(&path) {
                    if let Err(err) = self.workspace().remove_file(&path) {
                        eprintln!("warning: unable to delete {}: {}", path, err);
                    }
                }
            }

            for (path, entry) in &flat {
                match self.workdir_matches(path, entry) {
                    Ok(true) => continue,
                    Ok(false) => {}
                    Err(err) => {
                        eprintln!("warning: unable to inspect {}: {}", path, err);
                    }
                }

                if let Err(err) = self.write_blob_to_workdir(path, entry) {
                    eprintln!("warning: unable to check out {}: {}", path, err);
                }
            }
        }

        index.reset();
        for (path, entry) in flat {
            index.add(IndexEntry::new(path, entry.oid, entry.mode, Stage::Resolved));
        }
        index.write_updates()?;

        Ok(())
    }

    fn workdir_matches(
        &self,
        path: &str,
        entry: &crate::artifacts::database::database_entry::DatabaseEntry,
    ) -> anyhow::Result<bool> {
        use crate::artifacts::objects::blob::Blob;
        use crate::artifacts::objects::object::Object;

        let mode = match self.workspace().probe_mode(path)? {
            None => return Ok(false),
            Some(mode) => mode,
        };
        if mode != entry.mode {
            return Ok(false);
        }

        let current = Blob::new(self.workspace().hashable_bytes(path)?).object_id()?;
        Ok(current == entry.oid)
    }

    pub(crate) fn write_blob_to_workdir(
        &self,
        path: &str,
        entry: &crate::artifacts::database::database_entry::DatabaseEntry,
    ) -> anyhow::Result<()> {
        let blob = self
            .database()
            .parse_object_as_blob(&entry.oid)?
            .ok_or_else(|| {
                anyhow::anyhow!("object {} for {} is not a blob", entry.oid.short(), path)
            })?;

        self.workspace().write_file(path, blob.content())?;
        self.workspace()
            .set_executable(path, entry.mode.is_executable())?;

        Ok(())
    }
}
