//! Status computation
//!
//! Three maps keyed by path are compared: the HEAD commit's flattened tree
//! (empty when HEAD is unborn), the index's stage-0 view, and the set of
//! working-tree files. Every path in their union gets exactly one entry.
//!
//! Working-tree content is hashed lazily, only for paths that are actually
//! indexed, so an untracked build directory never gets read wholesale.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::status::file_change::{IndexStatus, StatusEntry, WorkdirStatus};
use std::collections::{BTreeMap, BTreeSet};

/// Full status of the repository at one point in time
#[derive(Debug)]
pub struct StatusReport {
    entries: BTreeMap<String, StatusEntry>,
    merge_in_progress: bool,
}

impl StatusReport {
    /// Compute the three-way status for every known path
    pub fn gather(repository: &Repository, index: &Index) -> anyhow::Result<Self> {
        let head_tree = repository.head_flat_tree()?;
        let workdir: BTreeSet<String> =
            repository.workspace().list_files(None)?.into_iter().collect();

        let mut all_paths: BTreeSet<String> = BTreeSet::new();
        all_paths.extend(head_tree.keys().cloned());
        all_paths.extend(index.entries().map(|entry| entry.path.clone()));
        all_paths.extend(workdir.iter().cloned());

        let mut entries = BTreeMap::new();
        for path in all_paths {
            if index.is_conflicted(&path) {
                entries.insert(
                    path.clone(),
                    StatusEntry::new(path, IndexStatus::Conflicted, WorkdirStatus::Unmodified),
                );
                continue;
            }

            let head_entry = head_tree.get(&path);
            let index_entry = index.stage0(&path);
            let in_workdir = workdir.contains(&path);

            let index_status = match (index_entry, head_entry) {
                (Some(staged), Some(head)) if staged.oid == head.oid => IndexStatus::Unmodified,
                (Some(_), Some(_)) => IndexStatus::Modified,
                (Some(_), None) => IndexStatus::Added,
                (None, Some(_)) => IndexStatus::Deleted,
                (None, None) => IndexStatus::Unmodified,
            };

            let workdir_status = match (index_entry, in_workdir) {
                (Some(staged), true) => {
                    // hash only here, where the path is known to be tracked
                    match repository.workspace().hashable_bytes(&path) {
                        Ok(bytes) => {
                            if Blob::new(bytes).object_id()? == staged.oid {
                                WorkdirStatus::Unmodified
                            } else {
                                WorkdirStatus::Modified
                            }
                        }
                        Err(err) => {
                            eprintln!("warning: unable to hash {}: {}", path, err);
                            WorkdirStatus::Modified
                        }
                    }
                }
                (Some(_), false) => WorkdirStatus::Deleted,
                (None, true) => WorkdirStatus::Untracked,
                (None, false) => WorkdirStatus::Unmodified,
            };

            entries.insert(
                path.clone(),
                StatusEntry::new(path, index_status, workdir_status),
            );
        }

        Ok(StatusReport {
            entries,
            merge_in_progress: repository.refs().merge_in_progress(),
        })
    }

    /// Entries in path order
    pub fn entries(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.values()
    }

    pub fn merge_in_progress(&self) -> bool {
        self.merge_in_progress
    }

    pub fn has_conflicts(&self) -> bool {
        self.entries
            .values()
            .any(|entry| entry.index_status == IndexStatus::Conflicted)
    }

    pub fn has_staged_changes(&self) -> bool {
        self.entries.values().any(|entry| {
            matches!(
                entry.index_status,
                IndexStatus::Modified | IndexStatus::Added | IndexStatus::Deleted
            )
        })
    }

    pub fn has_unstaged_changes(&self) -> bool {
        self.entries.values().any(|entry| {
            matches!(
                entry.workdir_status,
                WorkdirStatus::Modified | WorkdirStatus::Deleted
            )
        })
    }

    /// Paths whose tracked state would be lost by rewriting the working tree
    pub fn dirty_paths(&self) -> Vec<&str> {
        self.entries
            .values()
            .filter(|entry| {
                entry.index_status == IndexStatus::Conflicted
                    || matches!(
                        entry.index_status,
                        IndexStatus::Modified | IndexStatus::Added | IndexStatus::Deleted
                    )
                    || matches!(
                        entry.workdir_status,
                        WorkdirStatus::Modified | WorkdirStatus::Deleted
                    )
            })
            .map(|entry| entry.path.as_str())
            .collect()
    }

    /// Nothing staged, nothing modified, no conflicts; untracked files allowed
    pub fn is_clean(&self) -> bool {
        !self.has_conflicts() && !self.has_staged_changes() && !self.has_unstaged_changes()
    }
}
