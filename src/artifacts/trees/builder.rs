//! Index → tree
//!
//! Builds one tree object per directory level, leaves first. Entries whose
//! path has no `/` are files of the current level; the rest are grouped by
//! first path segment, each group recursing with that segment stripped. The
//! level then serializes files plus one `40000` entry per sub-tree and is
//! written to the database. An empty index yields the empty tree.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::artifacts::core::Fatal;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::collections::BTreeMap;

/// Builds and stores the tree hierarchy for a set of index entries
pub struct TreeBuilder<'d> {
    database: &'d Database,
}

impl<'d> TreeBuilder<'d> {
    pub fn new(database: &'d Database) -> Self {
        TreeBuilder { database }
    }

    /// Build the root tree from an index's stage-0 entries
    ///
    /// Refuses when any path still carries conflict stages.
    pub fn build_from_index(&self, index: &Index) -> anyhow::Result<ObjectId> {
        if index.has_conflicts() {
            return Err(Fatal::UnmergedIndex(
                "Cannot write a tree with unmerged paths.".to_string(),
            )
            .into());
        }

        self.build(index.stage0_entries())
    }

    /// Build the root tree from resolved entries with repository-relative paths
    pub fn build<'e>(
        &self,
        entries: impl Iterator<Item = &'e IndexEntry>,
    ) -> anyhow::Result<ObjectId> {
        let level = entries
            .map(|entry| (entry.path.clone(), entry.mode, entry.oid.clone()))
            .collect();

        self.build_level(level)
    }

    fn build_level(&self, entries: Vec<(String, EntryMode, ObjectId)>) -> anyhow::Result<ObjectId> {
        let mut files: BTreeMap<String, DatabaseEntry> = BTreeMap::new();
        let mut directories: BTreeMap<String, Vec<(String, EntryMode, ObjectId)>> = BTreeMap::new();

        for (path, mode, oid) in entries {
            match path.split_once('/') {
                Some((directory, rest)) => {
                    directories
                        .entry(directory.to_string())
                        .or_default()
                        .push((rest.to_string(), mode, oid));
                }
                None => match mode {
                    EntryMode::Regular | EntryMode::Executable | EntryMode::Symlink => {
                        files.insert(path, DatabaseEntry::new(oid, mode));
                    }
                    EntryMode::Directory => {
                        eprintln!("warning: skipping entry with unexpected mode: {}", path);
                    }
                },
            }
        }

        let mut level = files;
        for (directory, children) in directories {
            let subtree_oid = self.build_level(children)?;
            level.insert(directory, DatabaseEntry::new(subtree_oid, EntryMode::Directory));
        }

        self.database.store(&Tree::new(level))
    }
}
