//! Tree → flat path map
//!
//! Recursively expands a stored tree into a map from full repository-relative
//! paths to `(mode, id)` entries. Subtrees contribute their children under a
//! `<dir>/` prefix and do not appear themselves.

use crate::areas::database::Database;
use crate::artifacts::core::Fatal;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;

/// Flattens stored trees into full-path entry maps
pub struct TreeReader<'d> {
    database: &'d Database,
}

impl<'d> TreeReader<'d> {
    pub fn new(database: &'d Database) -> Self {
        TreeReader { database }
    }

    /// Flatten the tree with the given id
    pub fn flatten(&self, tree_oid: &ObjectId) -> anyhow::Result<BTreeMap<String, DatabaseEntry>> {
        let mut contents = BTreeMap::new();
        self.walk(tree_oid, "", &mut contents)?;
        Ok(contents)
    }

    /// Flatten the tree of the given commit
    pub fn flatten_commit(
        &self,
        commit_oid: &ObjectId,
    ) -> anyhow::Result<BTreeMap<String, DatabaseEntry>> {
        let commit = self
            .database
            .parse_object_as_commit(commit_oid)?
            .ok_or_else(|| {
                Fatal::WrongObjectKind(format!("object {} is not a commit", commit_oid.short()))
            })?;

        self.flatten(commit.tree_oid())
    }

    fn walk(
        &self,
        tree_oid: &ObjectId,
        prefix: &str,
        contents: &mut BTreeMap<String, DatabaseEntry>,
    ) -> anyhow::Result<()> {
        let tree = self
            .database
            .parse_object_as_tree(tree_oid)?
            .ok_or_else(|| {
                Fatal::WrongObjectKind(format!("object {} is not a tree", tree_oid.short()))
            })?;

        for (name, entry) in tree.into_entries() {
            let full_path = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };

            if entry.is_tree() {
                self.walk(&entry.oid, &full_path, contents)?;
            } else {
                contents.insert(full_path, entry);
            }
        }

        Ok(())
    }
}
