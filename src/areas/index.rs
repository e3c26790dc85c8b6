//! Staging area
//!
//! The index maps `(path, stage)` to an entry. Stage 0 entries describe the
//! next commit; stages 1/2/3 hold the base, ours and theirs sides of paths
//! left unresolved by a merge. A path is conflicted iff it carries any entry
//! at a stage above 0, and staging a resolved entry clears the other stages.
//!
//! ## On-disk form
//!
//! One line per entry, `<mode> <sha> <stage>\t<path>\n`, sorted by
//! `(path, stage)`. The file is replaced atomically: the new content goes to a
//! temporary sibling which is renamed over the target while `index.lock` is
//! held.

use crate::artifacts::core::Lockfile;
use crate::artifacts::index::index_entry::{IndexEntry, Stage};
use anyhow::Context;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Multi-stage staging table
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (`.nit/index`)
    path: Box<Path>,
    /// Entries keyed by path, then stage
    entries: BTreeMap<String, BTreeMap<Stage, IndexEntry>>,
    /// Whether the in-memory table differs from the on-disk file
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the on-disk index; a missing file is an empty index
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("unable to read index file {}", self.path.display()))?;

        for (line_number, line) in content.lines().enumerate() {
            match IndexEntry::parse_line(line) {
                Ok(entry) => {
                    self.entries
                        .entry(entry.path.clone())
                        .or_default()
                        .insert(entry.stage, entry);
                }
                Err(err) => {
                    eprintln!("warning: index line {}: {}", line_number + 1, err);
                }
            }
        }

        Ok(())
    }

    /// Write the table back to disk, atomically, under `index.lock`
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let _lock = Lockfile::acquire(&self.path)?;

        let mut content = String::new();
        for entry in self.entries() {
            content.push_str(&entry.to_line());
            content.push('\n');
        }

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| {
                    format!("unable to open temporary index file {}", temp_path.display())
                })?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("unable to replace index file {}", self.path.display()))?;

        self.changed = false;
        Ok(())
    }

    /// Stage an entry
    ///
    /// Staging a resolved (stage 0) entry clears any residual conflict stages
    /// for the path, keeping the index in normal form.
    pub fn add(&mut self, entry: IndexEntry) {
        let stages = self.entries.entry(entry.path.clone()).or_default();
        if entry.stage == Stage::Resolved {
            stages.clear();
        }
        stages.insert(entry.stage, entry);
        self.changed = true;
    }

    /// Insert an entry at its stage without touching the other stages
    pub fn set(&mut self, entry: IndexEntry) {
        self.entries
            .entry(entry.path.clone())
            .or_default()
            .insert(entry.stage, entry);
        self.changed = true;
    }

    /// Remove one stage of a path, or all of them
    pub fn remove(&mut self, path: &str, stage: Option<Stage>) {
        match stage {
            None => {
                if self.entries.remove(path).is_some() {
                    self.changed = true;
                }
            }
            Some(stage) => {
                if let Some(stages) = self.entries.get_mut(path) {
                    if stages.remove(&stage).is_some() {
                        self.changed = true;
                    }
                    if stages.is_empty() {
                        self.entries.remove(path);
                    }
                }
            }
        }
    }

    /// Drop every entry (used when the index is rebuilt from a tree or merge)
    pub fn reset(&mut self) {
        self.entries.clear();
        self.changed = true;
    }

    /// All entries in `(path, stage)` order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values().flat_map(|stages| stages.values())
    }

    /// Stage-0 entries in path order
    pub fn stage0_entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries
            .values()
            .filter_map(|stages| stages.get(&Stage::Resolved))
    }

    pub fn entry(&self, path: &str, stage: Stage) -> Option<&IndexEntry> {
        self.entries.get(path).and_then(|stages| stages.get(&stage))
    }

    pub fn stage0(&self, path: &str) -> Option<&IndexEntry> {
        self.entry(path, Stage::Resolved)
    }

    pub fn tracks(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Whether the path carries any entry at a stage above 0
    pub fn is_conflicted(&self, path: &str) -> bool {
        self.entries
            .get(path)
            .map(|stages| stages.keys().any(Stage::is_conflict))
            .unwrap_or(false)
    }

    /// Whether any path is conflicted
    pub fn has_conflicts(&self) -> bool {
        self.entries
            .values()
            .any(|stages| stages.keys().any(Stage::is_conflict))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::entry_mode::EntryMode;
    use crate::artifacts::objects::object_id::ObjectId;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn oid() -> ObjectId {
        ObjectId::try_parse("ce013625030ba8dba906f756967f9e9ca394464a").unwrap()
    }

    fn entry(path: &str, oid: &ObjectId, stage: Stage) -> IndexEntry {
        IndexEntry::new(path.to_string(), oid.clone(), EntryMode::Regular, stage)
    }

    #[rstest]
    fn staging_a_resolved_entry_clears_conflict_stages(oid: ObjectId) {
        let dir = TempDir::new().unwrap();
        let mut index = Index::new(dir.path().join("index").into_boxed_path());

        index.set(entry("a.txt", &oid, Stage::Base));
        index.set(entry("a.txt", &oid, Stage::Ours));
        index.set(entry("a.txt", &oid, Stage::Theirs));
        assert!(index.is_conflicted("a.txt"));

        index.add(entry("a.txt", &oid, Stage::Resolved));

        assert!(!index.is_conflicted("a.txt"));
        assert!(!index.has_conflicts());
        assert_eq!(index.entries().count(), 1);
    }

    #[rstest]
    fn write_then_rehydrate_round_trips_sorted_lines(oid: ObjectId) {
        let dir = TempDir::new().unwrap();
        let index_path = dir.path().join("index");
        let mut index = Index::new(index_path.clone().into_boxed_path());

        index.add(entry("b/file", &oid, Stage::Resolved));
        index.add(entry("a", &oid, Stage::Resolved));
        index.set(entry("conflicted", &oid, Stage::Ours));
        index.set(entry("conflicted", &oid, Stage::Base));
        index.write_updates().unwrap();

        let on_disk = std::fs::read_to_string(&index_path).unwrap();
        let paths: Vec<&str> = on_disk
            .lines()
            .map(|l| l.split_once('\t').unwrap().1)
            .collect();
        assert_eq!(paths, vec!["a", "b/file", "conflicted", "conflicted"]);
        assert!(!index_path.with_extension("lock").exists());

        let mut reloaded = Index::new(index_path.into_boxed_path());
        reloaded.rehydrate().unwrap();
        assert_eq!(
            reloaded.entries().cloned().collect::<Vec<_>>(),
            index.entries().cloned().collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn missing_file_rehydrates_to_an_empty_index(oid: ObjectId) {
        let dir = TempDir::new().unwrap();
        let mut index = Index::new(dir.path().join("index").into_boxed_path());

        index.add(entry("a", &oid, Stage::Resolved));
        index.rehydrate().unwrap();

        assert!(index.is_empty());
    }

    #[rstest]
    fn remove_all_stages_drops_the_path(oid: ObjectId) {
        let dir = TempDir::new().unwrap();
        let mut index = Index::new(dir.path().join("index").into_boxed_path());

        index.set(entry("a", &oid, Stage::Base));
        index.set(entry("a", &oid, Stage::Theirs));
        index.remove("a", None);

        assert!(!index.tracks("a"));

        index.set(entry("b", &oid, Stage::Base));
        index.remove("b", Some(Stage::Base));
        assert!(!index.tracks("b"));
    }
}
