//! Three-way classification
//!
//! Compares the flattened base, ours and theirs trees path by path. Each path
//! in the union is classified from its presence triple and id comparisons;
//! the caller materialises the outcome (working tree writes, stage entries,
//! conflict envelopes).
//!
//! The classification is pure: no side effects, so the whole decision table
//! is unit-tested directly.

use crate::artifacts::database::database_entry::DatabaseEntry;
use std::collections::BTreeMap;
use std::fmt;

/// Flavor of a merge conflict, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Added on both sides with differing content
    AddAdd,
    /// Modified in ours, deleted in theirs
    ModifyDelete,
    /// Deleted in ours, modified in theirs
    DeleteModify,
    /// Modified on both sides with differing content
    Content,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConflictKind::AddAdd => "add/add",
            ConflictKind::ModifyDelete => "modify/delete",
            ConflictKind::DeleteModify => "delete/modify",
            ConflictKind::Content => "content",
        };
        write!(f, "{}", label)
    }
}

/// What the merge decided for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeDisposition {
    /// Same on both sides and in the base; keep as is
    Unmodified,
    /// One side changed it (or both changed it identically); take `merged`
    Modified,
    /// New on one side (or identically on both); take `merged`
    Added,
    /// Gone from the result
    Deleted,
    /// Divergent; materialise stages and an envelope
    Conflict(ConflictKind),
}

/// Classification of one path plus the entries that produced it
#[derive(Debug, Clone)]
pub struct PathMergeOutcome {
    pub disposition: MergeDisposition,
    pub base: Option<DatabaseEntry>,
    pub ours: Option<DatabaseEntry>,
    pub theirs: Option<DatabaseEntry>,
    /// The winning entry for `Unmodified` / `Modified` / `Added`
    pub merged: Option<DatabaseEntry>,
}

/// Classify every path in the union of the three flattened trees
pub fn classify_trees(
    base: &BTreeMap<String, DatabaseEntry>,
    ours: &BTreeMap<String, DatabaseEntry>,
    theirs: &BTreeMap<String, DatabaseEntry>,
) -> BTreeMap<String, PathMergeOutcome> {
    let mut all_paths: Vec<&String> = base.keys().chain(ours.keys()).chain(theirs.keys()).collect();
    all_paths.sort();
    all_paths.dedup();

    let mut outcomes = BTreeMap::new();
    for path in all_paths {
        let outcome = classify_path(base.get(path), ours.get(path), theirs.get(path));
        outcomes.insert(path.clone(), outcome);
    }

    outcomes
}

fn classify_path(
    base: Option<&DatabaseEntry>,
    ours: Option<&DatabaseEntry>,
    theirs: Option<&DatabaseEntry>,
) -> PathMergeOutcome {
    let disposition = match (base, ours, theirs) {
        // identical on both sides
        (_, Some(our), Some(their)) if our.oid == their.oid => match base {
            Some(b) if b.oid == our.oid => MergeDisposition::Unmodified,
            Some(_) => MergeDisposition::Modified,
            None => MergeDisposition::Added,
        },

        // not in the base: additions
        (None, Some(_), None) => MergeDisposition::Added,
        (None, None, Some(_)) => MergeDisposition::Added,
        (None, Some(_), Some(_)) => MergeDisposition::Conflict(ConflictKind::AddAdd),

        // in the base, gone from one side
        (Some(b), Some(our), None) => {
            if b.oid == our.oid {
                MergeDisposition::Deleted
            } else {
                MergeDisposition::Conflict(ConflictKind::ModifyDelete)
            }
        }
        (Some(b), None, Some(their)) => {
            if b.oid == their.oid {
                MergeDisposition::Deleted
            } else {
                MergeDisposition::Conflict(ConflictKind::DeleteModify)
            }
        }

        // in the base, gone from both sides
        (Some(_), None, None) => MergeDisposition::Deleted,

        // present everywhere, sides differ from each other
        (Some(b), Some(our), Some(their)) => {
            let ours_changed = our.oid != b.oid;
            let theirs_changed = their.oid != b.oid;
            match (ours_changed, theirs_changed) {
                (true, false) => MergeDisposition::Modified,
                (false, true) => MergeDisposition::Modified,
                (true, true) => MergeDisposition::Conflict(ConflictKind::Content),
                (false, false) => MergeDisposition::Unmodified,
            }
        }

        (None, None, None) => unreachable!("path came from the union of the three trees"),
    };

    let merged = match disposition {
        MergeDisposition::Unmodified => ours.cloned(),
        MergeDisposition::Added => ours.or(theirs).cloned(),
        MergeDisposition::Modified => {
            // the side that differs from the base wins; identical double
            // edits fall back to ours
            match (base, ours, theirs) {
                (Some(b), Some(our), _) if our.oid != b.oid => Some(our.clone()),
                (Some(b), _, Some(their)) if their.oid != b.oid => Some(their.clone()),
                _ => ours.cloned(),
            }
        }
        MergeDisposition::Deleted | MergeDisposition::Conflict(_) => None,
    };

    PathMergeOutcome {
        disposition,
        base: base.cloned(),
        ours: ours.cloned(),
        theirs: theirs.cloned(),
        merged,
    }
}
