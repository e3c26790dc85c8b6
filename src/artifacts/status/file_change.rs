//! Per-path status classification
//!
//! Every path is classified along two axes: index vs. HEAD (what the next
//! commit would change) and working tree vs. index (what is not staged yet).
//! A path with any conflict stage is `Conflicted` and its workdir axis is not
//! classified further.

use derive_new::new;

/// Index vs. HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    Unmodified,
    /// Present in both with differing content
    Modified,
    /// Present only in the index
    Added,
    /// Present only in HEAD
    Deleted,
    /// The index carries stages above 0 for the path
    Conflicted,
}

/// Working tree vs. index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkdirStatus {
    Unmodified,
    /// Tracked, with workdir content differing from the staged blob
    Modified,
    /// Tracked but missing from the working tree
    Deleted,
    /// Present in the working tree but not in the index
    Untracked,
}

/// Two-axis status of a single path
#[derive(Debug, Clone, new)]
pub struct StatusEntry {
    pub path: String,
    pub index_status: IndexStatus,
    pub workdir_status: WorkdirStatus,
}

impl StatusEntry {
    pub fn is_unmodified(&self) -> bool {
        self.index_status == IndexStatus::Unmodified
            && self.workdir_status == WorkdirStatus::Unmodified
    }
}
