//! Entry of a tree object as seen from the database
//!
//! A `(mode, object id)` pair; the entry name is the key of the map that holds
//! it. Flattened trees map full paths to these entries, and the merge and
//! status machinery compares them by id.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// Reference to a child object from inside a tree
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DatabaseEntry {
    /// Id of the referenced object
    pub oid: ObjectId,
    /// Mode of the entry (file kind or subtree)
    pub mode: EntryMode,
}

impl DatabaseEntry {
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }
}
