//! Index entry types
//!
//! The index is a line-oriented table mapping `(path, stage)` to an entry.
//! Stage 0 is a normal resolved entry; stages 1/2/3 record the base, ours and
//! theirs sides of an unresolved merge for the path.

pub mod index_entry;
