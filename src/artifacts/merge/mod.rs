//! Merge machinery
//!
//! - `base_finder`: most recent common ancestor discovery over the parent DAG
//! - `three_way`: per-path classification of base/ours/theirs trees

pub mod base_finder;
pub mod three_way;
