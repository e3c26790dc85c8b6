//! Command implementations
//!
//! Organized in two layers, mirroring the usual split:
//!
//! - `plumbing`: low-level object and index manipulation (hash-object,
//!   cat-object, write-tree, read-tree, rev-parse, ls-tree)
//! - `porcelain`: user-facing workflows (init, add, rm, commit, status, log,
//!   branch, tag, checkout, merge)
//!
//! Each file adds an `impl Repository` block for one command.

pub mod plumbing;
pub mod porcelain;
