//! Plumbing commands: direct object and index manipulation

pub mod cat_object;
pub mod hash_object;
pub mod ls_tree;
pub mod read_tree;
pub mod rev_parse;
pub mod write_tree;
