//! Object types stored in the database
//!
//! Every piece of repository history is one of four immutable, content-addressed
//! object kinds:
//!
//! - `blob`: opaque file content
//! - `tree`: a directory-level inventory of names, modes and child ids
//! - `commit`: a tree snapshot plus parents, identity and message
//! - `tag`: an annotated, named pointer to another object
//!
//! Objects are serialized as `<kind> <size>\0<payload>` and zlib-compressed at
//! rest; the 40-hex SHA-1 of the uncompressed serialization is the object id.

pub mod blob;
pub mod commit;
pub mod entry_mode;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tag;
pub mod tree;

/// Length of a full object id in hex characters
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest object-id prefix accepted for lookup
pub const MIN_PREFIX_LENGTH: usize = 4;

/// Id of the tree with no entries (`sha1("tree 0\0")`)
pub const EMPTY_TREE_ID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
