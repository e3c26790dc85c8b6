//! Core object traits
//!
//! - `Packable`: serialization to the on-disk binary form (header included)
//! - `Unpackable`: deserialization from a reader positioned after the header
//! - `Object`: shared operations (id computation, storage path, display)

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;
use std::path::PathBuf;

/// Serialization to `<kind> <size>\0<payload>` bytes
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Deserialization from a payload reader (header already consumed)
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// Operations shared by all object kinds
pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Human-readable payload rendering (`cat-object -p`)
    fn display(&self) -> String;

    /// The object's id: SHA-1 over the full serialization
    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        let mut hasher = Sha1::new();
        hasher.update(&content);

        let digest = hasher.finalize();
        ObjectId::try_parse(format!("{digest:x}"))
    }

    /// Relative path under the objects directory where this object lives
    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// Tagged container for an object of unknown kind
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
    Tag(Box<Tag>),
}

impl ObjectBox {
    pub fn kind(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Tree(_) => ObjectType::Tree,
            ObjectBox::Commit(_) => ObjectType::Commit,
            ObjectBox::Tag(_) => ObjectType::Tag,
        }
    }

    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
            ObjectBox::Tag(tag) => tag.display(),
        }
    }
}
