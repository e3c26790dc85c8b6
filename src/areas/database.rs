//! Object database
//!
//! Content-addressed storage for the four object kinds. Objects live at
//! `.nit/objects/<first-2-hex>/<remaining-38-hex>`, zlib-compressed. Writes
//! are idempotent by id: identical content maps to the same path, so a lost
//! race rewrites identical bytes.

use crate::artifacts::core::Fatal;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::objects::{MIN_PREFIX_LENGTH, OBJECT_ID_LENGTH};
use anyhow::Context;
use bytes::Bytes;
use rand;
use sha1::{Digest, Sha1};
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Content-addressed object store
#[derive(Debug)]
pub struct Database {
    /// Path to the objects directory (`.nit/objects`)
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store an object, returning its id
    ///
    /// A no-op when an object with the same id already exists.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let oid = object.object_id()?;
        let object_path = self.path.join(oid.to_path());

        if !object_path.exists() {
            self.write_object(&object_path, object.serialize()?)?;
        }

        Ok(oid)
    }

    /// Store raw payload bytes under the given kind, returning the content id
    pub fn store_raw(&self, kind: ObjectType, payload: &[u8], write: bool) -> anyhow::Result<ObjectId> {
        let mut content = Vec::with_capacity(payload.len() + 16);
        content.write_all(format!("{} {}\0", kind, payload.len()).as_bytes())?;
        content.write_all(payload)?;

        let mut hasher = Sha1::new();
        hasher.update(&content);
        let oid = ObjectId::try_parse(format!("{:x}", hasher.finalize()))?;

        if write {
            let object_path = self.path.join(oid.to_path());
            if !object_path.exists() {
                self.write_object(&object_path, Bytes::from(content))?;
            }
        }

        Ok(oid)
    }

    /// Whether an object with this id exists on disk
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.path.join(oid.to_path()).exists()
    }

    /// Load the decompressed serialization of an object, header included
    pub fn load(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        self.read_object(&self.path.join(oid.to_path()))
    }

    /// Parse an object into its kind-specific form
    pub fn parse_object(&self, oid: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (kind, _, reader) = self.open_payload(oid)?;

        match kind {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(reader)?))),
            ObjectType::Tag => Ok(ObjectBox::Tag(Box::new(Tag::deserialize(reader)?))),
        }
    }

    /// Parse an object as a blob, if it is one
    pub fn parse_object_as_blob(&self, oid: &ObjectId) -> anyhow::Result<Option<Blob>> {
        let (kind, _, reader) = self.open_payload(oid)?;

        match kind {
            ObjectType::Blob => Ok(Some(Blob::deserialize(reader)?)),
            _ => Ok(None),
        }
    }

    /// Parse an object as a tree, if it is one
    pub fn parse_object_as_tree(&self, oid: &ObjectId) -> anyhow::Result<Option<Tree>> {
        let (kind, _, reader) = self.open_payload(oid)?;

        match kind {
            ObjectType::Tree => Ok(Some(Tree::deserialize(reader)?)),
            _ => Ok(None),
        }
    }

    /// Parse an object as a commit, if it is one
    pub fn parse_object_as_commit(&self, oid: &ObjectId) -> anyhow::Result<Option<Commit>> {
        let (kind, _, reader) = self.open_payload(oid)?;

        match kind {
            ObjectType::Commit => Ok(Some(Commit::deserialize(reader)?)),
            _ => Ok(None),
        }
    }

    /// Parse an object as an annotated tag, if it is one
    pub fn parse_object_as_tag(&self, oid: &ObjectId) -> anyhow::Result<Option<Tag>> {
        let (kind, _, reader) = self.open_payload(oid)?;

        match kind {
            ObjectType::Tag => Ok(Some(Tag::deserialize(reader)?)),
            _ => Ok(None),
        }
    }

    /// Kind and payload size of an object, without parsing the payload
    pub fn object_kind(&self, oid: &ObjectId) -> anyhow::Result<(ObjectType, usize)> {
        let (kind, size, _) = self.open_payload(oid)?;
        Ok((kind, size))
    }

    /// Parent-graph view of a commit, for ancestry traversal
    pub fn slim_commit(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit> {
        let commit = self
            .parse_object_as_commit(oid)?
            .ok_or_else(|| anyhow::anyhow!("object {} is not a commit", oid.short()))?;

        Ok(SlimCommit {
            oid: oid.clone(),
            parents: commit.parents().to_vec(),
        })
    }

    fn open_payload(&self, oid: &ObjectId) -> anyhow::Result<(ObjectType, usize, impl BufRead)> {
        let content = self.read_object(&self.path.join(oid.to_path()))?;
        let mut reader = Cursor::new(content);

        let (kind, size) = ObjectType::parse_header(&mut reader)
            .map_err(|err| Fatal::CorruptObject(format!("{}: {}", oid, err)))?;

        let remaining = reader.get_ref().len() as u64 - reader.position();
        if remaining != size as u64 {
            return Err(Fatal::CorruptObject(format!(
                "{}: header says {} bytes, payload has {}",
                oid, size, remaining
            ))
            .into());
        }

        Ok((kind, size, reader))
    }

    fn read_object(&self, object_path: &Path) -> anyhow::Result<Bytes> {
        let compressed = std::fs::read(object_path).with_context(|| {
            format!("unable to read object file {}", object_path.display())
        })?;

        Self::decompress(compressed.into())
    }

    fn write_object(&self, object_path: &Path, content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .with_context(|| format!("invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).with_context(|| {
            format!("unable to create object directory {}", object_dir.display())
        })?;

        let compressed = Self::compress(content)?;
        let temp_path = object_dir.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("unable to open object file {}", temp_path.display()))?;
        file.write_all(&compressed)
            .with_context(|| format!("unable to write object file {}", temp_path.display()))?;

        // the temp file rename makes the write atomic
        std::fs::rename(&temp_path, object_path).with_context(|| {
            format!("unable to rename object file to {}", object_path.display())
        })?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("unable to compress object content")?;

        encoder
            .finish()
            .map(Bytes::from)
            .context("unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("unable to decompress object content")?;

        Ok(decompressed.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// All object ids starting with the given hex prefix
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();
        if prefix.len() < 2 {
            return Ok(matches);
        }

        let dir_name = &prefix[..2];
        let file_prefix = &prefix[2..];
        let dir_path = self.path.join(dir_name);

        if dir_path.is_dir() {
            for entry in std::fs::read_dir(&dir_path)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();

                if file_name.starts_with(file_prefix) {
                    if let Ok(oid) = ObjectId::try_parse(format!("{}{}", dir_name, file_name)) {
                        matches.push(oid);
                    }
                }
            }
        }

        matches.sort();
        Ok(matches)
    }

    /// Resolve an abbreviated id to its unique completion
    ///
    /// Prefixes shorter than 4 or longer than 40 characters never resolve;
    /// more than one completion is `ambiguous-object`, none is
    /// `unknown-object`.
    pub fn resolve_prefix(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        if prefix.len() < MIN_PREFIX_LENGTH
            || prefix.len() > OBJECT_ID_LENGTH
            || !prefix.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(Fatal::UnknownObject(prefix.to_string()).into());
        }

        let mut matches = self.find_objects_by_prefix(prefix)?;
        match matches.len() {
            0 => Err(Fatal::UnknownObject(prefix.to_string()).into()),
            1 => Ok(matches.swap_remove(0)),
            _ => Err(Fatal::AmbiguousObject(prefix.to_string()).into()),
        }
    }

    /// Relative path an object with this id would be stored at
    pub fn object_path_for(&self, oid: &ObjectId) -> PathBuf {
        self.path.join(oid.to_path())
    }
}
