//! Tree object: one directory level
//!
//! A tree maps entry names to `(mode, child id)` pairs. Subdirectories appear
//! as entries of mode `40000` pointing at their own tree objects.
//!
//! ## Payload format
//!
//! Each entry is `<mode-octal> <name>\0<20-byte-binary-sha>`, and entries are
//! written in ascending byte order of their names. Parsing must consume the
//! payload exactly; trailing bytes are a corruption error.
//!
//! Names are compared as plain bytes, with no trailing-slash adjustment for
//! subtrees; the `BTreeMap<String, _>` key order enforces this.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Directory-level inventory of names, modes and child object ids
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: BTreeMap<String, DatabaseEntry>,
}

impl Tree {
    pub fn new(entries: BTreeMap<String, DatabaseEntry>) -> Self {
        Tree { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &DatabaseEntry)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, DatabaseEntry)> {
        self.entries.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        for (name, entry) in &self.entries {
            content_bytes.write_all(entry.mode.as_octal_str().as_bytes())?;
            content_bytes.push(b' ');
            content_bytes.write_all(name.as_bytes())?;
            content_bytes.push(0);
            entry.oid.write_binary_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::with_capacity(content_bytes.len() + 16);
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();

        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let read = reader.read_until(b' ', &mut mode_bytes)?;
            if read == 0 {
                break; // clean end of payload
            }
            if mode_bytes.pop() != Some(b' ') {
                anyhow::bail!("malformed tree entry: unexpected end of mode");
            }
            let mode = EntryMode::from_octal_str(std::str::from_utf8(&mode_bytes)?)?;

            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                anyhow::bail!("malformed tree entry: unexpected end of name");
            }
            let name = std::str::from_utf8(&name_bytes)?.to_owned();
            if name.is_empty() || name.contains('/') {
                anyhow::bail!("malformed tree entry name: {:?}", name);
            }

            let oid = ObjectId::read_binary_from(&mut reader)
                .context("malformed tree entry: truncated object id")?;

            entries.insert(name, DatabaseEntry::new(oid, mode));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|(name, entry)| {
                format!(
                    "{} {} {}\t{}",
                    entry.mode.as_octal_str(),
                    entry.mode.object_type().as_str(),
                    entry.oid,
                    name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
