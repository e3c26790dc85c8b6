//! Blob object: opaque file content
//!
//! Blobs carry raw bytes only; name and mode live in the trees that point at
//! them. Symlinks are stored as blobs holding the link target bytes.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// File content, addressed by the SHA-1 of its serialized form
#[derive(Debug, Clone)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Blob {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut blob_bytes = Vec::with_capacity(self.content.len() + 16);
        let header = format!("{} {}\0", self.object_type().as_str(), self.content.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(&self.content)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been consumed
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        Ok(Self::new(content))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_with_header_and_hashes_like_the_reference_format() {
        let blob = Blob::new(&b"hello\n"[..]);

        assert_eq!(blob.serialize().unwrap().as_ref(), &b"blob 6\0hello\n"[..]);
        // well-known id of the blob "hello\n"
        assert_eq!(
            blob.object_id().unwrap().as_ref(),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[test]
    fn write_then_read_yields_equal_content() {
        let blob = Blob::new(&b"some bytes \x00 with a nul"[..]);
        let serialized = blob.serialize().unwrap();

        let payload = &serialized[serialized.iter().position(|&b| b == 0).unwrap() + 1..];
        let parsed = Blob::deserialize(payload).unwrap();

        assert_eq!(parsed.content(), blob.content());
    }
}
