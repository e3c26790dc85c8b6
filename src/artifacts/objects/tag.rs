//! Annotated tag object
//!
//! Payload layout:
//!
//! ```text
//! object <target-id>
//! type <target-kind>
//! tag <name>
//! tagger <name> <email> <epoch> <±HHMM>
//!
//! <message>
//! ```
//!
//! A lightweight tag is just a ref and involves no object; this type backs the
//! annotated form, where the ref points at the tag object and the tag object
//! names the final target.

use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Named, messaged pointer to another object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tag {
    target: ObjectId,
    target_type: ObjectType,
    name: String,
    tagger: Author,
    message: String,
}

impl Tag {
    pub fn new(
        target: ObjectId,
        target_type: ObjectType,
        name: String,
        tagger: Author,
        message: String,
    ) -> Self {
        Tag {
            target,
            target_type,
            name,
            tagger,
            message,
        }
    }

    pub fn target(&self) -> &ObjectId {
        &self.target
    }

    pub fn target_type(&self) -> ObjectType {
        self.target_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Packable for Tag {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let lines = [
            format!("object {}", self.target),
            format!("type {}", self.target_type),
            format!("tag {}", self.name),
            format!("tagger {}", self.tagger.display()),
            String::new(),
            self.message.clone(),
        ];
        let content = lines.join("\n");

        let mut tag_bytes = Vec::with_capacity(content.len() + 16);
        let header = format!("{} {}\0", self.object_type().as_str(), content.len());
        tag_bytes.write_all(header.as_bytes())?;
        tag_bytes.write_all(content.as_bytes())?;

        Ok(Bytes::from(tag_bytes))
    }
}

impl Unpackable for Tag {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let target = ObjectId::try_parse(
            lines
                .next()
                .and_then(|line| line.strip_prefix("object "))
                .context("tag payload: invalid object line")?,
        )?;
        let target_type = ObjectType::try_from(
            lines
                .next()
                .and_then(|line| line.strip_prefix("type "))
                .context("tag payload: invalid type line")?,
        )?;
        let name = lines
            .next()
            .and_then(|line| line.strip_prefix("tag "))
            .context("tag payload: invalid tag line")?
            .to_string();
        let tagger = Author::try_from(
            lines
                .next()
                .and_then(|line| line.strip_prefix("tagger "))
                .context("tag payload: invalid tagger line")?,
        )?;

        // blank separator before the message
        lines.next();
        let message = lines.collect::<Vec<&str>>().join("\n");

        Ok(Tag {
            target,
            target_type,
            name,
            tagger,
            message,
        })
    }
}

impl Object for Tag {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tag
    }

    fn display(&self) -> String {
        [
            format!("object {}", self.target),
            format!("type {}", self.target_type),
            format!("tag {}", self.name),
            format!("tagger {}", self.tagger.display()),
            String::new(),
            self.message.clone(),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_then_read_yields_equal_tag() {
        let timestamp = chrono::DateTime::parse_from_rfc3339("2024-06-01T08:30:00+00:00").unwrap();
        let tagger = Author::new_with_timestamp(
            "Ada Lovelace".to_string(),
            "ada@example.com".to_string(),
            timestamp,
        );
        let tag = Tag::new(
            ObjectId::try_parse("d".repeat(40)).unwrap(),
            ObjectType::Commit,
            "v1.0".to_string(),
            tagger,
            "first release".to_string(),
        );

        let serialized = tag.serialize().unwrap();
        let payload = &serialized[serialized.iter().position(|&b| b == 0).unwrap() + 1..];
        let parsed = Tag::deserialize(payload).unwrap();

        assert_eq!(parsed, tag);
        assert_eq!(parsed.target_type(), ObjectType::Commit);
    }
}
