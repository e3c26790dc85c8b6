//! Commit object: a snapshot plus history metadata
//!
//! Payload layout:
//!
//! ```text
//! tree <tree-id>
//! parent <parent-id>        (zero or more; first parent = "ours")
//! author <name> <email> <epoch> <±HHMM>
//! committer <name> <email> <epoch> <±HHMM>
//!
//! <message>
//! ```
//!
//! Header keys appear exactly once except `parent`. A single trailing newline
//! on the message is normalized away on parse.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Write};

const DEFAULT_AUTHOR_NAME: &str = "Default User";
const DEFAULT_AUTHOR_EMAIL: &str = "user@example.com";

/// Author or committer identity with timestamp
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// `Name <email>` without the timestamp
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Full identity line: `Name <email> <epoch-seconds> <±HHMM>`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Identity from `GIT_AUTHOR_NAME` / `GIT_AUTHOR_EMAIL`, with fixed
    /// fallbacks when the environment does not provide them
    pub fn load_from_env() -> Self {
        let name =
            std::env::var("GIT_AUTHOR_NAME").unwrap_or_else(|_| DEFAULT_AUTHOR_NAME.to_string());
        let email =
            std::env::var("GIT_AUTHOR_EMAIL").unwrap_or_else(|_| DEFAULT_AUTHOR_EMAIL.to_string());

        Author::new(name, email)
    }

    /// Timestamp in `log` form, e.g. `Mon Jan 1 12:34:56 2024 +0000`
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // "Name <email> epoch zone", split from the right to tolerate spaces
        // in the name
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            anyhow::bail!("invalid identity line: {}", value);
        }

        let zone = parts[0];
        let epoch = parts[1]
            .parse::<i64>()
            .with_context(|| format!("invalid identity timestamp: {}", parts[1]))?;
        let name_email = parts[2];

        let email_start = name_email
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("invalid identity line: missing '<'"))?;
        let email_end = name_email
            .find('>')
            .ok_or_else(|| anyhow::anyhow!("invalid identity line: missing '>'"))?;

        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let timestamp =
            chrono::DateTime::parse_from_str(&format!("{} {}", epoch, zone), "%s %z")
                .map_err(|_| anyhow::anyhow!("invalid identity timezone: {}", zone))?;

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// Parent-graph view of a commit, enough for ancestry traversal
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
}

/// Snapshot of the repository at a point in history
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent ids; empty for the initial commit, two or more for merges
    parents: Vec<ObjectId>,
    /// Id of the tree holding the snapshot
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Build a commit; author and committer share the same identity here
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parents,
            tree_oid,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.clone());

        let content = lines.join("\n");

        let mut commit_bytes = Vec::with_capacity(content.len() + 16);
        let header = format!("{} {}\0", self.object_type().as_str(), content.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(content.as_bytes())?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let tree_line = lines.next().context("commit payload: missing tree line")?;
        let tree_oid = ObjectId::try_parse(
            tree_line
                .strip_prefix("tree ")
                .context("commit payload: invalid tree line")?,
        )?;

        let mut parents = Vec::new();
        let mut next_line = lines.next().context("commit payload: missing author line")?;
        while let Some(parent) = next_line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent)?);
            next_line = lines.next().context("commit payload: missing author line")?;
        }

        let author = Author::try_from(
            next_line
                .strip_prefix("author ")
                .context("commit payload: invalid author line")?,
        )?;

        let committer_line = lines
            .next()
            .context("commit payload: missing committer line")?;
        let committer = Author::try_from(
            committer_line
                .strip_prefix("committer ")
                .context("commit payload: invalid committer line")?,
        )?;

        // blank separator before the message
        lines.next();
        let message = lines.collect::<Vec<&str>>().join("\n");

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            message,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.clone());

        lines.join("\n")
    }
}
