//! Branch and tag name validation
//!
//! Branch and tag names live directly under `refs/heads/` and `refs/tags/`.
//! At creation time a name must be a single path segment: non-empty, no `/`,
//! not `.` or `..`, no `..` sequence, no `.lock` suffix, and none of the
//! characters that would break ref-file paths or revision syntax.

use std::fmt;

const FORBIDDEN_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\', '/'];

/// A validated branch or tag name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefName(String);

impl RefName {
    pub fn try_parse(name: impl Into<String>) -> anyhow::Result<Self> {
        let name = name.into();

        if name.is_empty() {
            anyhow::bail!("empty ref name");
        }
        if name == "." || name == ".." || name.contains("..") {
            anyhow::bail!("'{}' is not a valid ref name", name);
        }
        if name.starts_with('.') || name.ends_with(".lock") {
            anyhow::bail!("'{}' is not a valid ref name", name);
        }
        if name.contains("@{") {
            anyhow::bail!("'{}' is not a valid ref name", name);
        }
        if name.chars().any(|c| c.is_control() || FORBIDDEN_CHARS.contains(&c)) {
            anyhow::bail!("'{}' is not a valid ref name", name);
        }

        Ok(RefName(name))
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
