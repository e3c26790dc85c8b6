//! Tree and index entry modes
//!
//! The mode alphabet is fixed: `40000` subtree, `100644` regular file,
//! `100755` executable file, `120000` symlink. Modes travel as octal ASCII in
//! tree payloads and index lines.

use crate::artifacts::objects::object_type::ObjectType;

/// POSIX mode of a tree or index entry, restricted to the recognized alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Directory,
    Regular,
    Executable,
    Symlink,
}

impl EntryMode {
    pub fn as_octal_str(&self) -> &'static str {
        match self {
            EntryMode::Directory => "40000",
            EntryMode::Regular => "100644",
            EntryMode::Executable => "100755",
            EntryMode::Symlink => "120000",
        }
    }

    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        match mode {
            "40000" | "040000" => Ok(EntryMode::Directory),
            "100644" => Ok(EntryMode::Regular),
            "100755" => Ok(EntryMode::Executable),
            "120000" => Ok(EntryMode::Symlink),
            other => Err(anyhow::anyhow!("unrecognized entry mode: {}", other)),
        }
    }

    /// Object kind an entry of this mode points at
    pub fn object_type(&self) -> ObjectType {
        match self {
            EntryMode::Directory => ObjectType::Tree,
            _ => ObjectType::Blob,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, EntryMode::Executable)
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_octal_str())
    }
}
