//! One line of the staging table
//!
//! On disk an entry is `<mode-octal> <40-hex-sha> <stage-digit>\t<path>\n`.
//! Lines are sorted by `(path, stage)`; paths use `/` separators and are
//! relative to the repository root.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// Slot of an index entry within its path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Normal, non-conflicted entry
    Resolved,
    /// Common ancestor side of a conflict
    Base,
    /// HEAD side of a conflict
    Ours,
    /// Merged-branch side of a conflict
    Theirs,
}

impl Stage {
    pub fn as_u8(&self) -> u8 {
        match self {
            Stage::Resolved => 0,
            Stage::Base => 1,
            Stage::Ours => 2,
            Stage::Theirs => 3,
        }
    }

    pub fn is_conflict(&self) -> bool {
        !matches!(self, Stage::Resolved)
    }
}

impl TryFrom<u8> for Stage {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> anyhow::Result<Self> {
        match value {
            0 => Ok(Stage::Resolved),
            1 => Ok(Stage::Base),
            2 => Ok(Stage::Ours),
            3 => Ok(Stage::Theirs),
            other => Err(anyhow::anyhow!("invalid index stage: {}", other)),
        }
    }
}

/// A staged file at a particular stage
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    /// Id of the staged blob
    pub oid: ObjectId,
    /// Entry mode
    pub mode: EntryMode,
    /// Conflict stage
    pub stage: Stage,
}

impl IndexEntry {
    /// Render the on-disk line, without the trailing newline
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {}\t{}",
            self.mode.as_octal_str(),
            self.oid,
            self.stage.as_u8(),
            self.path
        )
    }

    /// Parse one on-disk line
    pub fn parse_line(line: &str) -> anyhow::Result<Self> {
        let (header, path) = line
            .split_once('\t')
            .ok_or_else(|| anyhow::anyhow!("malformed index line (no tab): {}", line))?;

        let fields: Vec<&str> = header.split(' ').collect();
        if fields.len() != 3 {
            anyhow::bail!("malformed index line header: {}", header);
        }

        let mode = EntryMode::from_octal_str(fields[0])?;
        let oid = ObjectId::try_parse(fields[1])?;
        let stage = Stage::try_from(
            fields[2]
                .parse::<u8>()
                .map_err(|_| anyhow::anyhow!("invalid index stage: {}", fields[2]))?,
        )?;

        if path.is_empty() {
            anyhow::bail!("malformed index line: empty path");
        }

        Ok(IndexEntry::new(path.to_string(), oid, mode, stage))
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.path, self.stage).cmp(&(&other.path, other.stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn oid() -> ObjectId {
        ObjectId::try_parse("ce013625030ba8dba906f756967f9e9ca394464a").unwrap()
    }

    #[rstest]
    fn line_round_trip(oid: ObjectId) {
        let entry = IndexEntry::new("a/b.txt".to_string(), oid, EntryMode::Regular, Stage::Ours);
        let line = entry.to_line();

        assert_eq!(
            line,
            "100644 ce013625030ba8dba906f756967f9e9ca394464a 2\ta/b.txt"
        );
        assert_eq!(IndexEntry::parse_line(&line).unwrap(), entry);
    }

    #[rstest]
    fn orders_by_path_then_stage(oid: ObjectId) {
        let mut entries = vec![
            IndexEntry::new("b".to_string(), oid.clone(), EntryMode::Regular, Stage::Resolved),
            IndexEntry::new("a".to_string(), oid.clone(), EntryMode::Regular, Stage::Theirs),
            IndexEntry::new("a".to_string(), oid.clone(), EntryMode::Regular, Stage::Base),
        ];
        entries.sort();

        let keys: Vec<(&str, u8)> = entries
            .iter()
            .map(|e| (e.path.as_str(), e.stage.as_u8()))
            .collect();
        assert_eq!(keys, vec![("a", 1), ("a", 3), ("b", 0)]);
    }

    #[rstest]
    fn rejects_malformed_lines(oid: ObjectId) {
        assert!(IndexEntry::parse_line("100644 no-tab 0").is_err());
        assert!(IndexEntry::parse_line(&format!("100644 {} 7\ta", oid)).is_err());
        assert!(IndexEntry::parse_line(&format!("123456 {} 0\ta", oid)).is_err());
    }
}
