//! Reference namespace
//!
//! A reference is a file holding either a direct object id (`<40-hex>\n`) or a
//! symbolic pointer (`ref: <ref-path>\n`). Branches live under `refs/heads/`,
//! tags under `refs/tags/`; `HEAD` and `MERGE_HEAD` sit at the top of the
//! metadata directory. `MERGE_HEAD`'s presence is the authoritative marker of
//! a merge in progress.
//!
//! Name resolution walks symbolic chains with a bounded depth and falls back
//! to abbreviated object ids; resolving through a tag ref peels annotated tag
//! objects down to their final target.

use crate::areas::database::Database;
use crate::artifacts::core::{Fatal, Lockfile};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::{MIN_PREFIX_LENGTH, OBJECT_ID_LENGTH};
use anyhow::Context;
use derive_new::new;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Name of the merge-in-progress marker ref
pub const MERGE_HEAD_REF_NAME: &str = "MERGE_HEAD";

/// Pattern of a symbolic reference payload
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Maximum symbolic-ref (and tag-peel) chain length
const MAX_REF_DEPTH: usize = 10;

/// Reference manager rooted at the metadata directory
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (`.nit`)
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    pub fn tags_path(&self) -> PathBuf {
        self.refs_path().join("tags")
    }

    pub fn branch_ref(name: &str) -> String {
        format!("refs/heads/{}", name)
    }

    pub fn tag_ref(name: &str) -> String {
        format!("refs/tags/{}", name)
    }

    pub fn ref_exists(&self, ref_path: &str) -> bool {
        self.path.join(ref_path).is_file()
    }

    /// Write a reference file
    ///
    /// `symbolic` writes `ref: <value>\n`, otherwise `value` must be a full
    /// object id and is written with a trailing newline. The write happens
    /// under the ref's advisory lock, through a temporary sibling renamed over
    /// the target.
    pub fn update_ref(&self, ref_path: &str, value: &str, symbolic: bool) -> anyhow::Result<()> {
        if ref_path.contains("..") || ref_path.contains('~') || ref_path.contains('^') {
            return Err(Fatal::Usage(format!("invalid ref name: {}", ref_path)).into());
        }

        let content = if symbolic {
            format!("ref: {}\n", value)
        } else {
            let oid = ObjectId::try_parse(value)
                .with_context(|| format!("refusing to write malformed id to {}", ref_path))?;
            format!("{}\n", oid)
        };

        let full_path = self.path.join(ref_path);
        let parent = full_path
            .parent()
            .with_context(|| format!("invalid ref path {}", ref_path))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("unable to create ref directory {}", parent.display()))?;

        let _lock = Lockfile::acquire(&full_path)?;

        let mut temp_name = full_path.as_os_str().to_os_string();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("unable to open ref file {}", temp_path.display()))?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&temp_path, &full_path)
            .with_context(|| format!("unable to replace ref file {}", full_path.display()))?;

        Ok(())
    }

    /// Raw content of a ref file with the single trailing newline stripped
    ///
    /// `None` when the file is absent or empty.
    pub fn read_ref_raw(&self, ref_path: &str) -> anyhow::Result<Option<String>> {
        let full_path = self.path.join(ref_path);
        if !full_path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&full_path)
            .with_context(|| format!("unable to read ref file {}", full_path.display()))?;
        let content = content.strip_suffix('\n').unwrap_or(&content);

        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(content.to_string()))
        }
    }

    pub fn delete_ref(&self, ref_path: &str) -> anyhow::Result<bool> {
        let full_path = self.path.join(ref_path);
        if full_path.is_file() {
            std::fs::remove_file(&full_path)
                .with_context(|| format!("unable to delete ref {}", ref_path))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Resolve a name to an object id
    ///
    /// Tried in order until one matches: `HEAD`, an explicit `refs/…` path, a
    /// branch under `refs/heads/`, a tag under `refs/tags/` (peeling annotated
    /// tag objects), and finally an abbreviated object id. Symbolic chains are
    /// followed up to a fixed depth. `None` when every step fails; an
    /// ambiguous abbreviation propagates as `ambiguous-object`.
    pub fn resolve(&self, name: &str, database: &Database) -> anyhow::Result<Option<ObjectId>> {
        let mut current = name.to_string();

        for _ in 0..MAX_REF_DEPTH {
            if current == HEAD_REF_NAME {
                match self.read_ref_raw(HEAD_REF_NAME)? {
                    None => return Ok(None),
                    Some(raw) => match Self::symref_target(&raw)? {
                        Some(target) => {
                            current = target;
                            continue;
                        }
                        None => return Self::resolve_hex(&raw, database),
                    },
                }
            }

            if current.starts_with("refs/") {
                if let Some(raw) = self.read_ref_raw(&current)? {
                    match Self::symref_target(&raw)? {
                        Some(target) => {
                            current = target;
                            continue;
                        }
                        None => match ObjectId::try_parse(raw) {
                            Ok(oid) => return Ok(Some(self.peel(oid, database)?)),
                            Err(err) => {
                                eprintln!("warning: malformed id in ref {}: {}", current, err);
                                return Ok(None);
                            }
                        },
                    }
                }
            }

            if !current.contains('/') {
                let branch_path = Self::branch_ref(&current);
                if self.ref_exists(&branch_path) {
                    current = branch_path;
                    continue;
                }

                let tag_path = Self::tag_ref(&current);
                if self.ref_exists(&tag_path) {
                    current = tag_path;
                    continue;
                }
            }

            return Self::resolve_hex(&current, database);
        }

        eprintln!("warning: symbolic ref depth exceeded resolving {}", name);
        Ok(None)
    }

    fn resolve_hex(candidate: &str, database: &Database) -> anyhow::Result<Option<ObjectId>> {
        let looks_like_id = candidate.len() >= MIN_PREFIX_LENGTH
            && candidate.len() <= OBJECT_ID_LENGTH
            && candidate.chars().all(|c| c.is_ascii_hexdigit());
        if !looks_like_id {
            return Ok(None);
        }

        match database.resolve_prefix(candidate) {
            Ok(oid) => Ok(Some(oid)),
            Err(err) => match err.downcast_ref::<Fatal>() {
                Some(Fatal::AmbiguousObject(_)) => Err(err),
                _ => Ok(None),
            },
        }
    }

    /// Follow annotated tag objects down to the object they ultimately name
    fn peel(&self, oid: ObjectId, database: &Database) -> anyhow::Result<ObjectId> {
        let mut current = oid;
        for _ in 0..MAX_REF_DEPTH {
            match database.parse_object_as_tag(&current)? {
                Some(tag) => current = tag.target().clone(),
                None => return Ok(current),
            }
        }

        anyhow::bail!("tag chain too deep at {}", current.short())
    }

    fn symref_target(raw: &str) -> anyhow::Result<Option<String>> {
        let symref = regex::Regex::new(SYMREF_REGEX)?;
        Ok(symref.captures(raw).map(|captures| captures[1].to_string()))
    }

    /// Target ref path when HEAD is symbolic, `None` when detached or unborn
    pub fn head_target(&self) -> anyhow::Result<Option<String>> {
        match self.read_ref_raw(HEAD_REF_NAME)? {
            Some(raw) => Self::symref_target(&raw),
            None => Ok(None),
        }
    }

    /// Short branch name HEAD points at, `None` when detached
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .head_target()?
            .and_then(|target| target.strip_prefix("refs/heads/").map(str::to_string)))
    }

    /// Move HEAD forward to a new commit
    ///
    /// Updates the branch ref when HEAD is symbolic, HEAD itself when
    /// detached.
    pub fn advance_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        match self.head_target()? {
            Some(target) => self.update_ref(&target, oid.as_ref(), false),
            None => self.update_ref(HEAD_REF_NAME, oid.as_ref(), false),
        }
    }

    /// Point HEAD at a checkout target
    ///
    /// A known branch name makes HEAD symbolic; anything else detaches HEAD
    /// onto the commit id directly.
    pub fn set_head(&self, target_name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let branch_path = Self::branch_ref(target_name);
        if self.ref_exists(&branch_path) {
            self.update_ref(HEAD_REF_NAME, &branch_path, true)
        } else {
            self.update_ref(HEAD_REF_NAME, oid.as_ref(), false)
        }
    }

    /// Names of refs under `refs/<subdir>`, relative, byte-sorted
    pub fn list_refs(&self, subdir: &str) -> anyhow::Result<Vec<String>> {
        let base = self.refs_path().join(subdir);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = WalkDir::new(&base)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&base).ok()?;
                let name = relative.to_string_lossy().replace('\\', "/");
                if name.ends_with(".lock") { None } else { Some(name) }
            })
            .collect();

        names.sort();
        Ok(names)
    }

    /// Commit id recorded in `MERGE_HEAD`, validated as a full id
    pub fn read_merge_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match self.read_ref_raw(MERGE_HEAD_REF_NAME)? {
            None => Ok(None),
            Some(raw) => ObjectId::try_parse(raw)
                .map(Some)
                .map_err(|err| Fatal::CorruptObject(format!("MERGE_HEAD: {}", err)).into()),
        }
    }

    pub fn write_merge_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref(MERGE_HEAD_REF_NAME, oid.as_ref(), false)
    }

    pub fn clear_merge_head(&self) -> anyhow::Result<()> {
        self.delete_ref(MERGE_HEAD_REF_NAME).map(|_| ())
    }

    pub fn merge_in_progress(&self) -> bool {
        self.path.join(MERGE_HEAD_REF_NAME).is_file()
    }
}
