//! Working directory
//!
//! Everything at and below the repository root except the metadata directory.
//! The workspace deals in `/`-separated paths relative to the root, reads and
//! writes raw bytes, and maps POSIX file modes onto the tree-mode alphabet.

use crate::areas::repository::META_DIR;
use crate::artifacts::core::Fatal;
use crate::artifacts::objects::entry_mode::EntryMode;
use anyhow::Context;
use bytes::Bytes;
use is_executable::IsExecutable;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File system operations scoped to the repository root
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn full_path(&self, rel: &str) -> PathBuf {
        self.path.join(rel)
    }

    fn relative_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;
        let name = relative.to_string_lossy().replace('\\', "/");
        if name.is_empty() { None } else { Some(name) }
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            matches!(
                component,
                std::path::Component::Normal(name) if name == META_DIR
            )
        })
    }

    /// Relative names of all files below `start` (the whole tree when `None`),
    /// excluding the metadata directory, byte-sorted
    pub fn list_files(&self, start: Option<&str>) -> anyhow::Result<Vec<String>> {
        let base = match start {
            Some(rel) => self.full_path(rel),
            None => self.path.to_path_buf(),
        };

        if !base.exists() {
            return Err(Fatal::Usage(format!(
                "fatal: pathspec '{}' did not match any files",
                start.unwrap_or(".")
            ))
            .into());
        }

        if !base.is_dir() {
            let name = self
                .relative_name(&base)
                .context("path escapes the repository root")?;
            return Ok(vec![name]);
        }

        let mut files: Vec<String> = WalkDir::new(&base)
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.path()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file() || entry.file_type().is_symlink()
            })
            .filter_map(|entry| self.relative_name(entry.path()))
            .collect();

        files.sort();
        Ok(files)
    }

    pub fn file_exists(&self, rel: &str) -> bool {
        self.full_path(rel).symlink_metadata().is_ok()
    }

    /// Raw file bytes
    pub fn read_file(&self, rel: &str) -> anyhow::Result<Bytes> {
        let full = self.full_path(rel);
        let data =
            std::fs::read(&full).with_context(|| format!("unable to read file {}", rel))?;
        Ok(data.into())
    }

    /// Bytes a blob for this path would hold: the link target for symlinks,
    /// the file content otherwise
    pub fn hashable_bytes(&self, rel: &str) -> anyhow::Result<Bytes> {
        let full = self.full_path(rel);
        let metadata = full
            .symlink_metadata()
            .with_context(|| format!("unable to stat file {}", rel))?;

        if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&full)
                .with_context(|| format!("unable to read symlink {}", rel))?;
            Ok(Bytes::from(target.to_string_lossy().into_owned().into_bytes()))
        } else {
            self.read_file(rel)
        }
    }

    /// Write file bytes, creating parent directories as needed
    pub fn write_file(&self, rel: &str, data: &[u8]) -> anyhow::Result<()> {
        let full = self.full_path(rel);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("unable to create directory {}", parent.display()))?;
        }

        std::fs::write(&full, data).with_context(|| format!("unable to write file {}", rel))
    }

    /// Delete a file if present; missing files are not an error
    pub fn remove_file(&self, rel: &str) -> anyhow::Result<()> {
        let full = self.full_path(rel);
        if full.symlink_metadata().is_ok() {
            std::fs::remove_file(&full).with_context(|| format!("unable to remove file {}", rel))?;
        }

        Ok(())
    }

    /// Mode of a path in the tree-mode alphabet, `None` when absent
    pub fn probe_mode(&self, rel: &str) -> anyhow::Result<Option<EntryMode>> {
        let full = self.full_path(rel);
        let metadata = match full.symlink_metadata() {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("unable to stat file {}", rel)));
            }
        };

        let mode = if metadata.file_type().is_symlink() {
            EntryMode::Symlink
        } else if metadata.is_dir() {
            EntryMode::Directory
        } else if full.is_executable() {
            EntryMode::Executable
        } else {
            EntryMode::Regular
        };

        Ok(Some(mode))
    }

    /// Set or clear the execute bits, preserving the read bits
    ///
    /// A no-op on platforms without POSIX mode semantics.
    pub fn set_executable(&self, rel: &str, executable: bool) -> anyhow::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let full = self.full_path(rel);
            let metadata = std::fs::metadata(&full)
                .with_context(|| format!("unable to stat file {}", rel))?;
            let mut mode = metadata.permissions().mode();
            if executable {
                mode |= 0o111;
            } else {
                mode &= !0o111;
            }
            std::fs::set_permissions(&full, std::fs::Permissions::from_mode(mode))
                .with_context(|| format!("unable to set permissions on {}", rel))?;
        }
        #[cfg(not(unix))]
        {
            let _ = (rel, executable);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(dir.path().to_path_buf().into_boxed_path())
    }

    #[test]
    fn lists_files_recursively_excluding_the_metadata_directory() {
        let dir = TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        dir.child("sub/b.txt").write_str("b").unwrap();
        dir.child(".nit/objects/ab/cdef").write_str("x").unwrap();

        let files = workspace(&dir).list_files(None).unwrap();
        assert_eq!(files, vec!["a.txt".to_string(), "sub/b.txt".to_string()]);
    }

    #[test]
    fn listing_a_single_file_returns_its_relative_name() {
        let dir = TempDir::new().unwrap();
        dir.child("sub/b.txt").write_str("b").unwrap();

        let files = workspace(&dir).list_files(Some("sub/b.txt")).unwrap();
        assert_eq!(files, vec!["sub/b.txt".to_string()]);
    }

    #[test]
    fn missing_pathspec_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(workspace(&dir).list_files(Some("nope")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_round_trips_through_probe_mode() {
        let dir = TempDir::new().unwrap();
        dir.child("tool.sh").write_str("#!/bin/sh\n").unwrap();
        let workspace = workspace(&dir);

        assert_eq!(
            workspace.probe_mode("tool.sh").unwrap(),
            Some(EntryMode::Regular)
        );

        workspace.set_executable("tool.sh", true).unwrap();
        assert_eq!(
            workspace.probe_mode("tool.sh").unwrap(),
            Some(EntryMode::Executable)
        );

        workspace.set_executable("tool.sh", false).unwrap();
        assert_eq!(
            workspace.probe_mode("tool.sh").unwrap(),
            Some(EntryMode::Regular)
        );
    }
}
