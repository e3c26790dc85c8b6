//! Shared error taxonomy and filesystem utilities
//!
//! Every user-visible failure is classified into one of the `Fatal` kinds so
//! the binary can map it to the right exit code: 128 for name-resolution
//! failures, 1 for everything else. Raise sites wrap a `Fatal` in an
//! `anyhow::Error`; `main` downcasts to recover the code.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Classified fatal error, carrying the message shown to the user
#[derive(Debug, Error)]
pub enum Fatal {
    #[error("{0}")]
    Usage(String),
    #[error("fatal: not a nit repository: {0}")]
    NotARepository(String),
    #[error("fatal: Not a valid object name {0}")]
    UnknownObject(String),
    #[error("fatal: ambiguous argument '{0}': multiple possibilities")]
    AmbiguousObject(String),
    #[error("fatal: {0}")]
    WrongObjectKind(String),
    #[error("fatal: corrupt object: {0}")]
    CorruptObject(String),
    #[error("error: {0}")]
    UnmergedIndex(String),
    #[error("error: {0}")]
    DirtyWorkdir(String),
    #[error("error: {0}")]
    MergeInProgress(String),
    #[error("{0}")]
    MergeConflict(String),
    #[error("fatal: {0}")]
    ResourceBusy(String),
}

impl Fatal {
    pub fn exit_code(&self) -> i32 {
        match self {
            Fatal::UnknownObject(_) | Fatal::AmbiguousObject(_) | Fatal::MergeInProgress(_) => 128,
            _ => 1,
        }
    }
}

/// Exit code for an error chain: the classified code when the root cause is a
/// `Fatal`, the generic 1 otherwise
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<Fatal>()
        .map(Fatal::exit_code)
        .unwrap_or(1)
}

/// Advisory lock on a metadata file
///
/// The lock is a sibling `<file>.lock` created with `O_EXCL`: presence means
/// held. A second invocation that finds the file fails fast with
/// `resource-busy` instead of waiting. The core never expires stale locks;
/// that is left to the surrounding environment.
#[derive(Debug)]
pub struct Lockfile {
    path: PathBuf,
}

impl Lockfile {
    pub fn acquire(target: &Path) -> anyhow::Result<Self> {
        let mut lock_name = target.as_os_str().to_os_string();
        lock_name.push(".lock");
        let path = PathBuf::from(lock_name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Lockfile { path }),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Err(Fatal::ResourceBusy(
                format!("Unable to create '{}': File exists.", path.display()),
            )
            .into()),
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("unable to create lock file {}", path.display()))),
        }
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
