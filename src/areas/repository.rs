//! Repository facade
//!
//! `Repository` wires the lower areas together (database, index, workspace,
//! refs) and is the receiver for every command implementation. The index is
//! behind a tokio mutex so index-touching commands serialize their access;
//! everything else uses interior mutability where needed.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::core::Fatal;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::trees::reader::TreeReader;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Metadata directory name
pub(crate) const META_DIR: &str = ".nit";

/// Object database directory name
const DATABASE_DIR: &str = "objects";

/// Index file name
const INDEX_FILE: &str = "index";

/// A repository rooted at a working directory
pub struct Repository {
    /// Repository root path
    path: Box<Path>,
    /// Output writer (stdout in the binary, a buffer in tests)
    writer: RefCell<Box<dyn std::io::Write>>,
    /// Staging area, serialized behind a mutex
    index: Arc<Mutex<Index>>,
    /// Object database
    database: Database,
    /// Working directory
    workspace: Workspace,
    /// Reference manager
    refs: Refs,
}

impl Repository {
    pub fn new(path: PathBuf, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }
        let path = path.canonicalize()?;

        let index = Index::new(path.join(META_DIR).join(INDEX_FILE).into_boxed_path());
        let database = Database::new(path.join(META_DIR).join(DATABASE_DIR).into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(path.join(META_DIR).into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta_path(&self) -> PathBuf {
        self.path.join(META_DIR)
    }

    pub fn writer(&'_ self) -> std::cell::RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Error out unless the metadata directory exists
    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if self.meta_path().is_dir() {
            Ok(())
        } else {
            Err(Fatal::NotARepository(self.path.display().to_string()).into())
        }
    }

    /// Resolve a revision name to an object id, failing when it names nothing
    pub fn resolve_revision(&self, name: &str) -> anyhow::Result<ObjectId> {
        self.refs
            .resolve(name, &self.database)?
            .ok_or_else(|| Fatal::UnknownObject(name.to_string()).into())
    }

    /// Resolve a revision name and require the result to be a commit
    pub fn resolve_commit(&self, name: &str) -> anyhow::Result<ObjectId> {
        let oid = self.resolve_revision(name)?;
        let (kind, _) = self.database.object_kind(&oid)?;

        if kind != ObjectType::Commit {
            return Err(Fatal::WrongObjectKind(format!(
                "'{}' (which resolved to {}) is a {}, not a commit",
                name,
                oid.short(),
                kind
            ))
            .into());
        }

        Ok(oid)
    }

    /// Tree id a commit snapshot points at
    pub fn commit_tree_oid(&self, commit_oid: &ObjectId) -> anyhow::Result<ObjectId> {
        let commit = self
            .database
            .parse_object_as_commit(commit_oid)?
            .ok_or_else(|| {
                Fatal::WrongObjectKind(format!("object {} is not a commit", commit_oid.short()))
            })?;

        Ok(commit.tree_oid().clone())
    }

    /// Flattened tree of the HEAD commit; empty when HEAD is unborn
    pub fn head_flat_tree(&self) -> anyhow::Result<BTreeMap<String, DatabaseEntry>> {
        match self.refs.resolve("HEAD", &self.database)? {
            None => Ok(BTreeMap::new()),
            Some(head_oid) => {
                let tree_oid = self.commit_tree_oid(&head_oid)?;
                TreeReader::new(&self.database).flatten(&tree_oid)
            }
        }
    }
}
