use crate::areas::repository::Repository;
use crate::artifacts::core::Fatal;
use crate::artifacts::index::index_entry::{IndexEntry, Stage};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::entry_mode::EntryMode;

impl Repository {
    /// Stage files; `.` and directories expand recursively
    ///
    /// Unreadable or vanished files are skipped with a warning and the batch
    /// continues; a pathspec matching nothing is reported per path and turns
    /// the overall exit non-zero once the rest of the batch is done.
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        if paths.is_empty() {
            return Err(Fatal::Usage(
                "Nothing specified, nothing added.\nMaybe you wanted to say 'nit add .'?"
                    .to_string(),
            )
            .into());
        }

        let mut files = Vec::new();
        let mut missing_pathspec = false;
        for path in paths {
            let listing = if path == "." {
                self.workspace().list_files(None)
            } else {
                self.workspace().list_files(Some(path.trim_end_matches('/')))
            };

            match listing {
                Ok(mut listed) => files.append(&mut listed),
                Err(err) => {
                    eprintln!("{:#}", err);
                    missing_pathspec = true;
                }
            }
        }
        files.sort();
        files.dedup();

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        for path in files {
            let mode = match self.workspace().probe_mode(&path) {
                Ok(Some(EntryMode::Directory)) | Ok(None) => continue,
                Ok(Some(mode)) => mode,
                Err(err) => {
                    eprintln!("warning: skipping {}: {}", path, err);
                    continue;
                }
            };

            let data = match self.workspace().hashable_bytes(&path) {
                Ok(data) => data,
                Err(err) => {
                    eprintln!("warning: skipping unreadable file {}: {}", path, err);
                    continue;
                }
            };

            let blob_oid = self.database().store(&Blob::new(data))?;
            index.add(IndexEntry::new(path, blob_oid, mode, Stage::Resolved));
        }

        index.write_updates()?;

        if missing_pathspec {
            return Err(Fatal::Usage("some pathspecs did not match any files".to_string()).into());
        }

        Ok(())
    }
}
