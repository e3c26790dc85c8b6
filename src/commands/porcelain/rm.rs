use crate::areas::repository::Repository;
use crate::artifacts::core::Fatal;
use std::io::Write;

impl Repository {
    /// Unstage paths, deleting them from the working tree unless `cached`
    pub async fn rm(&mut self, paths: &[String], cached: bool) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        if paths.is_empty() {
            return Err(Fatal::Usage("Nothing specified, nothing removed.".to_string()).into());
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let mut removed_any = false;
        for path in paths {
            let path = path.trim_end_matches('/');

            if !index.tracks(path) {
                eprintln!("fatal: pathspec '{}' did not match any files", path);
                continue;
            }

            index.remove(path, None);
            removed_any = true;

            if !cached {
                if let Err(err) = self.workspace().remove_file(path) {
                    eprintln!("warning: unable to remove {}: {}", path, err);
                }
            }

            writeln!(self.writer(), "rm '{}'", path)?;
        }

        if !removed_any {
            return Err(Fatal::Usage("no matching files to remove".to_string()).into());
        }

        index.write_updates()?;
        Ok(())
    }
}
