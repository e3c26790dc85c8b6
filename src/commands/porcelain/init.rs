use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

const DEFAULT_BRANCH: &str = "main";

const CONFIG_TEMPLATE: &str = "[core]\n\
\trepositoryformatversion = 0\n\
\tfilemode = true\n\
\tbare = false\n";

const DESCRIPTION_TEMPLATE: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

const EXCLUDE_TEMPLATE: &str = "\
# Lines that start with '#' are comments.\n\
# Add patterns of files the repository should not track, one per line.\n";

impl Repository {
    /// Create the metadata skeleton for a new repository
    ///
    /// Re-running inside a valid repository is harmless; a metadata directory
    /// that exists but is missing its skeleton is an error.
    pub fn init(&mut self) -> anyhow::Result<()> {
        let meta = self.meta_path();

        if meta.exists() {
            let valid = meta.join("objects").is_dir()
                && meta.join("refs").is_dir()
                && meta.join("HEAD").is_file();
            if valid {
                writeln!(
                    self.writer(),
                    "Reinitialized existing Nit repository in {}",
                    meta.display()
                )?;
                return Ok(());
            }
            anyhow::bail!(
                "'{}' already exists but is not a valid repository",
                meta.display()
            );
        }

        fs::create_dir_all(meta.join("objects").join("info"))
            .context("failed to create the objects directory")?;
        fs::create_dir_all(meta.join("objects").join("pack"))
            .context("failed to create the objects directory")?;
        fs::create_dir_all(meta.join("refs").join("heads"))
            .context("failed to create the refs directory")?;
        fs::create_dir_all(meta.join("refs").join("tags"))
            .context("failed to create the refs directory")?;
        fs::create_dir_all(meta.join("info")).context("failed to create the info directory")?;

        fs::write(
            meta.join("HEAD"),
            format!("ref: refs/heads/{}\n", DEFAULT_BRANCH),
        )
        .context("failed to write HEAD")?;
        fs::write(meta.join("config"), CONFIG_TEMPLATE).context("failed to write config")?;
        fs::write(meta.join("description"), DESCRIPTION_TEMPLATE)
            .context("failed to write description")?;
        fs::write(meta.join("info").join("exclude"), EXCLUDE_TEMPLATE)
            .context("failed to write info/exclude")?;

        writeln!(
            self.writer(),
            "Initialized empty Nit repository in {}",
            meta.display()
        )?;

        Ok(())
    }
}
